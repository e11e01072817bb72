//! Shared test utilities for carrier integration tests.

#![allow(dead_code)]

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use serde_json::json;
use tether_config::ASYNC_CONTEXT_ENV;
use tether_types::{AsyncContext, Event, ExecutionContext, FunctionId, RunId};
use tracing::dispatcher::DefaultGuard;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Clears the environment override before the process carrier is built.
///
/// Call first in every test of a binary that expects native propagation.
/// A `~/.tether/config.toml` that disables async context still wins.
pub fn clear_async_context_override() {
    static CLEAR: Once = Once::new();
    // SAFETY: every test calls this before anything reads the environment,
    // and `Once` blocks the other test threads until the removal is done.
    CLEAR.call_once(|| unsafe { env::remove_var(ASYNC_CONTEXT_ENV) });
}

/// Store for a run with the given id.
pub fn context(run: &str) -> AsyncContext {
    AsyncContext::new(ExecutionContext::new(
        RunId::new(run).expect("test run id"),
        FunctionId::new("tests-carrier").expect("test function id"),
        Event::new("tests/carrier.invoked", json!({ "run": run })),
    ))
}

pub fn run_id(store: Option<&AsyncContext>) -> Option<String> {
    store.map(|s| s.ctx.run_id().to_string())
}

/// Counts WARN events emitted by the carrier crate.
struct WarningCounter {
    count: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::WARN && meta.target().starts_with("tether_core") {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct Warnings {
    count: Arc<AtomicUsize>,
    _guard: DefaultGuard,
}

impl Warnings {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Installs a thread-local subscriber that counts carrier warnings.
///
/// Only sees events from the current thread, so use it with the
/// current-thread test runtime.
pub fn capture_warnings() -> Warnings {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarningCounter {
        count: Arc::clone(&count),
    });
    Warnings {
        count,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}
