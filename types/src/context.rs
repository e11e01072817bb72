//! Execution context produced by the engine and carried across async calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{FunctionId, RunId};

/// A single triggering event as delivered to a function run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<u64>,
}

impl Event {
    #[must_use]
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            id: None,
            ts: None,
        }
    }
}

/// The logical context of one function run.
///
/// Built by the execution engine; everything downstream only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    run_id: RunId,
    function_id: FunctionId,
    attempt: u32,
    event: Event,
    events: Vec<Event>,
}

impl ExecutionContext {
    /// Context for a run triggered by a single event (`events == [event]`).
    #[must_use]
    pub fn new(run_id: RunId, function_id: FunctionId, event: Event) -> Self {
        Self {
            run_id,
            function_id,
            attempt: 0,
            events: vec![event.clone()],
            event,
        }
    }

    /// Replaces the event batch. The first event stays the primary one.
    #[must_use]
    pub fn with_batch(mut self, events: Vec<Event>) -> Self {
        if let Some(first) = events.first() {
            self.event = first.clone();
            self.events = events;
        }
        self
    }

    #[must_use]
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    #[must_use]
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    #[must_use]
    pub fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    /// Zero-based retry counter.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// The store installed for an async call chain.
///
/// Holds exactly one reference to the execution context. Cloning only bumps
/// the reference count, so every continuation that observes the store sees
/// the same context instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncContext {
    pub ctx: Arc<ExecutionContext>,
}

impl AsyncContext {
    #[must_use]
    pub fn new(ctx: ExecutionContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// True when both stores point at the same context instance.
    #[must_use]
    pub fn shares_context(&self, other: &AsyncContext) -> bool {
        Arc::ptr_eq(&self.ctx, &other.ctx)
    }
}

impl From<ExecutionContext> for AsyncContext {
    fn from(ctx: ExecutionContext) -> Self {
        Self::new(ctx)
    }
}

impl From<Arc<ExecutionContext>> for AsyncContext {
    fn from(ctx: Arc<ExecutionContext>) -> Self {
        Self { ctx }
    }
}
