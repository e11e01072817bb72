//! The carrier handle: reads and installs the current [`AsyncContext`].
//!
//! Native carriers store the context in a tokio task-local. A scope installed
//! with [`Carrier::run`] is visible on every poll of the scoped future, so it
//! survives `.await` points, timers and nested sub-futures. Nested scopes
//! shadow the outer one and restore it when they end.
//!
//! Degraded carriers keep nothing: `get_store` is always `None` and `run`
//! calls straight through.

use tokio::task::JoinHandle;

use tether_types::AsyncContext;

tokio::task_local! {
    static CURRENT: AsyncContext;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Native,
    Degraded,
}

#[derive(Debug)]
pub struct Carrier {
    kind: CarrierKind,
}

impl Carrier {
    pub(crate) const fn native() -> Self {
        Self {
            kind: CarrierKind::Native,
        }
    }

    pub(crate) const fn degraded() -> Self {
        Self {
            kind: CarrierKind::Degraded,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CarrierKind {
        self.kind
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.kind == CarrierKind::Degraded
    }

    /// The store active for the calling task, or `None` outside any scope.
    #[must_use]
    pub fn get_store(&self) -> Option<AsyncContext> {
        match self.kind {
            CarrierKind::Native => CURRENT.try_with(AsyncContext::clone).ok(),
            CarrierKind::Degraded => None,
        }
    }

    /// Runs `f` and awaits its future with `store` installed as current.
    ///
    /// `f` itself is called inside the scope, so its synchronous prefix sees
    /// the store too. Output, errors and panics pass through untouched.
    pub async fn run<F, Fut>(&self, store: AsyncContext, f: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        match self.kind {
            CarrierKind::Native => CURRENT.scope(store, async move { f().await }).await,
            CarrierKind::Degraded => f().await,
        }
    }

    /// Synchronous counterpart of [`Carrier::run`].
    pub fn run_sync<F, R>(&self, store: AsyncContext, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        match self.kind {
            CarrierKind::Native => CURRENT.sync_scope(store, f),
            CarrierKind::Degraded => f(),
        }
    }

    /// Spawns `future` on the current tokio runtime with the caller's store.
    ///
    /// Task-locals are not inherited by spawned tasks; this re-installs the
    /// store so the task behaves as a continuation of the caller.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like [`tokio::spawn`].
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        match self.get_store() {
            Some(store) => tokio::spawn(CURRENT.scope(store, future)),
            None => tokio::spawn(future),
        }
    }
}
