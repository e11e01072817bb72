//! Async execution-context carrier for Tether.
//!
//! Lets deeply nested, interleaved async code recover the [`AsyncContext`] of
//! the run it belongs to without threading it through every signature.
//!
//! ```text
//! engine ── run_with_context(ctx, f) ──▶ f ──▶ .await ──▶ ... ──▶ get_current_context()
//!                                                                   └─▶ Some(ctx)
//! ```
//!
//! The process-wide [`Carrier`] is built lazily by [`acquire_carrier`]. When
//! the runtime cannot propagate context (or configuration disables it) the
//! carrier degrades to a pass-through that always reports `None`; callers
//! never need to tell the two apart.

mod carrier;
mod probe;
mod slot;

pub use carrier::{Carrier, CarrierKind};
pub use probe::{CapabilityProbe, ProbeError, RuntimeProbe};
pub use slot::{CARRIER_SLOT_KEY, CarrierSlot, SlotState, acquire_carrier, process_slot_state};
pub use tether_types::AsyncContext;

use tokio::task::JoinHandle;

/// The context installed for the calling task, if any.
///
/// `None` outside every [`run_with_context`] scope, and always `None` when
/// the process carrier is degraded.
pub async fn get_current_context() -> Option<AsyncContext> {
    acquire_carrier().await.get_store()
}

/// Runs `f` with `context` as the current context of its whole async extent.
///
/// See [`Carrier::run`].
pub async fn run_with_context<F, Fut>(context: AsyncContext, f: F) -> Fut::Output
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    acquire_carrier().await.run(context, f).await
}

/// Spawns `future` as a continuation of the calling task's context.
///
/// See [`Carrier::spawn`].
pub async fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    acquire_carrier().await.spawn(future)
}
