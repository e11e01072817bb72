//! Core domain types for Tether.
//!
//! Pure data with no IO and no async: the execution context handed over by
//! the engine, the store that wraps it, and the identifiers inside it.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod context;
mod ids;

pub use context::{AsyncContext, Event, ExecutionContext};
pub use ids::{EmptyIdError, FunctionId, RunId};
