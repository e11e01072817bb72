//! Lazily constructed carrier slots and the process-wide instance.
//!
//! A [`CarrierSlot`] memoizes the construction future itself, not just its
//! result: callers that arrive while the probe is still running wait on the
//! same construction instead of starting their own. Once filled, a slot never
//! changes, and a degraded result is never re-probed.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::OnceCell;

use crate::carrier::Carrier;
use crate::probe::{CapabilityProbe, RuntimeProbe};

/// Namespaced key identifying the process-wide slot in diagnostics.
pub const CARRIER_SLOT_KEY: &str = "tether:async-context";

static PROCESS_SLOT: CarrierSlot = CarrierSlot::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unconstructed,
    Constructing,
    /// Terminal.
    Constructed,
}

#[derive(Debug)]
pub struct CarrierSlot {
    cell: OnceCell<Carrier>,
    constructions: AtomicUsize,
}

impl CarrierSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
            constructions: AtomicUsize::new(0),
        }
    }

    /// Returns the slot's carrier, constructing it with `probe` on first use.
    ///
    /// Never fails. A probe error yields the degraded carrier and one warning.
    pub async fn acquire_with<P: CapabilityProbe>(&self, probe: &P) -> &Carrier {
        self.cell.get_or_init(|| self.construct(probe)).await
    }

    async fn construct<P: CapabilityProbe>(&self, probe: &P) -> Carrier {
        self.constructions.fetch_add(1, Ordering::AcqRel);
        match probe.probe().await {
            Ok(()) => {
                tracing::debug!(slot = CARRIER_SLOT_KEY, "Async context propagation enabled");
                Carrier::native()
            }
            Err(reason) => {
                tracing::warn!(
                    slot = CARRIER_SLOT_KEY,
                    %reason,
                    "Async context propagation is not supported in this runtime. \
                     Experimental async context is disabled."
                );
                Carrier::degraded()
            }
        }
    }

    /// The carrier if construction has finished.
    #[must_use]
    pub fn get(&self) -> Option<&Carrier> {
        self.cell.get()
    }

    #[must_use]
    pub fn state(&self) -> SlotState {
        if self.cell.initialized() {
            SlotState::Constructed
        } else if self.constructions.load(Ordering::Acquire) > 0 {
            SlotState::Constructing
        } else {
            SlotState::Unconstructed
        }
    }

    /// How many times the probe has been started for this slot.
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }
}

impl Default for CarrierSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide carrier, built on first call.
///
/// Capability detection reads [`tether_config::CarrierConfig::resolve`] and
/// requires a running tokio runtime.
pub async fn acquire_carrier() -> &'static Carrier {
    PROCESS_SLOT
        .acquire_with(&RuntimeProbe::from_environment())
        .await
}

/// Lifecycle state of the process-wide slot.
#[must_use]
pub fn process_slot_state() -> SlotState {
    PROCESS_SLOT.state()
}
