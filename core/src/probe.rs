//! Capability detection for native context propagation.

use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};

use tether_config::CarrierConfig;

/// Why native propagation is unavailable.
///
/// Never surfaces to callers of the carrier: every variant is absorbed into
/// the degraded carrier.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("async context is disabled by configuration")]
    Disabled,
    #[error("no tokio runtime is available: {0}")]
    NoRuntime(#[from] TryCurrentError),
    #[error("{0}")]
    Unsupported(String),
}

/// Decides once, at carrier construction, whether native propagation works.
pub trait CapabilityProbe {
    fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send;
}

/// Default probe: native propagation needs a live tokio runtime and must not
/// be switched off in [`CarrierConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeProbe {
    config: Option<CarrierConfig>,
}

impl RuntimeProbe {
    /// Resolves configuration from the config file and environment when probed.
    #[must_use]
    pub const fn from_environment() -> Self {
        Self { config: None }
    }

    #[must_use]
    pub const fn with_config(config: CarrierConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl CapabilityProbe for RuntimeProbe {
    fn probe(&self) -> impl Future<Output = Result<(), ProbeError>> + Send {
        let config = self.config;
        async move {
            let config = config.unwrap_or_else(CarrierConfig::resolve);
            tracing::debug!(mode = config.async_context.as_str(), "Probing async context");
            if config.is_disabled() {
                return Err(ProbeError::Disabled);
            }
            Handle::try_current()?;
            Ok(())
        }
    }
}
