use serde::{Deserialize, Serialize};
use std::time::Duration;
use wxd_data::{InterpolationConfig, InterpolationError};

/// Default bound on a single forecast fetch.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Settings for an interpolation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(flatten)]
    pub interpolation: InterpolationConfig,
    pub fetch_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationConfig::default(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn validate(&self) -> wxd_data::Result<()> {
        self.interpolation.validate()?;
        if self.fetch_timeout_ms == 0 {
            return Err(InterpolationError::InvalidParameter {
                name: "fetch_timeout_ms",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
