//! Session settings from an optional JSON file plus command-line overrides.

use anyhow::Context;
use log::debug;
use wxd_session::SessionConfig;

use crate::TuningArgs;

/// Build the session config: file first, then flag overrides, then validation.
pub fn load_session_config(tuning: &TuningArgs) -> anyhow::Result<SessionConfig> {
    let mut config = match &tuning.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path))?
        }
        None => SessionConfig::default(),
    };
    apply_overrides(&mut config, tuning);
    config.validate()?;
    debug!("Session config: {:?}", config);
    Ok(config)
}

fn apply_overrides(config: &mut SessionConfig, tuning: &TuningArgs) {
    if let Some(cell_size) = tuning.cell_size {
        config.interpolation.cell_size_degrees = cell_size;
    }
    if let Some(power) = tuning.power {
        config.interpolation.power = power;
    }
    if let Some(min_samples) = tuning.min_samples {
        config.interpolation.min_samples = min_samples;
    }
    if let Some(timeout_ms) = tuning.timeout_ms {
        config.fetch_timeout_ms = timeout_ms;
    }
}
