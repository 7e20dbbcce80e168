use serde::{Deserialize, Serialize};

use crate::error::{InterpolationError, Result};

/// Default grid spacing in degrees (~3.3 km at the equator).
pub const DEFAULT_CELL_SIZE_DEGREES: f64 = 0.03;

/// Default IDW power.
///
/// Deliberately high: each estimate is dominated by its nearest sample,
/// which keeps the overlay close to the observed values instead of
/// smoothing them into a regional average.
pub const DEFAULT_POWER: f64 = 15.0;

/// Default minimum number of samples inside the boundary.
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// Tunables for a single interpolation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    pub cell_size_degrees: f64,
    pub power: f64,
    pub min_samples: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            cell_size_degrees: DEFAULT_CELL_SIZE_DEGREES,
            power: DEFAULT_POWER,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl InterpolationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size_degrees.is_finite() || self.cell_size_degrees <= 0.0 {
            return Err(InterpolationError::InvalidParameter {
                name: "cell_size_degrees",
                value: self.cell_size_degrees.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err(InterpolationError::InvalidParameter {
                name: "power",
                value: self.power.to_string(),
                reason: "must be a positive number".into(),
            });
        }
        if self.min_samples == 0 {
            return Err(InterpolationError::InvalidParameter {
                name: "min_samples",
                value: "0".into(),
                reason: "at least one sample is required".into(),
            });
        }
        Ok(())
    }
}
