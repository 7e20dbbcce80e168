//! Inverse Distance Weighting (IDW) estimator
//!
//! Estimates a value at a target position as a weighted average of sample
//! values, where weights are inversely proportional to great-circle distance
//! raised to a power parameter.
//!
//! ```text
//! z(p) = Σ(wi * zi) / Σ(wi)
//! where wi = 1 / d(p, pi)^power
//! ```
//!
//! Weights are evaluated as `(d_min / d_i)^power`. The common factor
//! `d_min^power` cancels, and every weight lies in `(0, 1]` with the nearest
//! sample at exactly 1, so large powers cannot overflow or produce `0 / 0`.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use serde::Serialize;
use wxd_core::geo::GeoPoint;

use crate::error::{InterpolationError, Result};
use crate::geometry::distance;

/// An observation used as interpolation input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub position: GeoPoint,
    pub value: f64,
}

impl Sample {
    pub fn new(position: GeoPoint, value: f64) -> Self {
        Self { position, value }
    }
}

/// IDW estimate at `target`.
///
/// If any sample coincides with the target (distance exactly zero) the first
/// such sample's value is returned unchanged. Samples are accumulated in their
/// given order so the result is reproducible bit for bit.
///
/// An empty sample set fails with [`InterpolationError::InsufficientSamples`].
pub fn estimate(target: &GeoPoint, samples: &[Sample], power: f64) -> Result<f64> {
    if samples.is_empty() {
        return Err(InterpolationError::InsufficientSamples {
            needed: 1,
            found: 0,
        });
    }

    let distances: Vec<f64> = samples
        .iter()
        .map(|sample| distance(target, &sample.position))
        .collect();
    if let Some(i) = distances.iter().position(|d| *d == 0.0) {
        return Ok(samples[i].value);
    }

    let nearest = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    for (d, sample) in distances.iter().zip(samples) {
        let w = (nearest / d).powf(power);
        sum_w += w;
        sum_wz += w * sample.value;
    }
    Ok(sum_wz / sum_w)
}
