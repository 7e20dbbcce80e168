//! Spatial interpolation and classification for weather observations.
//!
//! This crate turns point observations at registered locations into a
//! colored grid inside a user boundary, using inverse distance weighting,
//! and provides the summaries shown next to the forecast table.

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod idw;

pub use color::{classify, legend, ColorRamp, Legend};
pub use config::InterpolationConfig;
pub use error::{InterpolationError, Result};
pub use grid::{build_interpolation, GridCell, InterpolationResult};
pub use idw::{estimate, Sample};

/// Per-attribute statistics over one location's forecast
pub mod stats {
    use serde::Serialize;
    use wxd_core::{Attribute, DailySeries};

    /// Min, max and mean of the values present in a series.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct AttributeSummary {
        pub min: f64,
        pub max: f64,
        pub mean: f64,
    }

    /// Summarize `attribute` over `series`, skipping missing days.
    ///
    /// Returns `None` if the attribute has no values at all.
    pub fn summarize(series: &DailySeries, attribute: Attribute) -> Option<AttributeSummary> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in series.values(attribute) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return None;
        }
        Some(AttributeSummary {
            min,
            max,
            mean: sum / count as f64,
        })
    }

}
