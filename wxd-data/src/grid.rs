//! Interpolation grid builder.
//!
//! Turns named point observations and a boundary into a set of interpolated
//! grid cells inside the boundary's primary polygon.

use log::{debug, info};
use serde::Serialize;
use std::{collections::BTreeMap, fmt::Display};
use wxd_core::{
    geo::{Boundary, GeoPoint, Polygon},
    location::Location,
    Attribute,
};

use crate::config::InterpolationConfig;
use crate::error::{InterpolationError, Result};
use crate::geometry::{bounding_box, build_grid, point_in_polygon};
use crate::idw::{estimate, Sample};

/// A grid cell inside the boundary with its interpolated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridCell {
    pub position: GeoPoint,
    pub value: f64,
}

/// Output of one interpolation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolationResult {
    /// Cells inside the primary polygon, in grid order.
    pub cells: Vec<GridCell>,
    pub min_value: f64,
    pub max_value: f64,
    pub attribute: Attribute,
    /// Number of observation points that fed the estimator.
    pub sample_count: usize,
}

/// The polygon used for membership tests: the boundary's first polygon.
pub fn primary_polygon(boundary: &Boundary) -> Result<&Polygon> {
    let polygon = boundary
        .first_polygon()
        .ok_or_else(|| InterpolationError::InvalidBoundary("no polygon found".into()))?;
    if !polygon.is_usable() {
        return Err(InterpolationError::InvalidBoundary(
            "first polygon has fewer than 3 distinct vertices".into(),
        ));
    }
    Ok(polygon)
}

/// Locations inside the boundary's primary polygon, in id order.
pub fn locations_inside<'a>(
    boundary: &Boundary,
    locations: &'a BTreeMap<String, Location>,
) -> Result<Vec<(&'a String, &'a Location)>> {
    let polygon = primary_polygon(boundary)?;
    Ok(locations
        .iter()
        .filter(|(_, location)| point_in_polygon(&location.position(), polygon))
        .collect())
}

/// Build an interpolated grid for `attribute` over `boundary`.
///
/// `value_lookup` is asked for the value of every location inside the
/// primary polygon; its first failure aborts the whole build as
/// [`InterpolationError::DataFetchFailed`].
pub fn build_interpolation<F, E>(
    boundary: &Boundary,
    locations: &BTreeMap<String, Location>,
    attribute: Attribute,
    mut value_lookup: F,
    config: &InterpolationConfig,
) -> Result<InterpolationResult>
where
    F: FnMut(&str, &Location) -> std::result::Result<f64, E>,
    E: Display,
{
    config.validate()?;
    let polygon = primary_polygon(boundary)?;

    // 1. samples inside the boundary
    let inside = locations_inside(boundary, locations)?;
    if inside.len() < config.min_samples {
        return Err(InterpolationError::InsufficientSamples {
            needed: config.min_samples,
            found: inside.len(),
        });
    }
    let mut samples = Vec::with_capacity(inside.len());
    for (id, location) in inside {
        let value =
            value_lookup(id.as_str(), location).map_err(|e| InterpolationError::DataFetchFailed {
                location: id.clone(),
                reason: e.to_string(),
            })?;
        samples.push(Sample::new(location.position(), value));
    }
    debug!("Collected {} samples for {}", samples.len(), attribute);

    // 2-3. candidate grid over the whole boundary extent
    let bbox = bounding_box(boundary)
        .ok_or_else(|| InterpolationError::InvalidBoundary("boundary has no coordinates".into()))?;
    let candidates = build_grid(&bbox, config.cell_size_degrees)?;

    // 4. keep cells inside the primary polygon and estimate them
    let mut cells = Vec::new();
    for position in candidates.iter().filter(|p| point_in_polygon(p, polygon)) {
        let value = estimate(position, &samples, config.power)?;
        cells.push(GridCell {
            position: *position,
            value,
        });
    }

    // 5. value range
    if cells.is_empty() {
        return Err(InterpolationError::EmptyResult);
    }
    let (min_value, max_value) = cells.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), cell| (lo.min(cell.value), hi.max(cell.value)),
    );
    info!(
        "Interpolated {} of {} grid cells for {} ({:.1}..{:.1})",
        cells.len(),
        candidates.len(),
        attribute,
        min_value,
        max_value
    );

    Ok(InterpolationResult {
        cells,
        min_value,
        max_value,
        attribute,
        sample_count: samples.len(),
    })
}
