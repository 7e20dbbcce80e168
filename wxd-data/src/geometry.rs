//! Geometry primitives on longitude/latitude coordinates.
//!
//! Membership tests and grids work in plain degrees (lon as x, lat as y);
//! distances are great-circle kilometres.

use geo::{BoundingRect, Distance, Haversine, Intersects, MultiPoint, Point};
use serde::Serialize;
use wxd_core::geo::{Boundary, GeoPoint, Polygon};

use crate::error::{InterpolationError, Result};

/// Axis-aligned extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Whether `point` lies in `polygon`.
///
/// Points on the exterior ring (edges or vertices) count as inside. Points
/// strictly inside a hole are outside; points on a hole's edge are inside.
pub fn point_in_polygon(point: &GeoPoint, polygon: &Polygon) -> bool {
    polygon.as_geo().intersects(&Point::<f64>::from(*point))
}

/// Union of extents over every coordinate in the boundary input.
///
/// Returns `None` when the boundary carries no coordinates at all.
pub fn bounding_box(boundary: &Boundary) -> Option<BoundingBox> {
    let points: MultiPoint<f64> = boundary.coordinates().map(Point::<f64>::from).collect();
    points.bounding_rect().map(|rect| BoundingBox {
        min_lon: rect.min().x,
        min_lat: rect.min().y,
        max_lon: rect.max().x,
        max_lat: rect.max().y,
    })
}

/// Great-circle (haversine) distance in kilometres on the mean Earth radius.
///
/// Coincident points give exactly `0.0`.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Haversine::distance(Point::<f64>::from(*a), Point::<f64>::from(*b)) / 1000.0
}

/// Regular lattice over `bbox` with `cell_size_degrees` spacing on both axes.
///
/// The lattice is centred in the box (the leftover fraction of a cell is split
/// evenly on both sides). Points are ordered row-major: ascending latitude,
/// then ascending longitude within a row.
pub fn build_grid(bbox: &BoundingBox, cell_size_degrees: f64) -> Result<Vec<GeoPoint>> {
    if !cell_size_degrees.is_finite() || cell_size_degrees <= 0.0 {
        return Err(InterpolationError::InvalidParameter {
            name: "cell_size_degrees",
            value: cell_size_degrees.to_string(),
            reason: "must be a positive number".into(),
        });
    }
    let columns = (bbox.width() / cell_size_degrees).floor() as usize;
    let rows = (bbox.height() / cell_size_degrees).floor() as usize;
    let offset_lon = (bbox.width() - columns as f64 * cell_size_degrees) / 2.0;
    let offset_lat = (bbox.height() - rows as f64 * cell_size_degrees) / 2.0;

    let mut grid = Vec::with_capacity((rows + 1) * (columns + 1));
    for row in 0..=rows {
        let lat = bbox.min_lat + offset_lat + row as f64 * cell_size_degrees;
        for col in 0..=columns {
            let lon = bbox.min_lon + offset_lon + col as f64 * cell_size_degrees;
            grid.push(GeoPoint::new(lat, lon));
        }
    }
    Ok(grid)
}
