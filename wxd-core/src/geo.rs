use geo_types::{Coord, LineString, Point};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point, rejecting coordinates outside lat [-90, 90] / lon [-180, 180].
    pub fn try_new(lat: f64, lon: f64) -> Result<Self> {
        let point = Self::new(lat, lon);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(CoreError::InvalidCoordinates { lat, lon })
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// GeoJSON / `geo` axis order: x is longitude, y is latitude.
impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Coord {
            x: point.lon,
            y: point.lat,
        }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::new(point.lon, point.lat)
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(coord: Coord<f64>) -> Self {
        GeoPoint::new(coord.y, coord.x)
    }
}

fn ring(points: Vec<GeoPoint>) -> LineString<f64> {
    points.into_iter().map(Coord::<f64>::from).collect()
}

/// A polygon: one exterior ring plus zero or more holes.
///
/// Backed by `geo_types::Polygon`, which keeps every ring closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(geo_types::Polygon<f64>);

impl Polygon {
    pub fn new(exterior: Vec<GeoPoint>) -> Self {
        Self::with_holes(exterior, Vec::new())
    }

    pub fn with_holes(exterior: Vec<GeoPoint>, holes: Vec<Vec<GeoPoint>>) -> Self {
        Self(geo_types::Polygon::new(
            ring(exterior),
            holes.into_iter().map(ring).collect(),
        ))
    }

    pub fn exterior(&self) -> &LineString<f64> {
        self.0.exterior()
    }

    pub fn holes(&self) -> &[LineString<f64>] {
        self.0.interiors()
    }

    pub fn as_geo(&self) -> &geo_types::Polygon<f64> {
        &self.0
    }

    /// A polygon is usable for membership tests when its exterior ring has
    /// at least three distinct vertices.
    pub fn is_usable(&self) -> bool {
        let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(3);
        for vertex in self.exterior().coords() {
            if !distinct.contains(vertex) {
                distinct.push(*vertex);
                if distinct.len() >= 3 {
                    return true;
                }
            }
        }
        false
    }

    /// Every vertex of every ring.
    pub fn vertices(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.exterior()
            .coords()
            .chain(self.holes().iter().flat_map(|hole| hole.coords()))
            .map(|coord| GeoPoint::from(*coord))
    }
}

impl From<geo_types::Polygon<f64>> for Polygon {
    fn from(polygon: geo_types::Polygon<f64>) -> Self {
        Self(polygon)
    }
}

/// A user-supplied boundary: one or more polygons.
///
/// Only the first polygon takes part in membership tests; the bounding box
/// spans every polygon plus any extra coordinates that came with the input
/// (e.g. points or lines in the same GeoJSON document).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundary {
    pub polygons: Vec<Polygon>,
    pub extra_points: Vec<GeoPoint>,
}

impl Boundary {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            extra_points: Vec::new(),
        }
    }

    pub fn first_polygon(&self) -> Option<&Polygon> {
        self.polygons.first()
    }

    /// Every coordinate carried by the boundary input.
    pub fn coordinates(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.polygons
            .iter()
            .flat_map(|polygon| polygon.vertices())
            .chain(self.extra_points.iter().copied())
    }
}
