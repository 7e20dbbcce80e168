//! Decoding of user-uploaded GeoJSON into a [`Boundary`].
//!
//! `Polygon` and `MultiPolygon` geometries become polygons (in document
//! order); coordinates of any other geometry are kept so they still widen
//! the bounding box.

use geojson::{GeoJson, Geometry, Value};

use crate::error::{CoreError, Result};
use crate::geo::{Boundary, GeoPoint, Polygon};

/// `[lon, lat]` with an optional altitude that is ignored.
fn to_point(position: &[f64]) -> Result<GeoPoint> {
    match position {
        [lon, lat, ..] => Ok(GeoPoint::new(*lat, *lon)),
        _ => Err(CoreError::InvalidGeoJson(format!(
            "position needs at least 2 values, got {}",
            position.len()
        ))),
    }
}

fn to_ring(positions: &[Vec<f64>]) -> Result<Vec<GeoPoint>> {
    positions.iter().map(|position| to_point(position)).collect()
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    let mut rings = rings.iter();
    let exterior = match rings.next() {
        Some(ring) => to_ring(ring)?,
        None => Vec::new(),
    };
    let holes = rings.map(|ring| to_ring(ring)).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::with_holes(exterior, holes))
}

fn collect_geometry(geometry: &Geometry, boundary: &mut Boundary) -> Result<()> {
    match &geometry.value {
        Value::Point(position) => boundary.extra_points.push(to_point(position)?),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            boundary.extra_points.extend(to_ring(positions)?);
        }
        Value::MultiLineString(lines) => {
            for line in lines {
                boundary.extra_points.extend(to_ring(line)?);
            }
        }
        Value::Polygon(rings) => boundary.polygons.push(to_polygon(rings)?),
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                boundary.polygons.push(to_polygon(rings)?);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_geometry(geometry, boundary)?;
            }
        }
    }
    Ok(())
}

impl Boundary {
    /// Decode a GeoJSON document (FeatureCollection, Feature or bare geometry).
    pub fn from_geojson_str(text: &str) -> Result<Boundary> {
        let geojson: GeoJson = text.parse()?;
        let mut boundary = Boundary::default();
        match &geojson {
            GeoJson::FeatureCollection(collection) => {
                for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
                    collect_geometry(geometry, &mut boundary)?;
                }
            }
            GeoJson::Feature(feature) => {
                if let Some(geometry) = &feature.geometry {
                    collect_geometry(geometry, &mut boundary)?;
                }
            }
            GeoJson::Geometry(geometry) => collect_geometry(geometry, &mut boundary)?,
        }
        log::debug!(
            "Decoded boundary with {} polygon(s) and {} extra coordinate(s)",
            boundary.polygons.len(),
            boundary.extra_points.len()
        );
        Ok(boundary)
    }
}
