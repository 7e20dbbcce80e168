//! Core types and external collaborators for the weather dashboard.
//!
//! This crate holds everything the interpolation core reads but does not
//! compute: registered locations, daily forecast series, boundary polygons
//! decoded from GeoJSON, and (behind the `api` feature) the Open-Meteo client.

pub mod attribute;
pub mod error;
pub mod forecast;
pub mod geo;
pub mod geojson;
pub mod location;

pub use attribute::Attribute;
pub use error::{CoreError, Result};
pub use forecast::{DailyRecord, DailySeries, WeatherProvider};
pub use geo::{Boundary, GeoPoint, Polygon};
pub use location::{JsonLocationStore, Location, LocationStore};
