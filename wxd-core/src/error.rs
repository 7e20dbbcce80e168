/// Error types for the weather dashboard core library
use thiserror::Error;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The weather provider could not produce a forecast
    #[error("Weather provider error: {0}")]
    Provider(String),

    /// Reading or writing a local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode or encode JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse a GeoJSON document
    #[error("Failed to parse GeoJSON: {0}")]
    GeoJsonParse(#[from] geojson::Error),

    /// GeoJSON document had an unexpected shape
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// Latitude or longitude outside the valid range
    #[error("Coordinates out of range: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// Location name was empty after trimming
    #[error("Location name must not be empty")]
    EmptyName,

    /// A location with the same id is already registered
    #[error("Location already exists: {0}")]
    DuplicateLocation(String),

    /// Location not found
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Requested forecast day is beyond the series
    #[error("Day {day} out of range (series has {len} days)")]
    DayOutOfRange { day: usize, len: usize },

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Unknown attribute key
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
}

/// Type alias for Results using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;
