/// Error types for the interpolation pipeline
use thiserror::Error;

/// Every way an interpolation run can fail.
///
/// All variants are recovered by the session controller; none of them should
/// reach the user as anything other than a message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// No boundary is loaded, or it is hidden
    #[error("Load and show a boundary before interpolating")]
    NoBoundary,

    /// The boundary has no polygon usable for membership tests
    #[error("Boundary has no usable polygon: {0}")]
    InvalidBoundary(String),

    /// Too few observation points inside the boundary
    #[error("At least {needed} points inside the boundary are needed, found {found}")]
    InsufficientSamples { needed: usize, found: usize },

    /// The weather provider failed for one of the sampled locations
    #[error("Failed to fetch data for {location}: {reason}")]
    DataFetchFailed { location: String, reason: String },

    /// No grid cell fell inside the boundary
    #[error("No grid cell falls inside the boundary")]
    EmptyResult,

    /// Another interpolation run is still in flight
    #[error("An interpolation run is already in progress")]
    AlreadyRunning,

    /// A configuration value is out of its allowed range
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Type alias for Results using InterpolationError
pub type Result<T> = std::result::Result<T, InterpolationError>;
