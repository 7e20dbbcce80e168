//! Interpolation session controller.
//!
//! This crate provides:
//! - `controller`: the per-map `InterpolationController` state machine
//! - `surface`: the `RenderSurface` seam overlays and legends are drawn on
//! - `config`: session tunables (interpolation settings + fetch timeout)

pub mod config;
pub mod controller;
pub mod surface;

pub use config::SessionConfig;
pub use controller::{InterpolationController, RunOutcome, Selection, SessionState};
pub use surface::{ColoredCell, OverlayHandle, RenderSurface};
