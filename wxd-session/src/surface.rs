use serde::Serialize;
use wxd_core::GeoPoint;
use wxd_data::Legend;

/// Opaque handle to an overlay drawn on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OverlayHandle(pub u64);

/// A grid cell ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoredCell {
    pub position: GeoPoint,
    pub value: f64,
    pub color: String,
}

/// Where interpolation overlays and legends end up (a map widget, a file, ...).
pub trait RenderSurface {
    fn render_overlay(&mut self, cells: &[ColoredCell]) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);
    fn render_legend(&mut self, legend: &Legend);
}
