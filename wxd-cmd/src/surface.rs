//! Render surface that keeps the current overlay in memory for CSV export.

use std::io::Write;
use wxd_data::Legend;
use wxd_session::{ColoredCell, OverlayHandle, RenderSurface};

/// Holds at most one overlay and the last legend drawn.
#[derive(Debug, Default)]
pub struct CsvSurface {
    next_handle: u64,
    overlay: Option<(OverlayHandle, Vec<ColoredCell>)>,
    legend: Option<Legend>,
}

impl CsvSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[ColoredCell] {
        self.overlay.as_ref().map_or(&[], |(_, cells)| cells.as_slice())
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.legend.as_ref()
    }

    /// Write the current overlay as `lat,lon,value,color` rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> anyhow::Result<usize> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["lat", "lon", "value", "color"])?;
        for cell in self.cells() {
            wtr.write_record([
                cell.position.lat.to_string(),
                cell.position.lon.to_string(),
                format!("{:.3}", cell.value),
                cell.color.clone(),
            ])?;
        }
        wtr.flush()?;
        Ok(self.cells().len())
    }
}

impl RenderSurface for CsvSurface {
    fn render_overlay(&mut self, cells: &[ColoredCell]) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.overlay = Some((handle, cells.to_vec()));
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        if self.overlay.as_ref().is_some_and(|(current, _)| *current == handle) {
            self.overlay = None;
        }
    }

    fn render_legend(&mut self, legend: &Legend) {
        self.legend = Some(legend.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wxd_core::{Attribute, GeoPoint};
    use wxd_data::{legend, ColorRamp};

    fn cells() -> Vec<ColoredCell> {
        vec![
            ColoredCell {
                position: GeoPoint::new(20.5, -101.25),
                value: 12.0,
                color: "#fee090".into(),
            },
            ColoredCell {
                position: GeoPoint::new(20.5, -101.0),
                value: 18.12345,
                color: "#a50026".into(),
            },
        ]
    }

    #[test]
    fn test_write_csv() {
        let mut surface = CsvSurface::new();
        surface.render_overlay(&cells());
        let mut out = Vec::new();
        assert_eq!(surface.write_csv(&mut out).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "lat,lon,value,color\n20.5,-101.25,12.000,#fee090\n20.5,-101,18.123,#a50026\n"
        );
    }

    #[test]
    fn test_remove_only_current_overlay() {
        let mut surface = CsvSurface::new();
        let first = surface.render_overlay(&cells());
        let second = surface.render_overlay(&cells()[..1]);
        surface.remove_overlay(first);
        assert_eq!(surface.cells().len(), 1);
        surface.remove_overlay(second);
        assert!(surface.cells().is_empty());
    }

    #[test]
    fn test_keeps_last_legend() {
        let mut surface = CsvSurface::new();
        let ramp = ColorRamp::for_attribute(Attribute::WindMax);
        surface.render_legend(&legend(Attribute::WindMax, 3.0, 41.27, &ramp));
        let legend = surface.legend().unwrap();
        assert_eq!(legend.label, "Wind Speed (km/h)");
        assert_eq!(legend.max_label, "41.3");
    }
}
