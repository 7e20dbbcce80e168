//! Interpolate one attribute over a GeoJSON boundary and export the overlay.

use anyhow::Context;
use log::info;
use std::fs::File;
use wxd_core::{Attribute, Boundary, JsonLocationStore};
use wxd_session::{InterpolationController, RunOutcome};

use crate::settings::load_session_config;
use crate::surface::CsvSurface;
use crate::TuningArgs;

pub async fn run_interpolate(
    store_path: &str,
    boundary_path: &str,
    attribute: Attribute,
    day: usize,
    output: &str,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    let config = load_session_config(tuning)?;
    let store = JsonLocationStore::open(store_path)?;
    let text = std::fs::read_to_string(boundary_path)
        .with_context(|| format!("Failed to read boundary {}", boundary_path))?;
    let boundary = Boundary::from_geojson_str(&text)
        .with_context(|| format!("Failed to decode boundary {}", boundary_path))?;

    let controller = InterpolationController::new(CsvSurface::new(), config);
    controller.load_boundary(boundary);
    controller.select_attribute(attribute);
    controller.select_day(day);

    let client = crate::forecast_client()?;
    match controller.run(&store, &client).await {
        RunOutcome::Rendered {
            cells,
            min_value,
            max_value,
        } => {
            info!(
                "Interpolated {} cells for {} ({:.1}..{:.1})",
                cells, attribute, min_value, max_value
            );
        }
        RunOutcome::Discarded => anyhow::bail!("Interpolation was superseded"),
        RunOutcome::Failed(e) => return Err(e.into()),
    }

    let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
    let written = controller.with_surface(|surface| surface.write_csv(file))?;
    println!("Wrote {} cells to {}", written, output);
    if let Some(legend) = controller.with_surface(|surface| surface.legend().cloned()) {
        println!("{}", serde_json::to_string_pretty(&legend)?);
    }
    Ok(())
}
