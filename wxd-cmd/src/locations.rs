//! Location store management commands.

use anyhow::Context;
use log::{info, warn};
use wxd_core::{JsonLocationStore, LocationStore};

pub fn add_location(store_path: &str, name: &str, lat: f64, lon: f64) -> anyhow::Result<()> {
    let mut store = JsonLocationStore::open(store_path)?;
    let id = store.add(name, lat, lon)?;
    store.save()?;
    println!("Added {} ({}, {}) as {}", name.trim(), lat, lon, id);
    Ok(())
}

pub fn remove_location(store_path: &str, id: &str) -> anyhow::Result<()> {
    let mut store = JsonLocationStore::open(store_path)?;
    let removed = store.remove(id)?;
    store.save()?;
    println!("Removed {} ({})", removed.name, id);
    Ok(())
}

pub fn list_locations(store_path: &str) -> anyhow::Result<()> {
    let store = JsonLocationStore::open(store_path)?;
    let locations = store.get_all()?;
    if locations.is_empty() {
        println!("No locations registered in {}", store_path);
        return Ok(());
    }
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["id", "name", "lat", "lon"])?;
    for (id, location) in &locations {
        writer.write_record([
            id.as_str(),
            location.name.as_str(),
            &location.lat.to_string(),
            &location.lon.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn import_locations(store_path: &str, csv_path: &str) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to read {}", csv_path))?;
    let mut store = JsonLocationStore::open(store_path)?;
    let report = store.import_csv(&text)?;
    store.save()?;
    for error in &report.errors {
        warn!("{}: {}", csv_path, error);
    }
    info!("Imported {} location(s) from {}", report.added, csv_path);
    println!(
        "Imported {} location(s), {} error(s)",
        report.added,
        report.errors.len()
    );
    Ok(())
}
