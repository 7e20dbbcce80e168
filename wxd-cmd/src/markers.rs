//! Color every registered location by its forecast value.

use futures::future::join_all;
use log::{info, warn};
use std::collections::BTreeMap;
use wxd_core::{Attribute, JsonLocationStore, Location, LocationStore, WeatherProvider};
use wxd_data::{color::color_markers, legend, ColorRamp};

pub async fn run_markers(store_path: &str, attribute: Attribute, day: usize) -> anyhow::Result<()> {
    let store = JsonLocationStore::open(store_path)?;
    let locations = store.get_all()?;
    if locations.is_empty() {
        anyhow::bail!("No locations registered in {}", store_path);
    }
    let client = crate::forecast_client()?;
    let values = fetch_values(&client, &locations, attribute, day).await;
    info!(
        "Got {} of {} value(s) for {} on day {}",
        values.len(),
        locations.len(),
        attribute,
        day
    );

    let ramp = ColorRamp::for_attribute(attribute);
    let Some((markers, (min_value, max_value))) = color_markers(&values, &ramp) else {
        anyhow::bail!("No forecast values could be fetched");
    };

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["id", "name", "value", "color"])?;
    for marker in &markers {
        let name = locations
            .get(&marker.id)
            .map_or(marker.id.as_str(), |l| l.name.as_str());
        writer.write_record([
            marker.id.as_str(),
            name,
            &format!("{:.1}", marker.value),
            marker.color.as_str(),
        ])?;
    }
    writer.flush()?;

    let legend = legend(attribute, min_value, max_value, &ramp);
    println!("{}", serde_json::to_string_pretty(&legend)?);
    Ok(())
}

/// Fetch `attribute` on `day` for every location; failed locations are logged and skipped.
pub async fn fetch_values<P: WeatherProvider>(
    provider: &P,
    locations: &BTreeMap<String, Location>,
    attribute: Attribute,
    day: usize,
) -> Vec<(String, f64)> {
    let fetches = locations.iter().map(|(id, location)| async move {
        let value = provider
            .fetch(location.position())
            .await
            .and_then(|series| series.value_at(day, attribute));
        (id, value)
    });
    join_all(fetches)
        .await
        .into_iter()
        .filter_map(|(id, value)| match value {
            Ok(value) => Some((id.clone(), value)),
            Err(e) => {
                warn!("Skipping {}: {}", id, e);
                None
            }
        })
        .collect()
}
