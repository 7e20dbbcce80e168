//! Daily forecast table and per-attribute summary for one location.

use anyhow::anyhow;
use log::info;
use wxd_core::{
    forecast::{compass_direction, DATE_FORMAT},
    Attribute, DailySeries, JsonLocationStore, WeatherProvider,
};
use wxd_data::stats::summarize;

pub async fn run_forecast(store_path: &str, id: &str) -> anyhow::Result<()> {
    let store = JsonLocationStore::open(store_path)?;
    let location = store
        .get(id)
        .ok_or_else(|| anyhow!("Location {} is not registered in {}", id, store_path))?;

    let client = crate::forecast_client()?;
    let series = client.fetch(location.position()).await?;
    info!("Fetched {} forecast day(s) for {}", series.len(), location.name);

    println!("{} ({}, {})", location.name, location.lat, location.lon);
    print!("{}", format_table(&series));
    println!();
    print!("{}", format_summary(&series));
    Ok(())
}

/// One row per day: date, every attribute, dominant wind direction.
pub fn format_table(series: &DailySeries) -> String {
    let mut out = format!("{:<10}", "date");
    for &attribute in Attribute::ALL {
        out.push_str(&format!(" {:>16}", attribute.key()));
    }
    out.push_str(&format!(" {:>5}\n", "wind"));
    for record in &series.days {
        out.push_str(&format!("{:<10}", record.date.format(DATE_FORMAT)));
        for &attribute in Attribute::ALL {
            let cell = record
                .value(attribute)
                .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
            out.push_str(&format!(" {:>16}", cell));
        }
        let wind = record
            .wind_direction
            .and_then(compass_direction)
            .unwrap_or("-");
        out.push_str(&format!(" {:>5}\n", wind));
    }
    out
}

/// Min / max / mean per attribute; attributes without data are listed as such.
pub fn format_summary(series: &DailySeries) -> String {
    let mut out = String::new();
    for &attribute in Attribute::ALL {
        match summarize(series, attribute) {
            Some(summary) => out.push_str(&format!(
                "{}: min {:.1}, max {:.1}, avg {:.1}\n",
                attribute.label(),
                summary.min,
                summary.max,
                summary.mean
            )),
            None => out.push_str(&format!("{}: no data\n", attribute.label())),
        }
    }
    out
}
