use chrono::NaiveDate;
use serde::Deserialize;
use std::{collections::BTreeMap, future::Future};

use crate::attribute::Attribute;
use crate::error::{CoreError, Result};
use crate::geo::GeoPoint;

/// Date format of the `daily.time` array in Open-Meteo responses: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of forecast days requested from the provider.
pub const FORECAST_DAYS: u32 = 14;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert a wind direction in degrees to one of 16 compass points.
pub fn compass_direction(degrees: f64) -> Option<&'static str> {
    if !degrees.is_finite() {
        return None;
    }
    let index = (degrees / 22.5).round().rem_euclid(16.0) as usize;
    COMPASS_POINTS.get(index).copied()
}

/// One forecast day for a single location.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Attribute values present in the response; nulls are left out.
    pub values: BTreeMap<Attribute, f64>,
    /// Dominant wind direction in degrees.
    pub wind_direction: Option<f64>,
}

impl DailyRecord {
    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        self.values.get(&attribute).copied()
    }
}

/// A time-indexed series of daily forecast records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    pub days: Vec<DailyRecord>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Value of `attribute` on day `day`.
    ///
    /// A day beyond the series is an error; a missing (null) value reads as
    /// `0.0`, the same fallback the dashboard table uses.
    pub fn value_at(&self, day: usize, attribute: Attribute) -> Result<f64> {
        let record = self.days.get(day).ok_or(CoreError::DayOutOfRange {
            day,
            len: self.days.len(),
        })?;
        Ok(record.value(attribute).unwrap_or(0.0))
    }

    /// Present values of `attribute` across all days, in day order.
    pub fn values(&self, attribute: Attribute) -> impl Iterator<Item = f64> + '_ {
        self.days.iter().filter_map(move |record| record.value(attribute))
    }

    /// Decode the JSON body of an Open-Meteo `/v1/forecast` response.
    pub fn from_open_meteo_json(body: &str) -> Result<DailySeries> {
        let response: ForecastResponse = serde_json::from_str(body)?;
        response.daily.into_series()
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyFields,
}

#[derive(Debug, Deserialize)]
struct DailyFields {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    windspeed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    windgusts_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    winddirection_10m_dominant: Vec<Option<f64>>,
}

impl DailyFields {
    fn column(&self, attribute: Attribute) -> &[Option<f64>] {
        match attribute {
            Attribute::TempMax => &self.temperature_2m_max,
            Attribute::TempMin => &self.temperature_2m_min,
            Attribute::RainProbability => &self.precipitation_probability_max,
            Attribute::Precipitation => &self.precipitation_sum,
            Attribute::WindMax => &self.windspeed_10m_max,
            Attribute::WindGusts => &self.windgusts_10m_max,
        }
    }

    fn into_series(self) -> Result<DailySeries> {
        let mut days = Vec::with_capacity(self.time.len());
        for (i, date_str) in self.time.iter().enumerate() {
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .map_err(|e| CoreError::DateParse(format!("{date_str}: {e}")))?;
            let values = Attribute::ALL
                .iter()
                .filter_map(|attribute| {
                    self.column(*attribute)
                        .get(i)
                        .copied()
                        .flatten()
                        .map(|value| (*attribute, value))
                })
                .collect();
            days.push(DailyRecord {
                date,
                values,
                wind_direction: self.winddirection_10m_dominant.get(i).copied().flatten(),
            });
        }
        Ok(DailySeries { days })
    }
}

/// Source of daily forecasts for a position.
pub trait WeatherProvider {
    fn fetch(&self, position: GeoPoint) -> impl Future<Output = Result<DailySeries>>;
}

#[cfg(feature = "api")]
pub use open_meteo::OpenMeteoClient;

#[cfg(feature = "api")]
mod open_meteo {
    use super::{DailySeries, WeatherProvider, FORECAST_DAYS};
    use crate::attribute::Attribute;
    use crate::error::Result;
    use crate::geo::GeoPoint;
    use log::debug;
    use reqwest::Client;

    pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

    /// Open-Meteo forecast client.
    #[derive(Debug, Clone)]
    pub struct OpenMeteoClient {
        client: Client,
        base_url: String,
    }

    impl OpenMeteoClient {
        pub fn new(client: Client) -> Self {
            Self {
                client,
                base_url: OPEN_METEO_URL.to_string(),
            }
        }

        pub fn with_base_url(client: Client, base_url: &str) -> Self {
            Self {
                client,
                base_url: base_url.to_string(),
            }
        }

        fn daily_fields() -> String {
            let mut fields: Vec<&str> = Attribute::ALL
                .iter()
                .map(|attribute| attribute.open_meteo_field())
                .collect();
            fields.push("winddirection_10m_dominant");
            fields.join(",")
        }

        pub async fn get_daily_series(&self, position: GeoPoint) -> Result<DailySeries> {
            debug!("Fetching forecast for ({}, {})", position.lat, position.lon);
            let body = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("latitude", position.lat.to_string()),
                    ("longitude", position.lon.to_string()),
                    ("daily", Self::daily_fields()),
                    ("timezone", "auto".to_string()),
                    ("forecast_days", FORECAST_DAYS.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            DailySeries::from_open_meteo_json(&body)
        }
    }

    impl WeatherProvider for OpenMeteoClient {
        async fn fetch(&self, position: GeoPoint) -> Result<DailySeries> {
            self.get_daily_series(position).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
  "latitude": 21.02,
  "longitude": -101.26,
  "timezone": "America/Mexico_City",
  "daily": {
    "time": ["2025-03-01", "2025-03-02", "2025-03-03"],
    "temperature_2m_max": [27.4, 28.1, null],
    "temperature_2m_min": [9.8, 10.5, 11.0],
    "precipitation_probability_max": [0, 15, 40],
    "precipitation_sum": [0.0, 0.2, 3.1],
    "windspeed_10m_max": [14.2, 18.9, 21.0],
    "windgusts_10m_max": [30.6, 38.2, 44.0],
    "winddirection_10m_dominant": [45, 200, 359]
  }
}"#;

    #[test]
    fn test_decode_open_meteo_response() {
        let series = DailySeries::from_open_meteo_json(RESPONSE).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.days[0].date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(series.value_at(1, Attribute::TempMax).unwrap(), 28.1);
        assert_eq!(series.value_at(2, Attribute::RainProbability).unwrap(), 40.0);
        assert_eq!(series.days[2].wind_direction, Some(359.0));
    }

    #[test]
    fn test_null_value_reads_as_zero() {
        let series = DailySeries::from_open_meteo_json(RESPONSE).unwrap();
        assert_eq!(series.days[2].value(Attribute::TempMax), None);
        assert_eq!(series.value_at(2, Attribute::TempMax).unwrap(), 0.0);
        assert_eq!(series.values(Attribute::TempMax).count(), 2);
    }

    #[test]
    fn test_day_out_of_range() {
        let series = DailySeries::from_open_meteo_json(RESPONSE).unwrap();
        assert!(matches!(
            series.value_at(3, Attribute::TempMin),
            Err(CoreError::DayOutOfRange { day: 3, len: 3 })
        ));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let body = r#"{"daily":{"time":["03/01/2025"]}}"#;
        assert!(matches!(
            DailySeries::from_open_meteo_json(body),
            Err(CoreError::DateParse(_))
        ));
    }

    #[test]
    fn test_compass_direction() {
        assert_eq!(compass_direction(0.0), Some("N"));
        assert_eq!(compass_direction(45.0), Some("NE"));
        assert_eq!(compass_direction(200.0), Some("SSW"));
        assert_eq!(compass_direction(359.0), Some("N"));
        assert_eq!(compass_direction(f64::NAN), None);
    }
}
