use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::CoreError;

/// A daily forecast attribute that can be tabulated, summarized or mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Daily maximum temperature (°C)
    TempMax,
    /// Daily minimum temperature (°C)
    TempMin,
    /// Maximum probability of precipitation (%)
    RainProbability,
    /// Precipitation sum (mm)
    Precipitation,
    /// Maximum wind speed at 10 m (km/h)
    WindMax,
    /// Maximum wind gusts at 10 m (km/h)
    WindGusts,
}

const TMAX_RAMP: &[&str] = &["#fee090", "#fdae61", "#f46d43", "#d73027", "#a50026"];
const TMIN_RAMP: &[&str] = &[
    "#08306b", "#08519c", "#2171b5", "#4292c6", "#9ecae1", "#fdae61",
];
const RAIN_PROBABILITY_RAMP: &[&str] = &["#E6F2FF", "#6BB9FF", "#FFD966", "#FF8C66", "#FF4D4D"];
const PRECIPITATION_RAMP: &[&str] = &["#E6F7FF", "#6BB5FF", "#3A66FF", "#2600ffff", "#aa149eff"];
const WIND_MAX_RAMP: &[&str] = &[
    "#c4ff76ff", "#4bd12aff", "#0aa805ff", "#018508ff", "#014607ff",
];
const WIND_GUSTS_RAMP: &[&str] = &["#f189ffff", "#ff32e4ff", "#b8007aff", "#ff0000ff"];

impl Attribute {
    /// All attributes in display order.
    pub const ALL: &'static [Attribute] = &[
        Self::TempMax,
        Self::TempMin,
        Self::RainProbability,
        Self::Precipitation,
        Self::WindMax,
        Self::WindGusts,
    ];

    /// Short key used on the command line and in config files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::TempMax => "tmax",
            Self::TempMin => "tmin",
            Self::RainProbability => "rain_probability",
            Self::Precipitation => "precipitation",
            Self::WindMax => "wind_max",
            Self::WindGusts => "wind_gusts",
        }
    }

    /// Human-readable label with units, used by legends and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TempMax => "Max Temperature (°C)",
            Self::TempMin => "Min Temperature (°C)",
            Self::RainProbability => "Rain Probability (%)",
            Self::Precipitation => "Precipitation (mm)",
            Self::WindMax => "Wind Speed (km/h)",
            Self::WindGusts => "Wind Gusts (km/h)",
        }
    }

    /// Name of the matching `daily` field in the Open-Meteo forecast API.
    pub fn open_meteo_field(&self) -> &'static str {
        match self {
            Self::TempMax => "temperature_2m_max",
            Self::TempMin => "temperature_2m_min",
            Self::RainProbability => "precipitation_probability_max",
            Self::Precipitation => "precipitation_sum",
            Self::WindMax => "windspeed_10m_max",
            Self::WindGusts => "windgusts_10m_max",
        }
    }

    /// Low-to-high color ramp for map rendering.
    pub fn ramp_colors(&self) -> &'static [&'static str] {
        match self {
            Self::TempMax => TMAX_RAMP,
            Self::TempMin => TMIN_RAMP,
            Self::RainProbability => RAIN_PROBABILITY_RAMP,
            Self::Precipitation => PRECIPITATION_RAMP,
            Self::WindMax => WIND_MAX_RAMP,
            Self::WindGusts => WIND_GUSTS_RAMP,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Attribute::ALL
            .iter()
            .copied()
            .find(|attribute| attribute.key() == lowered)
            .ok_or_else(|| CoreError::UnknownAttribute(s.to_string()))
    }
}
