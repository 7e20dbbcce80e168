//! Command implementations for the wxd CLI.
//!
//! Provides subcommands for managing registered locations, printing
//! forecasts, coloring location markers and running a boundary
//! interpolation that is written out as a CSV overlay.

use clap::{Args, Subcommand};
use wxd_core::Attribute;

pub mod forecast;
pub mod interpolate;
pub mod locations;
pub mod markers;
pub mod settings;
pub mod surface;

/// Default path of the location store file.
pub const DEFAULT_STORE: &str = "locations.json";

/// Interpolation tuning shared by the commands that fetch forecasts.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// JSON file with session settings (flags below override it)
    #[arg(short = 'c', long)]
    pub config: Option<String>,

    /// Grid spacing in degrees
    #[arg(long)]
    pub cell_size: Option<f64>,

    /// IDW distance exponent
    #[arg(long)]
    pub power: Option<f64>,

    /// Minimum number of locations inside the boundary
    #[arg(long)]
    pub min_samples: Option<usize>,

    /// Per-location forecast timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a location in the store
    AddLocation {
        /// Path to the location store JSON file
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,

        /// Display name, also used to derive the id
        #[arg(short = 'n', long)]
        name: String,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Remove a location by id
    RemoveLocation {
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,

        /// Location id (lower-cased name with dashes)
        id: String,
    },

    /// List registered locations
    ListLocations {
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,
    },

    /// Import locations from a `name,lat,lon` CSV file
    ImportLocations {
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,

        /// CSV file to import
        csv: String,
    },

    /// Print the daily forecast table and summary for one location
    Forecast {
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,

        /// Location id
        id: String,
    },

    /// Color every location by its forecast value for one attribute and day
    Markers {
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,

        /// One of tmax, tmin, rain_probability, precipitation, wind_max, wind_gusts
        #[arg(short = 'a', long, default_value_t = Attribute::TempMax)]
        attribute: Attribute,

        /// Forecast day index, 0 is today
        #[arg(short = 'd', long, default_value_t = 0)]
        day: usize,
    },

    /// Interpolate an attribute over a GeoJSON boundary and write the overlay CSV
    Interpolate {
        #[arg(short = 's', long, default_value = DEFAULT_STORE)]
        store: String,

        /// GeoJSON boundary file
        #[arg(short = 'b', long)]
        boundary: String,

        #[arg(short = 'a', long, default_value_t = Attribute::TempMax)]
        attribute: Attribute,

        #[arg(short = 'd', long, default_value_t = 0)]
        day: usize,

        /// Output path for the `lat,lon,value,color` overlay CSV
        #[arg(short = 'o', long)]
        output: String,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::AddLocation {
            store,
            name,
            lat,
            lon,
        } => locations::add_location(&store, &name, lat, lon),
        Command::RemoveLocation { store, id } => locations::remove_location(&store, &id),
        Command::ListLocations { store } => locations::list_locations(&store),
        Command::ImportLocations { store, csv } => locations::import_locations(&store, &csv),
        Command::Forecast { store, id } => forecast::run_forecast(&store, &id).await,
        Command::Markers {
            store,
            attribute,
            day,
        } => markers::run_markers(&store, attribute, day).await,
        Command::Interpolate {
            store,
            boundary,
            attribute,
            day,
            output,
            tuning,
        } => {
            interpolate::run_interpolate(&store, &boundary, attribute, day, &output, &tuning).await
        }
    }
}

/// HTTP client shared by the commands that talk to Open-Meteo.
pub(crate) fn forecast_client() -> anyhow::Result<wxd_core::forecast::OpenMeteoClient> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(60))
        .build()?;
    Ok(wxd_core::forecast::OpenMeteoClient::new(client))
}
