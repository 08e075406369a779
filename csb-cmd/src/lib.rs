//! Command implementations for the superbloom CLI.
//!
//! Provides subcommands for inspecting bloom status, NDVI series and
//! forecasts, and for scoring a season from NASA POWER climate data.

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use csb_data::forecast::seeded_rng;
use csb_ndvi::location::LocationTable;
use csb_ndvi::power::{PowerClient, USER_AGENT};
use csb_store::source::{DirectorySource, MemorySource};
use csb_store::{SeriesSource, SeriesStore};
use csb_utils::dates::parse_date;
use log::info;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Duration;

pub mod catalog;
pub mod climate;
pub mod series;
pub mod status;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct Options {
    /// Directory holding the NDVI and forecast CSV files (defaults to the bundled fixtures)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Cutoff between historical and forecast data, YYYY-MM-DD (defaults to the local date)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Seed for synthetic forecasts
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Timeout for NASA POWER requests, in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl Options {
    pub fn today(&self) -> anyhow::Result<NaiveDate> {
        match &self.today {
            Some(today) => parse_date(today),
            None => Ok(Local::now().naive_local().date()),
        }
    }

    pub fn rng(&self) -> ChaCha8Rng {
        let seed = self.seed.unwrap_or_else(rand::random);
        info!("Forecast seed: {}", seed);
        seeded_rng(seed)
    }

    pub fn store(&self) -> anyhow::Result<SeriesStore<Box<dyn SeriesSource>>> {
        let locations = LocationTable::embedded()?;
        let source: Box<dyn SeriesSource> = match &self.data_dir {
            Some(dir) => {
                info!("Reading series from {}", dir.display());
                Box::new(DirectorySource::new(dir))
            }
            None => Box::new(MemorySource::embedded()),
        };
        Ok(SeriesStore::new(source, locations))
    }

    pub fn power_client(&self) -> anyhow::Result<PowerClient> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        let client = PowerClient::new(http);
        Ok(match self.timeout_secs {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => client,
        })
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Bloom status of each location on a date
    Status {
        /// Date to classify, YYYY-MM-DD
        #[arg(short, long)]
        date: String,

        /// Only this location id
        #[arg(short, long)]
        location: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Observed NDVI series for a location, with bloom alert and peak
    Series {
        #[arg(short, long)]
        location: String,

        /// First date to include, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,

        /// Last date to include, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        /// NDVI at which to raise a bloom alert
        #[arg(long, default_value_t = csb_data::phenology::BLOOM_ALERT_NDVI)]
        alert_threshold: f64,
    },

    /// Synthetic NDVI forecast past the end of the observed series
    Forecast {
        #[arg(short, long)]
        location: String,

        /// Number of days to forecast
        #[arg(short = 'n', long, default_value_t = 30)]
        days: usize,

        /// Repeat the observed series into this year instead
        #[arg(long)]
        extend_year: Option<i32>,
    },

    /// Winter precipitation totals from NASA POWER
    Winter {
        /// Only this location id (defaults to every enabled location)
        #[arg(short, long)]
        location: Option<String>,

        /// Bloom season year; winter runs from December of the year before
        #[arg(short, long)]
        year: i32,
    },

    /// Bloom outlook from winter rain and spring temperature
    Predict {
        /// Winter rain in mm (skips the NASA POWER lookup)
        #[arg(long, requires = "spring_temp")]
        winter_rain: Option<f64>,

        /// Mean spring temperature in °C (skips the NASA POWER lookup)
        #[arg(long, requires = "winter_rain")]
        spring_temp: Option<f64>,

        /// Location to fetch climate data for
        #[arg(short, long, conflicts_with = "winter_rain")]
        location: Option<String>,

        /// Bloom season year to fetch climate data for
        #[arg(short, long, requires = "location")]
        year: Option<i32>,
    },

    /// GIBS imagery tile URLs for a date
    Tiles {
        /// Imagery date, YYYY-MM-DD
        #[arg(short, long)]
        date: String,

        /// Only this GIBS layer
        #[arg(long)]
        layer: Option<String>,
    },

    /// Configured locations, their data coverage and seasonal predictions
    Locations {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(options: Options, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Status {
            date,
            location,
            json,
        } => status::run_status(&options, &date, location.as_deref(), json),
        Command::Series {
            location,
            start,
            end,
            alert_threshold,
        } => series::run_series(
            &options,
            &location,
            start.as_deref(),
            end.as_deref(),
            alert_threshold,
        ),
        Command::Forecast {
            location,
            days,
            extend_year,
        } => series::run_forecast(&options, &location, days, extend_year),
        Command::Winter { location, year } => {
            climate::run_winter(&options, location.as_deref(), year).await
        }
        Command::Predict {
            winter_rain,
            spring_temp,
            location,
            year,
        } => climate::run_predict(&options, winter_rain, spring_temp, location.as_deref(), year).await,
        Command::Tiles { date, layer } => catalog::run_tiles(&options, &date, layer.as_deref()),
        Command::Locations { json } => catalog::run_locations(&options, json),
    }
}
