//! NASA POWER daily point client.
//!
//! Every request carries a client-side timeout and never raises: the
//! outcome is tagged so callers must check for success before reading the
//! data. There is no retry policy.
//!
//! API documentation: <https://power.larc.nasa.gov/docs/services/api/temporal/daily/>

use crate::{
    location::LocationTable,
    precipitation::{
        parse_climate_response, parse_precipitation_response, ClimateDay, PrecipitationSeries,
        PRECIPITATION_PARAMETER, TEMPERATURE_PARAMETER,
    },
};
use chrono::NaiveDate;
use csb_utils::dates::format_date_compact;
use futures::future::join_all;
use log::{info, warn};
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub const POWER_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";

/// Timeout for precipitation-only queries.
pub const PRECIPITATION_TIMEOUT: Duration = Duration::from_secs(8);

/// Timeout for combined temperature and precipitation queries.
pub const CLIMATE_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_AGENT: &str = "csb-toolkit/2.0";

/// Why a POWER request produced no data.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum FetchFailure {
    Timeout,
    FetchFailed,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Timeout => f.write_str("timeout"),
            FetchFailure::FetchFailed => f.write_str("fetch_failed"),
        }
    }
}

/// Tagged result of a POWER request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure(FetchFailure),
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Success(data) => Some(data),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchOutcome::Success(data) => Some(data),
            FetchOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<FetchFailure> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(failure) => Some(*failure),
        }
    }
}

/// Valid WGS84 latitude/longitude.
pub fn valid_coordinates(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

#[derive(Debug, Clone)]
pub struct PowerClient {
    client: Client,
    base_url: String,
    precipitation_timeout: Duration,
    climate_timeout: Duration,
}

impl Default for PowerClient {
    fn default() -> Self {
        PowerClient::new(Client::new())
    }
}

impl PowerClient {
    pub fn new(client: Client) -> PowerClient {
        PowerClient {
            client,
            base_url: POWER_BASE_URL.to_string(),
            precipitation_timeout: PRECIPITATION_TIMEOUT,
            climate_timeout: CLIMATE_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> PowerClient {
        self.base_url = base_url.into();
        self
    }

    /// Use the same timeout for every query.
    pub fn with_timeout(mut self, timeout: Duration) -> PowerClient {
        self.precipitation_timeout = timeout;
        self.climate_timeout = timeout;
        self
    }

    /// Precipitation and climate query timeouts.
    pub fn timeouts(&self) -> (Duration, Duration) {
        (self.precipitation_timeout, self.climate_timeout)
    }

    /// Daily precipitation (`PRECTOTCORR`, agroclimatology community).
    pub async fn fetch_precipitation(
        &self,
        lat: f64,
        lon: f64,
        start_date: &NaiveDate,
        end_date: &NaiveDate,
    ) -> FetchOutcome<PrecipitationSeries> {
        let body = match self
            .get_daily_point(
                PRECIPITATION_PARAMETER,
                "AG",
                lat,
                lon,
                start_date,
                end_date,
                self.precipitation_timeout,
            )
            .await
        {
            Ok(body) => body,
            Err(failure) => return FetchOutcome::Failure(failure),
        };
        match parse_precipitation_response(&body) {
            Some(series) => {
                info!("Precipitation data received: {} days", series.len());
                FetchOutcome::Success(series)
            }
            None => FetchOutcome::Failure(FetchFailure::FetchFailed),
        }
    }

    /// Daily temperature and precipitation (`T2M,PRECTOTCORR`).
    pub async fn fetch_climate(
        &self,
        lat: f64,
        lon: f64,
        start_date: &NaiveDate,
        end_date: &NaiveDate,
    ) -> FetchOutcome<Vec<ClimateDay>> {
        let parameters = format!("{},{}", TEMPERATURE_PARAMETER, PRECIPITATION_PARAMETER);
        let body = match self
            .get_daily_point(
                &parameters,
                "RE",
                lat,
                lon,
                start_date,
                end_date,
                self.climate_timeout,
            )
            .await
        {
            Ok(body) => body,
            Err(failure) => return FetchOutcome::Failure(failure),
        };
        match parse_climate_response(&body) {
            Some(days) => {
                info!("Successfully fetched {} days of climate data", days.len());
                FetchOutcome::Success(days)
            }
            None => FetchOutcome::Failure(FetchFailure::FetchFailed),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn get_daily_point(
        &self,
        parameters: &str,
        community: &str,
        lat: f64,
        lon: f64,
        start_date: &NaiveDate,
        end_date: &NaiveDate,
        timeout: Duration,
    ) -> Result<String, FetchFailure> {
        if !valid_coordinates(lat, lon) {
            warn!("Invalid coordinate values: {}, {}", lat, lon);
            return Err(FetchFailure::FetchFailed);
        }
        if end_date < start_date {
            warn!("End date {} precedes start date {}", end_date, start_date);
            return Err(FetchFailure::FetchFailed);
        }
        let query = [
            ("parameters", parameters.to_string()),
            ("community", community.to_string()),
            ("longitude", lon.to_string()),
            ("latitude", lat.to_string()),
            ("start", format_date_compact(start_date)),
            ("end", format_date_compact(end_date)),
            ("format", "JSON".to_string()),
        ];
        info!(
            "Fetching {} from {} for ({}, {}) {}..{}",
            parameters, self.base_url, lat, lon, start_date, end_date
        );
        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;
        if !response.status().is_success() {
            warn!("NASA POWER API error: {}", response.status());
            return Err(FetchFailure::FetchFailed);
        }
        response.text().await.map_err(classify_error)
    }
}

fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        warn!("NASA POWER request timed out");
        FetchFailure::Timeout
    } else {
        warn!("NASA POWER request failed: {}", e);
        FetchFailure::FetchFailed
    }
}

/// Fetch precipitation for every enabled location concurrently.
///
/// Each location gets its own timeout; failed locations map to `None`.
pub async fn fetch_precipitation_for_locations(
    client: &PowerClient,
    locations: &LocationTable,
    start_date: &NaiveDate,
    end_date: &NaiveDate,
) -> HashMap<String, Option<PrecipitationSeries>> {
    let requests = locations.enabled().map(|location| async move {
        let (lat, lon) = location.coordinates();
        let outcome = client
            .fetch_precipitation(lat, lon, start_date, end_date)
            .await;
        if let Some(failure) = outcome.failure() {
            warn!("Precipitation fetch failed for {}: {}", location.id, failure);
        }
        (location.id.clone(), outcome.into_data())
    });
    join_all(requests).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_outcome_accessors() {
        let ok: FetchOutcome<u32> = FetchOutcome::Success(3);
        assert!(ok.is_success());
        assert_eq!(ok.data(), Some(&3));
        assert_eq!(ok.failure(), None);
        let failed: FetchOutcome<u32> = FetchOutcome::Failure(FetchFailure::Timeout);
        assert!(!failed.is_success());
        assert_eq!(failed.failure(), Some(FetchFailure::Timeout));
        assert_eq!(failed.into_data(), None);
        assert_eq!(FetchFailure::Timeout.to_string(), "timeout");
        assert_eq!(FetchFailure::FetchFailed.to_string(), "fetch_failed");
    }

    #[test]
    fn test_valid_coordinates() {
        assert!(valid_coordinates(33.25, -116.18));
        assert!(!valid_coordinates(91.0, 0.0));
        assert!(!valid_coordinates(0.0, -180.5));
    }

    #[tokio::test]
    async fn test_invalid_coordinates_fail_without_request() {
        let client = PowerClient::default().with_base_url("http://127.0.0.1:9/unused");
        let outcome = client
            .fetch_precipitation(120.0, 0.0, &ymd(2016, 12, 1), &ymd(2017, 2, 28))
            .await;
        assert_eq!(outcome, FetchOutcome::Failure(FetchFailure::FetchFailed));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_tagged_failure() {
        let client = PowerClient::default()
            .with_base_url("http://127.0.0.1:9/api/temporal/daily/point")
            .with_timeout(Duration::from_secs(2));
        let outcome = client
            .fetch_climate(33.25, -116.18, &ymd(2017, 3, 1), &ymd(2017, 3, 31))
            .await;
        assert!(!outcome.is_success());
        assert!(outcome.data().is_none());
    }

    #[tokio::test]
    async fn test_silent_server_is_tagged_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept and hold connections without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = PowerClient::default()
            .with_base_url(format!("http://{}/api/temporal/daily/point", addr))
            .with_timeout(Duration::from_millis(500));
        let outcome = client
            .fetch_precipitation(33.25, -116.18, &ymd(2016, 12, 1), &ymd(2017, 2, 28))
            .await;
        assert_eq!(outcome, FetchOutcome::Failure(FetchFailure::Timeout));
        assert_eq!(outcome.failure().map(|f| f.to_string()), Some("timeout".to_string()));
        server.abort();
    }
}
