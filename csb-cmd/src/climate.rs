//! Winter rainfall and bloom outlook from NASA POWER climate data.

use crate::Options;
use csb_data::aggregate::{spring_mean_temperature, spring_peak_ndvi, winter_total};
use csb_data::prediction::{predict_bloom, BloomPrediction};
use csb_ndvi::date_range::DateRange;
use csb_ndvi::power::{fetch_precipitation_for_locations, FetchOutcome};
use log::info;

fn winter_window(year: i32) -> anyhow::Result<DateRange> {
    DateRange::winter(year).ok_or_else(|| anyhow::anyhow!("no winter for year {}", year))
}

pub async fn run_winter(options: &Options, location: Option<&str>, year: i32) -> anyhow::Result<()> {
    let store = options.store()?;
    let client = options.power_client()?;
    let winter = winter_window(year)?;
    info!("Fetching winter precipitation {} to {}", winter.start(), winter.end());

    let results = match location {
        Some(id) => {
            let config = store.locations().require(id)?;
            let (lat, lon) = config.coordinates();
            let outcome = client
                .fetch_precipitation(lat, lon, &winter.start(), &winter.end())
                .await;
            if let Some(failure) = outcome.failure() {
                anyhow::bail!("precipitation fetch for {} failed: {}", id, failure);
            }
            vec![(id.to_string(), outcome.into_data())]
        }
        None => {
            let mut results: Vec<_> = fetch_precipitation_for_locations(
                &client,
                store.locations(),
                &winter.start(),
                &winter.end(),
            )
            .await
            .into_iter()
            .collect();
            results.sort_by(|a, b| a.0.cmp(&b.0));
            results
        }
    };

    println!("location,year,winter_precipitation_mm,spring_peak_ndvi");
    for (id, precipitation) in results {
        let total = precipitation
            .as_ref()
            .and_then(|p| winter_total(p, year))
            .map_or("".to_string(), |mm| format!("{:.1}", mm));
        let peak = spring_peak_ndvi(&store.load(&id), year);
        println!("{},{},{},{:.3}", id, year, total, peak);
    }
    Ok(())
}

fn print_prediction(prediction: &BloomPrediction) {
    println!("probability: {}%", prediction.probability);
    println!("outlook: {}", prediction.intensity);
    for reason in &prediction.reasoning {
        println!("  {}", reason);
    }
}

pub async fn run_predict(
    options: &Options,
    winter_rain: Option<f64>,
    spring_temp: Option<f64>,
    location: Option<&str>,
    year: Option<i32>,
) -> anyhow::Result<()> {
    if let (Some(rain), Some(temp)) = (winter_rain, spring_temp) {
        print_prediction(&predict_bloom(rain, temp));
        return Ok(());
    }
    let (Some(id), Some(year)) = (location, year) else {
        anyhow::bail!("give either --winter-rain and --spring-temp, or --location and --year");
    };

    let store = options.store()?;
    let (lat, lon) = store.locations().require(id)?.coordinates();
    let client = options.power_client()?;
    let winter = winter_window(year)?;
    let spring = DateRange::spring(year).ok_or_else(|| anyhow::anyhow!("no spring for year {}", year))?;

    let precipitation = match client
        .fetch_precipitation(lat, lon, &winter.start(), &winter.end())
        .await
    {
        FetchOutcome::Success(series) => series,
        FetchOutcome::Failure(failure) => {
            anyhow::bail!("precipitation fetch for {} failed: {}", id, failure)
        }
    };
    let climate = match client
        .fetch_climate(lat, lon, &spring.start(), &spring.end())
        .await
    {
        FetchOutcome::Success(days) => days,
        FetchOutcome::Failure(failure) => {
            anyhow::bail!("climate fetch for {} failed: {}", id, failure)
        }
    };

    let rain = winter_total(&precipitation, year)
        .ok_or_else(|| anyhow::anyhow!("no winter precipitation recorded for {} {}", id, year))?;
    let temp = spring_mean_temperature(&climate, year)
        .ok_or_else(|| anyhow::anyhow!("no spring temperatures recorded for {} {}", id, year))?;
    info!("{} {}: {:.1} mm winter rain, {:.1} °C spring mean", id, year, rain, temp);
    print_prediction(&predict_bloom(rain, temp));
    Ok(())
}
