//! Location overview and imagery tile URLs.

use crate::Options;
use csb_ndvi::imagery::{gibs_tile_url, gibs_tile_url_from_str, ImageryLayer};
use csb_ndvi::prediction_catalog::{LocationPrediction, PredictionCatalog};
use csb_store::models::LocationSummary;
use csb_utils::dates::parse_date;
use serde::Serialize;

pub fn run_tiles(options: &Options, date: &str, layer: Option<&str>) -> anyhow::Result<()> {
    let today = options.today()?;
    if let Some(layer) = layer {
        let url = gibs_tile_url_from_str(date, layer, &today)
            .ok_or_else(|| anyhow::anyhow!("no imagery for layer {} on {}", layer, date))?;
        println!("{}", url);
        return Ok(());
    }
    let date = parse_date(date)?;
    for layer in ImageryLayer::ALL {
        match gibs_tile_url(&date, layer, &today) {
            Some(url) => println!("{}", url),
            None => anyhow::bail!("no imagery for {}: date is after {}", date, today),
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct LocationRow<'a> {
    #[serde(flatten)]
    summary: &'a LocationSummary,
    prediction: Option<&'a LocationPrediction>,
}

pub fn run_locations(options: &Options, json: bool) -> anyhow::Result<()> {
    let store = options.store()?;
    let catalog = PredictionCatalog::embedded()?;
    let summaries = store.summaries();

    if json {
        let rows: Vec<LocationRow> = summaries
            .iter()
            .map(|summary| LocationRow {
                summary,
                prediction: catalog.for_location(&summary.id),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for summary in &summaries {
        let span = summary
            .span
            .map_or("no data".to_string(), |s| format!("{} to {}", s.start, s.end));
        println!("{} ({})", summary.name, summary.id);
        if !summary.enabled {
            println!(
                "  disabled: {}",
                summary.disabled_reason.as_deref().unwrap_or("no reason given")
            );
            continue;
        }
        println!(
            "  {} observations, {} forecast rows, {}",
            summary.points, summary.forecast_records, span
        );
        if let Some(prediction) = catalog.for_location(&summary.id) {
            println!(
                "  predicted bloom {} to {}, peak {} at NDVI {:.2}",
                prediction.predicted_start_date,
                prediction.predicted_end_date,
                prediction.predicted_peak_date,
                prediction.predicted_peak_ndvi
            );
        }
    }
    Ok(())
}
