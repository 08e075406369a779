//! Rule-of-thumb bloom outlook from winter rain and spring temperature.
//!
//! The 2017 superbloom followed roughly 150 mm of winter rain, which anchors
//! the rainfall tiers below.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Winter rainfall in mm that matched the 2017 superbloom.
pub const SUPERBLOOM_RAIN_MM: f64 = 150.0;

pub const MODERATE_RAIN_MM: f64 = 100.0;
pub const LOW_RAIN_MM: f64 = 50.0;

/// Upper bound on any reported probability.
pub const MAX_PROBABILITY: u8 = 90;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloomOutlook {
    Unlikely,
    Low,
    Moderate,
    High,
}

impl BloomOutlook {
    pub fn from_probability(probability: u8) -> BloomOutlook {
        match probability {
            p if p > 60 => BloomOutlook::High,
            p if p > 40 => BloomOutlook::Moderate,
            p if p > 20 => BloomOutlook::Low,
            _ => BloomOutlook::Unlikely,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BloomOutlook::High => "High - Superbloom Likely",
            BloomOutlook::Moderate => "Moderate Bloom Likely",
            BloomOutlook::Low => "Low Bloom Possible",
            BloomOutlook::Unlikely => "Unlikely",
        }
    }
}

impl fmt::Display for BloomOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomPrediction {
    /// Percent, 0..=90
    pub probability: u8,
    pub intensity: BloomOutlook,
    /// One line per rule that fired, in evaluation order.
    pub reasoning: Vec<String>,
}

/// Score a season from total winter rain (mm) and mean spring temperature
/// (°C). Pure and deterministic.
pub fn predict_bloom(winter_rain_mm: f64, spring_temp_c: f64) -> BloomPrediction {
    let mut probability: u8 = 0;
    let mut reasoning = Vec::new();

    if winter_rain_mm >= SUPERBLOOM_RAIN_MM {
        probability = 70;
        reasoning.push(format!(
            "✅ Abundant winter rain ({}mm) matches 2017 levels",
            winter_rain_mm
        ));
    } else if winter_rain_mm >= MODERATE_RAIN_MM {
        probability = 45;
        reasoning.push(format!(
            "⚠️ Moderate rain ({}mm) - {}% of 2017",
            winter_rain_mm,
            (winter_rain_mm / SUPERBLOOM_RAIN_MM * 100.0).round()
        ));
    } else if winter_rain_mm >= LOW_RAIN_MM {
        probability = 20;
        reasoning.push(format!("⚠️ Low rainfall ({}mm)", winter_rain_mm));
    } else {
        reasoning.push(format!(
            "❌ Insufficient rain ({}mm < {}mm threshold)",
            winter_rain_mm, LOW_RAIN_MM
        ));
    }

    if spring_temp_c > 15.0 && spring_temp_c < 25.0 {
        probability += 20;
        reasoning.push(format!("✅ Optimal spring temps ({}°C)", spring_temp_c));
    } else if spring_temp_c <= 15.0 {
        probability += 10;
        reasoning.push(format!("⚠️ Cool spring ({}°C)", spring_temp_c));
    }

    let probability = probability.min(MAX_PROBABILITY);
    BloomPrediction {
        probability,
        intensity: BloomOutlook::from_probability(probability),
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superbloom_season() {
        let prediction = predict_bloom(150.0, 17.0);
        assert_eq!(prediction.probability, 90);
        assert_eq!(prediction.intensity, BloomOutlook::High);
        assert_eq!(prediction.reasoning.len(), 2);
        assert!(prediction.reasoning[0].contains("150mm"));
    }

    #[test]
    fn test_moderate_rain_optimal_temperature() {
        let prediction = predict_bloom(120.0, 17.0);
        assert_eq!(prediction.probability, 65);
        // 65 is above the 60 cut point
        assert_eq!(prediction.intensity, BloomOutlook::High);
        assert_eq!(prediction.reasoning[0], "⚠️ Moderate rain (120mm) - 80% of 2017");
        assert_eq!(prediction.reasoning[1], "✅ Optimal spring temps (17°C)");
    }

    #[test]
    fn test_hot_spring_adds_nothing() {
        let prediction = predict_bloom(60.0, 25.0);
        assert_eq!(prediction.probability, 20);
        assert_eq!(prediction.intensity, BloomOutlook::Unlikely);
        assert_eq!(prediction.reasoning.len(), 1);
    }

    #[test]
    fn test_cool_spring() {
        let prediction = predict_bloom(100.0, 15.0);
        assert_eq!(prediction.probability, 55);
        assert_eq!(prediction.intensity, BloomOutlook::Moderate);
        assert_eq!(prediction.reasoning[1], "⚠️ Cool spring (15°C)");
    }

    #[test]
    fn test_dry_winter() {
        let prediction = predict_bloom(10.0, 30.0);
        assert_eq!(prediction.probability, 0);
        assert_eq!(prediction.intensity.label(), "Unlikely");
        assert_eq!(
            prediction.reasoning,
            vec!["❌ Insufficient rain (10mm < 50mm threshold)".to_string()]
        );
        assert_eq!(predict_bloom(49.9, 10.0).intensity, BloomOutlook::Unlikely);
        assert_eq!(predict_bloom(50.0, 10.0).intensity, BloomOutlook::Low);
    }

    #[test]
    fn test_probability_bounds() {
        for rain in [0.0, 49.0, 50.0, 99.0, 100.0, 149.0, 150.0, 500.0] {
            for temp in [-5.0, 15.0, 15.5, 24.9, 25.0, 40.0] {
                let prediction = predict_bloom(rain, temp);
                assert!(prediction.probability <= MAX_PROBABILITY);
                assert_eq!(
                    prediction.intensity,
                    BloomOutlook::from_probability(prediction.probability)
                );
            }
        }
    }
}
