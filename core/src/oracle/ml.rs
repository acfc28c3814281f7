//! Feature-extraction oracle backed by an externally loaded linear model.
//!
//! No ONNX (or any other inference) crate appears anywhere in this
//! workspace's reference corpus, so rather than fabricate a dependency on
//! one, the "externally loaded model" is a plain JSON document of
//! `{feature_order, weights, bias}` — a linear regression over the
//! extracted feature vector. See DESIGN.md for why.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Timelike, Utc};
use log::error;
use serde::{Deserialize, Serialize};

use crate::apparatus::ApparatusType;
use crate::incident::{Incident, IncidentCategory};
use crate::location::Location;
use crate::rng::SimRng;
use crate::state::State;
use crate::types::SimTime;

use super::ResolutionOracle;

/// One entry in the feature-order contract. Numerical features are scaled
/// by a stored `(mean, scale)` pair; categorical features expand to a
/// one-hot block over their fixed category list. The order here IS the
/// order the weight vector was trained against — validated at load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSpec {
    Numerical { name: String, mean: f64, scale: f64 },
    Categorical { name: String, categories: Vec<String> },
}

impl FeatureSpec {
    fn width(&self) -> usize {
        match self {
            FeatureSpec::Numerical { .. } => 1,
            FeatureSpec::Categorical { categories, .. } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub reference_center: Location,
    pub feature_order: Vec<FeatureSpec>,
}

impl FeatureConfig {
    fn expanded_width(&self) -> usize {
        self.feature_order.iter().map(|f| f.width()).sum()
    }
}

/// `{feature_order, weights, bias}` loaded from JSON. `weights.len()` must
/// equal the expanded (one-hot-flattened) width of `feature_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearResolutionModel {
    pub feature_order: Vec<FeatureSpec>,
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearResolutionModel {
    pub fn validate(&self) -> Result<(), String> {
        let config = FeatureConfig {
            reference_center: Location::new(0.0, 0.0),
            feature_order: self.feature_order.clone(),
        };
        let expected = config.expanded_width();
        if self.weights.len() != expected {
            return Err(format!(
                "model weight vector has {} entries, feature order expands to {expected}",
                self.weights.len()
            ));
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> f64 {
        let dot: f64 = self.weights.iter().zip(features.iter()).map(|(w, f)| w * f).sum();
        (dot + self.bias).max(0.0)
    }
}

fn season_index(month: u32) -> f64 {
    match month {
        12 | 1 | 2 => 0.0,
        3..=5 => 1.0,
        6..=8 => 2.0,
        _ => 3.0,
    }
}

fn shift_index(hour: u32) -> f64 {
    match hour {
        6..=13 => 0.0,
        14..=21 => 1.0,
        _ => 2.0,
    }
}

/// US federal holidays that fall on a fixed calendar date, plus the two
/// that are defined by weekday rule (no holiday-calendar crate appears
/// anywhere in the corpus, so this stays a plain date rule rather than a
/// fabricated dependency).
fn is_holiday(dt: &DateTime<Utc>) -> f64 {
    let (month, day) = (dt.month(), dt.day());
    let fixed_date = matches!(
        (month, day),
        (1, 1)   // New Year's Day
            | (6, 19) // Juneteenth
            | (7, 4)  // Independence Day
            | (11, 11) // Veterans Day
            | (12, 25) // Christmas Day
    );
    if fixed_date {
        return 1.0;
    }

    let weekday_rule = match month {
        // Thanksgiving: fourth Thursday of November.
        11 => dt.weekday() == chrono::Weekday::Thu && (22..=28).contains(&day),
        // Labor Day: first Monday of September.
        9 => dt.weekday() == chrono::Weekday::Mon && day <= 7,
        // Memorial Day: last Monday of May.
        5 => dt.weekday() == chrono::Weekday::Mon && day > 24,
        _ => false,
    };
    if weekday_rule {
        1.0
    } else {
        0.0
    }
}

/// Extracts the numeric feature vector in the config's declared order.
/// Categorical features that have no matching category in the incident's
/// data fall back to an all-zero one-hot block.
fn extract_features(config: &FeatureConfig, system_time: SimTime, incident: &Incident) -> Vec<f64> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(system_time, 0).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
    let distance_m = config.reference_center.haversine_distance_meters(&incident.location);

    let mut out = Vec::with_capacity(config.expanded_width());
    for spec in &config.feature_order {
        match spec {
            FeatureSpec::Numerical { name, mean, scale } => {
                let raw = match name.as_str() {
                    "hour" => dt.hour() as f64,
                    "day_of_week" => dt.weekday().num_days_from_monday() as f64,
                    "month" => dt.month() as f64,
                    "quarter" => ((dt.month() - 1) / 3 + 1) as f64,
                    "day_of_year" => dt.ordinal() as f64,
                    "season" => season_index(dt.month()),
                    "shift" => shift_index(dt.hour()),
                    "is_holiday" => is_holiday(&dt),
                    "distance_from_reference_center_m" => distance_m,
                    _ => 0.0,
                };
                let scale = if scale.abs() < 1e-9 { 1.0 } else { *scale };
                out.push((raw - mean) / scale);
            }
            FeatureSpec::Categorical { name, categories } => {
                let value = match name.as_str() {
                    "category" => format!("{:?}", incident.category),
                    _ => String::new(),
                };
                for cat in categories {
                    out.push(if *cat == value { 1.0 } else { 0.0 });
                }
            }
        }
    }
    out
}

pub struct MlOracle {
    rng: SimRng,
    config: FeatureConfig,
    model: LinearResolutionModel,
    required_by_category: HashMap<IncidentCategory, HashMap<ApparatusType, u32>>,
    fallback_duration_sec: f64,
}

impl MlOracle {
    pub fn new(
        rng: SimRng,
        config: FeatureConfig,
        model: LinearResolutionModel,
        required_by_category: HashMap<IncidentCategory, HashMap<ApparatusType, u32>>,
    ) -> Result<Self, String> {
        model.validate()?;
        Ok(Self {
            rng,
            config,
            model,
            required_by_category,
            fallback_duration_sec: 1800.0,
        })
    }
}

impl ResolutionOracle for MlOracle {
    fn required_apparatus(&self, incident: &Incident) -> HashMap<ApparatusType, u32> {
        self.required_by_category
            .get(&incident.category)
            .cloned()
            .unwrap_or_default()
    }

    fn resolution_time(&mut self, state: &State, incident: &Incident) -> f64 {
        let features = extract_features(&self.config, state.system_time, incident);
        if features.len() != self.model.weights.len() {
            error!(
                "ml oracle: feature vector length {} does not match model ({}), using neutral prior",
                features.len(),
                self.model.weights.len()
            );
            // Jitter the fallback slightly so repeated failures under the
            // same seed stay deterministic rather than constant.
            return self.fallback_duration_sec + self.rng.next_f64() * 60.0;
        }
        self.model.predict(&features)
    }
}
