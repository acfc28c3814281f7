//! Run configuration. No global singleton — a `SimConfig` is built once
//! at startup by the binary and threaded through explicitly, replacing
//! the env-singleton pattern the reference implementation used.

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// All paths and knobs a run needs, read from an env-style key/value map.
/// Built via [`SimConfig::from_env_map`], [`SimConfig::from_file`], or
/// [`SimConfig::from_process_env`] — never from a global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub incidents_csv_path: String,
    pub stations_csv_path: String,
    pub apparatus_csv_path: String,
    pub bounds_geojson_path: Option<String>,
    pub distance_matrix_path: String,
    pub duration_matrix_path: String,
    pub beats_matrix_path: Option<String>,
    pub zone_map_csv_path: Option<String>,
    pub osrm_url: Option<String>,
    pub logs_path: Option<String>,
    pub policy: PolicyKind,
    pub resolution_model: ResolutionModelKind,
    pub onnx_model_path: Option<String>,
    pub feature_config_path: Option<String>,
    pub random_seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Nearest,
    Beats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionModelKind {
    HardCoded,
    Department,
    Ml,
}

const REQUIRED_KEYS: &[&str] = &[
    "INCIDENTS_CSV_PATH",
    "STATIONS_CSV_PATH",
    "APPARATUS_CSV_PATH",
    "DISTANCE_MATRIX_PATH",
    "DURATION_MATRIX_PATH",
];

impl SimConfig {
    /// Builds a config from an explicit key/value map — the common path
    /// for tests and for `from_file`/`from_process_env`, which just
    /// collect a map a different way before delegating here.
    pub fn from_env_map(env: &HashMap<String, String>) -> SimResult<Self> {
        for key in REQUIRED_KEYS {
            if !env.contains_key(*key) {
                return Err(SimError::MissingConfig((*key).to_string()));
            }
        }

        let get = |key: &str| env.get(key).cloned();
        let get_required = |key: &str| -> SimResult<String> {
            env.get(key)
                .cloned()
                .ok_or_else(|| SimError::MissingConfig(key.to_string()))
        };

        let policy = match get("POLICY").as_deref() {
            Some("FIREBEATS") => PolicyKind::Beats,
            Some("NEAREST") | None => PolicyKind::Nearest,
            Some(other) => {
                return Err(SimError::InvalidConfig {
                    key: "POLICY".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let resolution_model = match get("RESOLUTION_MODEL").as_deref() {
            Some("DEPARTMENT") => ResolutionModelKind::Department,
            Some("ML") => ResolutionModelKind::Ml,
            Some("HARDCODED") | None => ResolutionModelKind::HardCoded,
            Some(other) => {
                return Err(SimError::InvalidConfig {
                    key: "RESOLUTION_MODEL".to_string(),
                    value: other.to_string(),
                })
            }
        };

        if resolution_model == ResolutionModelKind::Ml
            && (get("ONNX_MODEL_PATH").is_none() || get("FEATURE_CONFIG_PATH").is_none())
        {
            return Err(SimError::MissingConfig(
                "ONNX_MODEL_PATH and FEATURE_CONFIG_PATH are required when RESOLUTION_MODEL=ML".to_string(),
            ));
        }

        let random_seed = match get("RANDOM_SEED") {
            Some(raw) => raw.parse::<u64>().map_err(|_| SimError::InvalidConfig {
                key: "RANDOM_SEED".to_string(),
                value: raw,
            })?,
            None => 0,
        };

        Ok(Self {
            incidents_csv_path: get_required("INCIDENTS_CSV_PATH")?,
            stations_csv_path: get_required("STATIONS_CSV_PATH")?,
            apparatus_csv_path: get_required("APPARATUS_CSV_PATH")?,
            bounds_geojson_path: get("BOUNDS_GEOJSON_PATH"),
            distance_matrix_path: get_required("DISTANCE_MATRIX_PATH")?,
            duration_matrix_path: get_required("DURATION_MATRIX_PATH")?,
            beats_matrix_path: get("BEATS_MATRIX_PATH"),
            zone_map_csv_path: get("ZONE_MAP_CSV_PATH"),
            osrm_url: get("OSRM_URL"),
            logs_path: get("LOGS_PATH"),
            policy,
            resolution_model,
            onnx_model_path: get("ONNX_MODEL_PATH"),
            feature_config_path: get("FEATURE_CONFIG_PATH"),
            random_seed,
        })
    }

    /// Reads an env-style `KEY=value` file, one assignment per line,
    /// blank lines and `#`-prefixed comments ignored.
    pub fn from_file(path: &str) -> SimResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| SimError::Other(anyhow::anyhow!("cannot read config file {path}: {e}")))?;
        let mut env = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                env.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self::from_env_map(&env)
    }

    /// Reads straight from the real process environment. Must be called
    /// exactly once, from `main`, never from library code.
    pub fn from_process_env() -> SimResult<Self> {
        let mut env = HashMap::new();
        for key in REQUIRED_KEYS
            .iter()
            .copied()
            .chain([
                "BOUNDS_GEOJSON_PATH",
                "BEATS_MATRIX_PATH",
                "ZONE_MAP_CSV_PATH",
                "OSRM_URL",
                "LOGS_PATH",
                "POLICY",
                "RESOLUTION_MODEL",
                "ONNX_MODEL_PATH",
                "FEATURE_CONFIG_PATH",
                "RANDOM_SEED",
            ])
        {
            if let Ok(value) = std::env::var(key) {
                env.insert(key.to_string(), value);
            }
        }
        Self::from_env_map(&env)
    }

    /// An in-memory fixture for tests — no filesystem access at all.
    pub fn default_test() -> Self {
        Self {
            incidents_csv_path: "incidents.csv".to_string(),
            stations_csv_path: "stations.csv".to_string(),
            apparatus_csv_path: "apparatus.csv".to_string(),
            bounds_geojson_path: None,
            distance_matrix_path: "distance.bin".to_string(),
            duration_matrix_path: "duration.bin".to_string(),
            beats_matrix_path: None,
            zone_map_csv_path: None,
            osrm_url: None,
            logs_path: None,
            policy: PolicyKind::Nearest,
            resolution_model: ResolutionModelKind::HardCoded,
            onnx_model_path: None,
            feature_config_path: None,
            random_seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_key_is_reported_by_name() {
        let env = HashMap::new();
        let err = SimConfig::from_env_map(&env).unwrap_err();
        assert!(matches!(err, SimError::MissingConfig(_)));
    }

    #[test]
    fn unrecognized_policy_value_is_an_invalid_config_error() {
        let mut env = HashMap::new();
        for key in REQUIRED_KEYS {
            env.insert(key.to_string(), "x".to_string());
        }
        env.insert("POLICY".to_string(), "diagonal".to_string());
        let err = SimConfig::from_env_map(&env).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { .. }));
    }

    #[test]
    fn default_test_config_round_trips_through_from_env_map_shape() {
        let config = SimConfig::default_test();
        assert_eq!(config.policy, PolicyKind::Nearest);
        assert_eq!(config.random_seed, 42);
    }
}
