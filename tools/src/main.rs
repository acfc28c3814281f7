//! fleet-runner: headless runner for the fire/EMS fleet dispatch simulator.
//!
//! Usage:
//!   fleet-runner --config run.env
//!   fleet-runner --config run.env --replay

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use fleetsim_core::config::{PolicyKind, ResolutionModelKind, SimConfig};
use fleetsim_core::environment::EnvironmentModel;
use fleetsim_core::loaders;
use fleetsim_core::oracle::department::DepartmentOracle;
use fleetsim_core::oracle::hardcoded::HardCodedOracle;
use fleetsim_core::oracle::ml::{FeatureConfig, LinearResolutionModel, MlOracle};
use fleetsim_core::oracle::ResolutionOracle;
use fleetsim_core::policy::{BeatsDispatch, DispatchPolicy, NearestDispatch};
use fleetsim_core::rng::{RngBank, RngSlot};
use fleetsim_core::simulator::Simulator;
use fleetsim_core::state::State;

const EXIT_SUCCESS: u8 = 0;
const EXIT_INVALID_INPUT: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_FATAL: u8 = 3;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("fleet-runner: {e:#}");
            ExitCode::from(classify_exit_code(&e))
        }
    }
}

fn classify_exit_code(e: &anyhow::Error) -> u8 {
    use fleetsim_core::error::SimError;
    match e.downcast_ref::<SimError>() {
        Some(SimError::MissingConfig(_)) | Some(SimError::InvalidConfig { .. }) => EXIT_CONFIG_ERROR,
        Some(SimError::MatrixFileMissing { .. })
        | Some(SimError::MatrixShape(_))
        | Some(SimError::BoundsFileMissing { .. })
        | Some(SimError::Csv(_)) => EXIT_INVALID_INPUT,
        Some(_) => EXIT_RUNTIME_FATAL,
        None => EXIT_RUNTIME_FATAL,
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let inline_json = args
        .windows(2)
        .find(|w| w[0] == "--config-json")
        .map(|w| w[1].as_str());
    let replay_only = args.iter().any(|a| a == "--replay");

    let config = match (config_path, inline_json) {
        (Some(path), _) => SimConfig::from_file(path).context("loading configuration file")?,
        (None, Some(json)) => {
            let env: HashMap<String, String> = serde_json::from_str(json).context("parsing inline config JSON")?;
            SimConfig::from_env_map(&env).context("building configuration from inline JSON")?
        }
        (None, None) => SimConfig::from_process_env().context("loading configuration from process environment")?,
    };

    fleetsim_core::logging::init(&config);

    println!("fleet-runner");
    println!("  policy:           {:?}", config.policy);
    println!("  resolution_model: {:?}", config.resolution_model);
    println!("  random_seed:      {}", config.random_seed);
    println!();

    let (mut stations, index_by_station_id, station_diag) = loaders::load_stations(&config.stations_csv_path, None)
        .context("loading stations")?;
    let (apparatus, apparatus_diag) =
        loaders::load_apparatus(&config.apparatus_csv_path, &mut stations, &index_by_station_id)
            .context("loading apparatus")?;
    let (incidents, incident_diag) = loaders::load_incidents(&config.incidents_csv_path, None)
        .context("loading incidents")?;

    println!(
        "loaded {} station(s) ({} ignored), {} apparatus unit(s) ({} ignored), {} incident(s) ({} ignored)",
        stations.len(),
        station_diag.rows_ignored,
        apparatus.len(),
        apparatus_diag.rows_ignored,
        incidents.len(),
        incident_diag.rows_ignored
    );

    let duration_matrix = loaders::load_duration_matrix(&config.duration_matrix_path).context("loading duration matrix")?;

    let rng_bank = RngBank::new(config.random_seed);
    let oracle: Box<dyn ResolutionOracle> = match config.resolution_model {
        ResolutionModelKind::HardCoded => Box::new(HardCodedOracle::new(rng_bank.for_slot(RngSlot::HardCodedOracle))),
        ResolutionModelKind::Department => Box::new(DepartmentOracle::new(
            rng_bank.for_slot(RngSlot::DepartmentOracle),
            HashMap::new(),
            HashMap::new(),
        )),
        ResolutionModelKind::Ml => {
            // SimConfig::from_env_map already rejects ML without both paths set.
            let feature_config_path = config.feature_config_path.as_deref().expect("validated by SimConfig");
            let model_path = config.onnx_model_path.as_deref().expect("validated by SimConfig");

            let feature_config: FeatureConfig = serde_json::from_str(
                &std::fs::read_to_string(feature_config_path).context("reading FEATURE_CONFIG_PATH")?,
            )
            .context("parsing FEATURE_CONFIG_PATH as JSON")?;
            let model: LinearResolutionModel = serde_json::from_str(
                &std::fs::read_to_string(model_path).context("reading ONNX_MODEL_PATH")?,
            )
            .context("parsing ONNX_MODEL_PATH as JSON")?;

            Box::new(
                MlOracle::new(rng_bank.for_slot(RngSlot::MlOracle), feature_config, model, HashMap::new())
                    .map_err(|e| anyhow::anyhow!("ml model validation failed: {e}"))?,
            )
        }
    };

    let policy: Box<dyn DispatchPolicy> = match config.policy {
        PolicyKind::Nearest => Box::new(NearestDispatch::new(duration_matrix)),
        PolicyKind::Beats => {
            let beats_path = config
                .beats_matrix_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("POLICY=FIREBEATS requires BEATS_MATRIX_PATH"))?;
            let beats_matrix = loaders::load_beats_matrix(beats_path).context("loading beats matrix")?;
            Box::new(BeatsDispatch::new(beats_matrix, duration_matrix))
        }
    };

    let initial_events = loaders::generate_incident_reported_events(&incidents);
    let state = State::new(stations, apparatus, incidents);
    let environment = EnvironmentModel::new(oracle);
    let mut simulator = Simulator::new(state, initial_events, environment, policy);

    if !replay_only {
        let summary = simulator.run().map_err(anyhow::Error::from)?;
        println!("=== RUN SUMMARY ===");
        println!("  events processed: {}", summary.steps_processed);
        println!("  incidents resolved:   {}", summary.incidents_resolved);
        println!("  incidents unresolved: {}", summary.incidents_unresolved);
        println!();
    }

    println!("=== INCIDENT TIMINGS ===");
    for summary in simulator.replay() {
        println!(
            "  incident {} (id {}): reported={} responded={:?} resolved={:?} dispatches={}",
            summary.incident_index,
            summary.incident_id,
            summary.report_time,
            summary.responded_time,
            summary.resolved_time,
            summary.dispatch_count
        );
    }

    Ok(())
}
