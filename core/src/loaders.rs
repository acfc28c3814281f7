//! Loaders for the external inputs the core consumes: station/incident/
//! apparatus CSVs, a bounding polygon, the binary travel matrices, and a
//! diagnostic-only zone name map.
//!
//! Recoverable data errors (an unparseable row, an out-of-bounds point, a
//! duplicate incident id) are skipped and counted, never fatal. A missing
//! matrix file at init is fatal — see [`crate::error::SimError`].

use std::collections::HashMap;
use std::fs::File;

use log::warn;
use serde::Deserialize;

use crate::apparatus::{Apparatus, ApparatusType};
use crate::error::{SimError, SimResult};
use crate::event::SimEvent;
use crate::incident::{Incident, IncidentCategory, IncidentLevel, IncidentType};
use crate::location::Location;
use crate::matrix::{DenseMatrixF64, DenseMatrixI32};
use crate::station::Station;
use crate::types::{IncidentId, StationId, StationIndex};

/// Number of rows a loader skipped, broken down by reason, for the run
/// summary printed at the end.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadDiagnostics {
    pub rows_read: usize,
    pub rows_ignored: usize,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    station_id: u32,
    lat: f64,
    lon: f64,
    #[serde(default)]
    zone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApparatusRow {
    apparatus_id: u32,
    station_id: u32,
    apparatus_type: String,
}

#[derive(Debug, Deserialize)]
struct IncidentRow {
    incident_id: u32,
    lat: f64,
    lon: f64,
    report_time: i64,
    zone_index: i32,
    incident_type: String,
    level: String,
    category: String,
}

fn parse_incident_type(raw: &str) -> IncidentType {
    match raw.trim().to_ascii_lowercase().as_str() {
        "fire" => IncidentType::Fire,
        "medical" => IncidentType::Medical,
        "hazmat" => IncidentType::Hazmat,
        "rescue" => IncidentType::Rescue,
        _ => IncidentType::Other,
    }
}

fn parse_incident_level(raw: &str) -> Option<IncidentLevel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "low" => Some(IncidentLevel::Low),
        "moderate" => Some(IncidentLevel::Moderate),
        "high" => Some(IncidentLevel::High),
        "critical" => Some(IncidentLevel::Critical),
        _ => None,
    }
}

fn parse_incident_category(raw: &str) -> IncidentCategory {
    match raw.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
        "structure_fire" => IncidentCategory::StructureFire,
        "vehicle_fire" => IncidentCategory::VehicleFire,
        "wildland_fire" => IncidentCategory::WildlandFire,
        "medical_emergency" => IncidentCategory::MedicalEmergency,
        "traffic_accident" => IncidentCategory::TrafficAccident,
        "hazmat_spill" => IncidentCategory::HazmatSpill,
        "technical_rescue" => IncidentCategory::TechnicalRescue,
        "alarm_activation" => IncidentCategory::AlarmActivation,
        _ => IncidentCategory::Invalid,
    }
}

/// Loads the bounding polygon ring from a GeoJSON document. Only the
/// single outer ring of the first `Polygon` (or the first polygon of a
/// `MultiPolygon`) is used — there is no `geojson` crate in this
/// workspace's dependency stack, so this hand-parses the (lon, lat) ring
/// via `serde_json::Value`.
pub fn load_bounds_geojson(path: &str) -> SimResult<Vec<(f64, f64)>> {
    let text = std::fs::read_to_string(path).map_err(|_| SimError::BoundsFileMissing { path: path.to_string() })?;
    let doc: serde_json::Value = serde_json::from_str(&text)?;

    let geometry = doc.get("geometry").unwrap_or(&doc);
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| SimError::Other(anyhow::anyhow!("GeoJSON document at {path} has no coordinates")))?;

    // Polygon: [ [ [lon, lat], ... ] ]; MultiPolygon: [ [ [ [lon, lat], ... ] ] ]
    let outer_ring = if coordinates[0][0][0].is_array() {
        &coordinates[0][0]
    } else {
        &coordinates[0]
    };

    let mut ring = Vec::new();
    for point in outer_ring.as_array().into_iter().flatten() {
        let lon = point[0].as_f64().unwrap_or(0.0);
        let lat = point[1].as_f64().unwrap_or(0.0);
        ring.push((lon, lat));
    }
    Ok(ring)
}

/// Loads stations from CSV, dropping (and counting) any outside `bounds`
/// when a bounding polygon is supplied.
pub fn load_stations(path: &str, bounds: Option<&[(f64, f64)]>) -> SimResult<(Vec<Station>, HashMap<StationId, StationIndex>, LoadDiagnostics)> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut stations = Vec::new();
    let mut index_by_id = HashMap::new();
    let mut diagnostics = LoadDiagnostics::default();

    for result in reader.deserialize::<StationRow>() {
        diagnostics.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("load_stations: skipping unparseable row: {e}");
                diagnostics.rows_ignored += 1;
                continue;
            }
        };

        let location = Location::new(row.lat, row.lon);
        if let Some(ring) = bounds {
            if !location.inside_polygon(ring) {
                warn!("load_stations: station {} is outside the configured bounds, dropping", row.station_id);
                diagnostics.rows_ignored += 1;
                continue;
            }
        }

        let station_index = stations.len() as StationIndex;
        index_by_id.insert(row.station_id, station_index);
        stations.push(Station::new(station_index, row.station_id, location));
    }

    Ok((stations, index_by_id, diagnostics))
}

/// Loads apparatus from CSV and attaches each unit to its station by
/// `station_id`. Rows referencing an unknown station, or with an
/// unparseable apparatus type, are skipped and counted.
pub fn load_apparatus(
    path: &str,
    stations: &mut [Station],
    index_by_station_id: &HashMap<StationId, StationIndex>,
) -> SimResult<(Vec<Apparatus>, LoadDiagnostics)> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut apparatus = Vec::new();
    let mut diagnostics = LoadDiagnostics::default();

    for result in reader.deserialize::<ApparatusRow>() {
        diagnostics.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("load_apparatus: skipping unparseable row: {e}");
                diagnostics.rows_ignored += 1;
                continue;
            }
        };

        let Some(&station_index) = index_by_station_id.get(&row.station_id) else {
            warn!("load_apparatus: unit {} references unknown station {}", row.apparatus_id, row.station_id);
            diagnostics.rows_ignored += 1;
            continue;
        };

        let apparatus_type = ApparatusType::parse_loose(&row.apparatus_type);
        if apparatus_type == ApparatusType::Invalid {
            warn!("load_apparatus: unit {} has unrecognized type '{}'", row.apparatus_id, row.apparatus_type);
            diagnostics.rows_ignored += 1;
            continue;
        }

        stations[station_index as usize].add_apparatus(apparatus_type, 1);
        apparatus.push(Apparatus::new(row.apparatus_id, station_index, apparatus_type));
    }

    Ok((apparatus, diagnostics))
}

/// Loads incidents from CSV, rejecting duplicate `incident_id`s and
/// dropping points outside `bounds`.
pub fn load_incidents(path: &str, bounds: Option<&[(f64, f64)]>) -> SimResult<(Vec<Incident>, LoadDiagnostics)> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut incidents = Vec::new();
    let mut seen_ids: HashMap<IncidentId, ()> = HashMap::new();
    let mut diagnostics = LoadDiagnostics::default();

    for result in reader.deserialize::<IncidentRow>() {
        diagnostics.rows_read += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("load_incidents: skipping unparseable row: {e}");
                diagnostics.rows_ignored += 1;
                continue;
            }
        };

        if seen_ids.contains_key(&row.incident_id) {
            warn!("load_incidents: duplicate incident id {}, ignoring", row.incident_id);
            diagnostics.rows_ignored += 1;
            continue;
        }

        let location = Location::new(row.lat, row.lon);
        if let Some(ring) = bounds {
            if !location.inside_polygon(ring) {
                warn!("load_incidents: incident {} is outside the configured bounds, dropping", row.incident_id);
                diagnostics.rows_ignored += 1;
                continue;
            }
        }

        let Some(level) = parse_incident_level(&row.level) else {
            warn!("load_incidents: incident {} has unrecognized level '{}'", row.incident_id, row.level);
            diagnostics.rows_ignored += 1;
            continue;
        };

        seen_ids.insert(row.incident_id, ());
        let incident_index = incidents.len() as u32;
        incidents.push(Incident::new(
            incident_index,
            row.incident_id,
            location,
            row.report_time,
            row.zone_index,
            parse_incident_type(&row.incident_type),
            level,
            parse_incident_category(&row.category),
        ));
    }

    Ok((incidents, diagnostics))
}

/// Diagnostic-only mapping from `station_id` to a human zone name. Never
/// consulted by dispatch logic — purely for readable run summaries.
pub fn load_zone_map(path: &str) -> SimResult<HashMap<StationId, String>> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    let mut reader = csv::Reader::from_reader(file);

    #[derive(Debug, Deserialize)]
    struct ZoneRow {
        station_id: u32,
        zone_name: String,
    }

    let mut map = HashMap::new();
    for result in reader.deserialize::<ZoneRow>() {
        if let Ok(row) = result {
            map.insert(row.station_id, row.zone_name);
        }
    }
    Ok(map)
}

pub fn load_duration_matrix(path: &str) -> SimResult<DenseMatrixF64> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    DenseMatrixF64::read_from(file)
}

pub fn load_distance_matrix(path: &str) -> SimResult<DenseMatrixF64> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    DenseMatrixF64::read_from(file)
}

pub fn load_beats_matrix(path: &str) -> SimResult<DenseMatrixI32> {
    let file = File::open(path).map_err(|_| SimError::MatrixFileMissing { path: path.to_string() })?;
    DenseMatrixI32::read_from(file)
}

/// Generates the initial `IncidentReported` event stream from a loaded
/// incident table, one event per incident at its `report_time`.
pub fn generate_incident_reported_events(incidents: &[Incident]) -> Vec<SimEvent> {
    incidents
        .iter()
        .map(|incident| SimEvent::IncidentReported {
            event_time: incident.report_time,
            incident_index: incident.incident_index,
        })
        .collect()
}
