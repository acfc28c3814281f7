//! Apparatus units and their lifecycle.

use serde::{Deserialize, Serialize};

use crate::types::{ApparatusId, StationIndex};

/// Closed set of unit types the simulator reasons about. `Invalid` is a
/// sentinel produced by failed CSV parses; it must never appear in live
/// state (a row that parses to `Invalid` is dropped at load time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApparatusType {
    Pumper,
    Engine,
    Truck,
    Rescue,
    Hazard,
    Chief,
    Squad,
    Fast,
    Medic,
    Brush,
    Boat,
    Utv,
    Reach,
    Invalid,
}

impl ApparatusType {
    pub const ALL: [ApparatusType; 13] = [
        ApparatusType::Pumper,
        ApparatusType::Engine,
        ApparatusType::Truck,
        ApparatusType::Rescue,
        ApparatusType::Hazard,
        ApparatusType::Chief,
        ApparatusType::Squad,
        ApparatusType::Fast,
        ApparatusType::Medic,
        ApparatusType::Brush,
        ApparatusType::Boat,
        ApparatusType::Utv,
        ApparatusType::Reach,
    ];

    /// Parses the loose casing found in source CSVs; unrecognized text
    /// becomes `Invalid` rather than failing the whole row.
    pub fn parse_loose(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pumper" => Self::Pumper,
            "engine" => Self::Engine,
            "truck" => Self::Truck,
            "rescue" => Self::Rescue,
            "hazard" | "hazmat" => Self::Hazard,
            "chief" => Self::Chief,
            "squad" => Self::Squad,
            "fast" => Self::Fast,
            "medic" | "ambulance" => Self::Medic,
            "brush" => Self::Brush,
            "boat" => Self::Boat,
            "utv" => Self::Utv,
            "reach" => Self::Reach,
            _ => Self::Invalid,
        }
    }
}

/// Apparatus status transitions in the order the environment model drives
/// them: an apparatus is dispatched, travels, works the incident, then
/// returns. `Available` is both the start and end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApparatusStatus {
    Available,
    Dispatched,
    EnRouteToIncident,
    AtIncident,
    ReturningToStation,
}

/// A single concrete unit. Created once at simulation start and never
/// destroyed mid-run — only its `status` and, transiently, its dispatch
/// target change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apparatus {
    pub id: ApparatusId,
    pub station_index: StationIndex,
    pub apparatus_type: ApparatusType,
    pub status: ApparatusStatus,
}

impl Apparatus {
    pub fn new(id: ApparatusId, station_index: StationIndex, apparatus_type: ApparatusType) -> Self {
        Self {
            id,
            station_index,
            apparatus_type,
            status: ApparatusStatus::Available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_loose_recognizes_common_aliases() {
        assert_eq!(ApparatusType::parse_loose("Engine"), ApparatusType::Engine);
        assert_eq!(ApparatusType::parse_loose(" HAZMAT "), ApparatusType::Hazard);
        assert_eq!(ApparatusType::parse_loose("ambulance"), ApparatusType::Medic);
    }

    #[test]
    fn parse_loose_falls_back_to_invalid() {
        assert_eq!(ApparatusType::parse_loose("spaceship"), ApparatusType::Invalid);
    }

    #[test]
    fn new_apparatus_starts_available() {
        let a = Apparatus::new(1, 0, ApparatusType::Engine);
        assert_eq!(a.status, ApparatusStatus::Available);
    }
}
