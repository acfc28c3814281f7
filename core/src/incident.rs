//! Incidents: the unit of work the simulation resolves.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::apparatus::ApparatusType;
use crate::location::Location;
use crate::types::{IncidentId, IncidentIndex, SimTime, StationIndex, ZoneIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Fire,
    Medical,
    Hazmat,
    Rescue,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// Department-defined incident categories used by the Department and ML
/// oracles to look up required-apparatus and duration tables. Unlike the
/// C++ original (which declared its `Invalid` sentinel twice in the same
/// enum), this collapses to a single sentinel — see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    StructureFire,
    VehicleFire,
    WildlandFire,
    MedicalEmergency,
    TrafficAccident,
    HazmatSpill,
    TechnicalRescue,
    AlarmActivation,
    Invalid,
}

/// Status is monotone: it only ever advances in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Reported,
    Responded,
    BeingResolved,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    pub station_index: StationIndex,
    pub count: u32,
    pub travel_time_sec: f64,
    pub apparatus_ids: Vec<crate::types::ApparatusId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_index: IncidentIndex,
    pub incident_id: IncidentId,
    pub location: Location,
    pub report_time: SimTime,
    pub responded_time: Option<SimTime>,
    pub resolved_time: Option<SimTime>,
    pub zone_index: ZoneIndex,
    pub incident_type: IncidentType,
    pub level: IncidentLevel,
    pub category: IncidentCategory,
    pub status: IncidentStatus,
    pub required: HashMap<ApparatusType, u32>,
    pub current: HashMap<ApparatusType, u32>,
    pub dispatches: Vec<Dispatch>,
    /// Guards against emitting more than one `IncidentResolution` event for
    /// this incident when multiple dispatch batches target it.
    pub resolution_event_emitted: bool,
}

impl Incident {
    pub fn new(
        incident_index: IncidentIndex,
        incident_id: IncidentId,
        location: Location,
        report_time: SimTime,
        zone_index: ZoneIndex,
        incident_type: IncidentType,
        level: IncidentLevel,
        category: IncidentCategory,
    ) -> Self {
        Self {
            incident_index,
            incident_id,
            location,
            report_time,
            responded_time: None,
            resolved_time: None,
            zone_index,
            incident_type,
            level,
            category,
            status: IncidentStatus::Reported,
            required: HashMap::new(),
            current: HashMap::new(),
            dispatches: Vec::new(),
            resolution_event_emitted: false,
        }
    }

    pub fn required_total(&self) -> u32 {
        self.required.values().sum()
    }

    pub fn current_total(&self) -> u32 {
        self.current.values().sum()
    }

    pub fn is_fully_resourced(&self) -> bool {
        self.current_total() >= self.required_total()
    }

    /// Advances status, refusing to move backwards. No-op if `next` is not
    /// strictly ahead of the current status.
    pub fn advance_status(&mut self, next: IncidentStatus) {
        if next > self.status {
            self.status = next;
        }
    }
}
