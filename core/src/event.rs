//! Simulation events — the only things the event queue and environment
//! model exchange. Ordered strictly by `event_time`; ties break FIFO via
//! the queue's insertion sequence, not anything carried on the event
//! itself.

use serde::{Deserialize, Serialize};

use crate::apparatus::ApparatusType;
use crate::types::{IncidentIndex, SimTime, StationIndex};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SimEvent {
    IncidentReported {
        event_time: SimTime,
        incident_index: IncidentIndex,
    },
    ApparatusArrivalAtIncident {
        event_time: SimTime,
        incident_index: IncidentIndex,
        station_index: StationIndex,
    },
    IncidentResolution {
        event_time: SimTime,
        incident_index: IncidentIndex,
    },
    ApparatusReturnToStation {
        event_time: SimTime,
        incident_index: IncidentIndex,
        station_index: StationIndex,
        apparatus_type: ApparatusType,
        engines_count: u32,
        apparatus_ids: Vec<crate::types::ApparatusId>,
    },
}

impl SimEvent {
    pub fn event_time(&self) -> SimTime {
        match self {
            Self::IncidentReported { event_time, .. }
            | Self::ApparatusArrivalAtIncident { event_time, .. }
            | Self::IncidentResolution { event_time, .. }
            | Self::ApparatusReturnToStation { event_time, .. } => *event_time,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::IncidentReported { .. } => "incident_reported",
            Self::ApparatusArrivalAtIncident { .. } => "apparatus_arrival_at_incident",
            Self::IncidentResolution { .. } => "incident_resolution",
            Self::ApparatusReturnToStation { .. } => "apparatus_return_to_station",
        }
    }
}
