//! Dispatch policies: pick which stations send which apparatus to which
//! incident on each simulator step.

pub mod beats;
pub mod nearest;

use crate::apparatus::ApparatusType;
use crate::state::State;
use crate::types::{IncidentIndex, StationIndex};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Dispatch {
        station_index: StationIndex,
        incident_index: IncidentIndex,
        apparatus_type: ApparatusType,
        count: u32,
        travel_time_sec: f64,
    },
    DoNothing,
}

pub trait DispatchPolicy {
    fn select(&self, state: &State) -> Vec<Action>;
}

/// Finds the first in-progress incident that still needs apparatus and
/// hasn't already timed past its predicted resolution. Shared by every
/// policy variant — only the station ordering differs between them.
pub(crate) fn next_incident_needing_dispatch(state: &State) -> Option<IncidentIndex> {
    state
        .in_progress_indices()
        .iter()
        .copied()
        .find(|&i| {
            let Some(incident) = state.incident(i) else {
                return false;
            };
            let still_time_left = incident
                .resolved_time
                .map(|t| t > state.system_time)
                .unwrap_or(true);
            still_time_left && incident.current_total() < incident.required_total()
        })
}

pub use beats::BeatsDispatch;
pub use nearest::NearestDispatch;
