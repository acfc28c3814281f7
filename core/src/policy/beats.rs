//! Dispatch ordered by a precomputed per-zone preference table ("beats")
//! instead of raw travel duration. Travel-time feasibility is still
//! checked against the duration matrix.

use crate::matrix::{DenseMatrixF64, DenseMatrixI32};
use crate::state::State;
use crate::types::StationIndex;

use super::{next_incident_needing_dispatch, Action, DispatchPolicy};

pub struct BeatsDispatch {
    beats_matrix: DenseMatrixI32,
    duration_matrix: DenseMatrixF64,
}

impl BeatsDispatch {
    pub fn new(beats_matrix: DenseMatrixI32, duration_matrix: DenseMatrixF64) -> Self {
        Self {
            beats_matrix,
            duration_matrix,
        }
    }

    /// Station indices in preferred-rank order for `zone`, with negative or
    /// out-of-range entries dropped.
    fn stations_for_zone(&self, zone: i32) -> Vec<StationIndex> {
        if zone < 0 {
            return Vec::new();
        }
        let station_count = self.duration_matrix.rows() as i32;
        self.beats_matrix
            .column(zone as usize)
            .into_iter()
            .filter(|&s| s >= 0 && s < station_count)
            .map(|s| s as StationIndex)
            .collect()
    }
}

impl DispatchPolicy for BeatsDispatch {
    fn select(&self, state: &State) -> Vec<Action> {
        let Some(incident_index) = next_incident_needing_dispatch(state) else {
            return vec![Action::DoNothing];
        };
        let incident = state.incident(incident_index).expect("index came from in_progress");
        let station_order = self.stations_for_zone(incident.zone_index);

        let mut actions = Vec::new();
        for (&apparatus_type, &required) in &incident.required {
            let current = *incident.current.get(&apparatus_type).unwrap_or(&0);
            let mut deficit = required.saturating_sub(current);
            if deficit == 0 {
                continue;
            }
            for &station_index in &station_order {
                if deficit == 0 {
                    break;
                }
                let Some(duration) = self.duration_matrix.get(station_index as usize, incident_index as usize) else {
                    continue;
                };
                let arrival_time = state.system_time as f64 + duration;
                if let Some(resolved_time) = incident.resolved_time {
                    if arrival_time >= resolved_time as f64 {
                        continue;
                    }
                }
                let Some(station) = state.station(station_index) else {
                    continue;
                };
                let available = station.available(apparatus_type);
                if available == 0 {
                    continue;
                }
                let take = deficit.min(available);
                actions.push(Action::Dispatch {
                    station_index,
                    incident_index,
                    apparatus_type,
                    count: take,
                    travel_time_sec: duration,
                });
                deficit -= take;
            }
        }

        if actions.is_empty() {
            vec![Action::DoNothing]
        } else {
            actions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apparatus::{Apparatus, ApparatusType};
    use crate::incident::{Incident, IncidentCategory, IncidentLevel, IncidentType};
    use crate::location::Location;
    use crate::station::Station;

    fn two_station_state(zone: i32) -> State {
        let mut station_a = Station::new(0, 0, Location::new(0.0, 0.0));
        station_a.add_apparatus(ApparatusType::Engine, 1);
        let mut station_b = Station::new(1, 1, Location::new(0.0, 0.0));
        station_b.add_apparatus(ApparatusType::Engine, 1);
        let apparatus = vec![
            Apparatus::new(1, 0, ApparatusType::Engine),
            Apparatus::new(2, 1, ApparatusType::Engine),
        ];
        let mut incident = Incident::new(
            0,
            100,
            Location::new(0.0, 0.0),
            0,
            zone,
            IncidentType::Fire,
            IncidentLevel::Low,
            IncidentCategory::StructureFire,
        );
        incident.required.insert(ApparatusType::Engine, 1);
        incident.resolved_time = Some(10_000);
        let mut state = State::new(vec![station_a, station_b], apparatus, vec![incident]);
        state.mark_active(0);
        state
    }

    #[test]
    fn prefers_the_beats_ordering_over_raw_duration() {
        // station 1 is nearer (60s) but beats prefers station 0 first.
        let duration = DenseMatrixF64::new(2, 1, vec![90.0, 60.0]).unwrap();
        let beats = DenseMatrixI32::new(2, 1, vec![0, 1]).unwrap();
        let policy = BeatsDispatch::new(beats, duration);
        let state = two_station_state(0);
        let actions = policy.select(&state);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Dispatch { station_index, .. } => assert_eq!(*station_index, 0),
            _ => panic!("expected a dispatch"),
        }
    }

    #[test]
    fn skips_negative_entries_in_the_middle_of_a_zone_column() {
        let duration = DenseMatrixF64::new(3, 1, vec![90.0, 30.0, 60.0]).unwrap();
        let beats = DenseMatrixI32::new(3, 1, vec![-1, 1, 0]).unwrap();
        let mut station_a = Station::new(0, 0, Location::new(0.0, 0.0));
        let mut station_b = Station::new(1, 1, Location::new(0.0, 0.0));
        station_b.add_apparatus(ApparatusType::Engine, 1);
        let station_c = Station::new(2, 2, Location::new(0.0, 0.0));
        let apparatus = vec![Apparatus::new(1, 1, ApparatusType::Engine)];
        let mut incident = Incident::new(
            0,
            100,
            Location::new(0.0, 0.0),
            0,
            0,
            IncidentType::Fire,
            IncidentLevel::Low,
            IncidentCategory::StructureFire,
        );
        incident.required.insert(ApparatusType::Engine, 1);
        incident.resolved_time = Some(10_000);
        let mut state = State::new(vec![station_a, station_b, station_c], apparatus, vec![incident]);
        state.mark_active(0);

        let policy = BeatsDispatch::new(beats, duration);
        let actions = policy.select(&state);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Dispatch { station_index, .. } => assert_eq!(*station_index, 1),
            _ => panic!("expected a dispatch"),
        }
    }
}
