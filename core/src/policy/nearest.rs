//! Dispatch ordered by raw travel duration, nearest station first.

use crate::matrix::DenseMatrixF64;
use crate::state::State;
use crate::types::StationIndex;

use super::{next_incident_needing_dispatch, Action, DispatchPolicy};

pub struct NearestDispatch {
    duration_matrix: DenseMatrixF64,
}

impl NearestDispatch {
    pub fn new(duration_matrix: DenseMatrixF64) -> Self {
        Self { duration_matrix }
    }

    fn stations_by_duration(&self, incident_col: usize) -> Vec<StationIndex> {
        let mut ordered: Vec<(StationIndex, f64)> = (0..self.duration_matrix.rows())
            .filter_map(|row| {
                self.duration_matrix
                    .get(row, incident_col)
                    .map(|d| (row as StationIndex, d))
            })
            .collect();
        ordered.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap().then(a.0.cmp(&b.0)));
        ordered.into_iter().map(|(s, _)| s).collect()
    }
}

impl DispatchPolicy for NearestDispatch {
    fn select(&self, state: &State) -> Vec<Action> {
        let Some(incident_index) = next_incident_needing_dispatch(state) else {
            return vec![Action::DoNothing];
        };
        let incident = state.incident(incident_index).expect("index came from in_progress");
        let station_order = self.stations_by_duration(incident_index as usize);

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

    fn two_station_state() -> State {
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
            0,
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
    fn selects_the_nearer_station() {
        // station 0 is 90s away, station 1 is 60s away
        let matrix = DenseMatrixF64::new(2, 1, vec![90.0, 60.0]).unwrap();
        let policy = NearestDispatch::new(matrix);
        let state = two_station_state();
        let actions = policy.select(&state);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Dispatch { station_index, .. } => assert_eq!(*station_index, 1),
            _ => panic!("expected a dispatch"),
        }
    }

    #[test]
    fn returns_do_nothing_when_nothing_is_in_progress() {
        let matrix = DenseMatrixF64::new(2, 1, vec![90.0, 60.0]).unwrap();
        let policy = NearestDispatch::new(matrix);
        let state = State::new(vec![], vec![], vec![]);
        assert_eq!(policy.select(&state), vec![Action::DoNothing]);
    }
}
