//! The environment model: the only code that turns events into state
//! mutations, and dispatch actions into new events. Everything here is
//! deliberately free of policy logic — it just executes what the policy
//! decided.

use log::warn;

use crate::apparatus::ApparatusStatus;
use crate::error::{SimError, SimResult};
use crate::event::SimEvent;
use crate::incident::{Dispatch, IncidentStatus};
use crate::oracle::ResolutionOracle;
use crate::policy::Action;
use crate::state::State;
use crate::types::SimTime;

/// Fixed delay between dispatch and an apparatus beginning to respond,
/// per the incident's `responded_time`. Distinct from travel time, which
/// varies by station/incident pair via the duration matrix.
pub const RESPOND_DELAY: SimTime = 60;

pub struct EnvironmentModel {
    oracle: Box<dyn ResolutionOracle>,
}

impl EnvironmentModel {
    pub fn new(oracle: Box<dyn ResolutionOracle>) -> Self {
        Self { oracle }
    }

    pub fn apply_event(&mut self, state: &mut State, event: &SimEvent) -> SimResult<()> {
        match event {
            SimEvent::IncidentReported { incident_index, .. } => {
                let required = {
                    let incident = state
                        .incident(*incident_index)
                        .ok_or_else(|| SimError::IncidentIndexMismatch { action: *incident_index, target: *incident_index })?;
                    self.oracle.required_apparatus(incident)
                };

                {
                    let incident = state
                        .get_incident(*incident_index)
                        .ok_or_else(|| SimError::IncidentIndexMismatch { action: *incident_index, target: *incident_index })?;
                    incident.required = required;
                }

                // Seed a predicted resolved_time with zero resourcing so
                // the dispatch policy has a feasibility bound to check
                // against even before anything has been dispatched.
                let predicted_duration = {
                    let incident = state.incident(*incident_index).expect("just populated");
                    self.oracle.resolution_time(state, incident)
                };
                let report_time = state.incident(*incident_index).expect("just populated").report_time;

                let incident = state.get_incident(*incident_index).expect("just populated");
                incident.resolved_time = Some(report_time + predicted_duration.round() as SimTime);

                state.mark_active(*incident_index);
            }

            SimEvent::ApparatusArrivalAtIncident { incident_index, .. } => {
                if let Some(incident) = state.get_incident(*incident_index) {
                    incident.advance_status(IncidentStatus::BeingResolved);
                }
            }

            SimEvent::IncidentResolution { incident_index, event_time } => {
                if let Some(incident) = state.get_incident(*incident_index) {
                    incident.resolved_time = Some(*event_time);
                    incident.advance_status(IncidentStatus::Resolved);
                }
                state.mark_done(*incident_index);
            }

            SimEvent::ApparatusReturnToStation {
                apparatus_type,
                apparatus_ids,
                ..
            } => {
                state.return_apparatus(*apparatus_type, apparatus_ids);
            }
        }

        state.advance_time(event.event_time())
    }

    pub fn apply_actions(&mut self, state: &mut State, actions: &[Action]) -> SimResult<Vec<SimEvent>> {
        let first = match actions.first() {
            None => return Ok(Vec::new()),
            Some(Action::DoNothing) => return Ok(Vec::new()),
            Some(a) => a,
        };

        let Action::Dispatch { incident_index, .. } = first else {
            unreachable!("DoNothing handled above");
        };
        let incident_index = *incident_index;

        if state.incident(incident_index).is_none() || !state.active().contains(&incident_index) {
            warn!("apply_actions: incident {incident_index} is not active, ignoring dispatch batch");
            return Ok(Vec::new());
        }

        let system_time = state.system_time;
        {
            let incident = state.get_incident(incident_index).unwrap();
            incident.responded_time = Some(system_time + RESPOND_DELAY);
            incident.advance_status(IncidentStatus::Responded);
        }

        let mut emitted = Vec::new();
        let mut resolution_time_for_batch: Option<SimTime> = None;

        for action in actions {
            let Action::Dispatch {
                station_index,
                incident_index: action_incident_index,
                apparatus_type,
                count,
                travel_time_sec,
            } = action
            else {
                continue;
            };

            if *action_incident_index != incident_index {
                return Err(SimError::IncidentIndexMismatch {
                    action: *action_incident_index,
                    target: incident_index,
                });
            }

            let apparatus_ids = state.dispatch_apparatus(*apparatus_type, *count, *station_index);
            for &id in &apparatus_ids {
                state.set_apparatus_status(id, ApparatusStatus::EnRouteToIncident);
            }

            let resolution_duration = {
                let incident = state.incident(incident_index).unwrap();
                self.oracle.resolution_time(state, incident)
            };
            let t_resolve = system_time + RESPOND_DELAY + resolution_duration.round() as SimTime;

            let incident = state.get_incident(incident_index).unwrap();
            incident.resolved_time = Some(t_resolve);
            incident.dispatches.push(Dispatch {
                station_index: *station_index,
                count: *count,
                travel_time_sec: *travel_time_sec,
                apparatus_ids: apparatus_ids.clone(),
            });
            *incident.current.entry(*apparatus_type).or_insert(0) += count;

            if !incident.resolution_event_emitted {
                incident.resolution_event_emitted = true;
                resolution_time_for_batch = Some(t_resolve);
            }

            emitted.push(SimEvent::ApparatusArrivalAtIncident {
                event_time: system_time + RESPOND_DELAY + *travel_time_sec as SimTime,
                incident_index,
                station_index: *station_index,
            });
            emitted.push(SimEvent::ApparatusReturnToStation {
                event_time: t_resolve + *travel_time_sec as SimTime,
                incident_index,
                station_index: *station_index,
                apparatus_type: *apparatus_type,
                engines_count: *count,
                apparatus_ids,
            });
        }

        if let Some(t_resolve) = resolution_time_for_batch {
            emitted.push(SimEvent::IncidentResolution {
                event_time: t_resolve,
                incident_index,
            });
        }

        Ok(emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apparatus::{Apparatus, ApparatusType};
    use crate::incident::{Incident, IncidentCategory, IncidentLevel, IncidentType};
    use crate::location::Location;
    use crate::oracle::HardCodedOracle;
    use crate::rng::{RngBank, RngSlot};
    use crate::station::Station;

    fn single_station_state() -> State {
        let mut station = Station::new(0, 0, Location::new(0.0, 0.0));
        station.add_apparatus(ApparatusType::Engine, 1);
        let apparatus = vec![Apparatus::new(1, 0, ApparatusType::Engine)];
        let incident = Incident::new(
            0,
            1,
            Location::new(0.0, 0.0),
            0,
            0,
            IncidentType::Fire,
            IncidentLevel::Low,
            IncidentCategory::StructureFire,
        );
        State::new(vec![station], apparatus, vec![incident])
    }

    fn env() -> EnvironmentModel {
        let bank = RngBank::new(1);
        EnvironmentModel::new(Box::new(HardCodedOracle::new(bank.for_slot(RngSlot::HardCodedOracle))))
    }

    #[test]
    fn incident_reported_populates_required_and_marks_active() {
        let mut state = single_station_state();
        let mut environment = env();
        environment
            .apply_event(&mut state, &SimEvent::IncidentReported { event_time: 0, incident_index: 0 })
            .unwrap();
        assert!(state.active().contains(&0));
        assert!(state.incident(0).unwrap().required_total() > 0);
    }

    #[test]
    fn do_nothing_leaves_state_untouched() {
        let mut state = single_station_state();
        let mut environment = env();
        let before = state.incident(0).unwrap().clone();
        let events = environment.apply_actions(&mut state, &[Action::DoNothing]).unwrap();
        assert!(events.is_empty());
        let after = state.incident(0).unwrap().clone();
        assert_eq!(before.status, after.status);
        assert_eq!(before.current, after.current);
    }

    #[test]
    fn dispatch_to_a_resolved_incident_is_ignored_not_fatal() {
        let mut state = single_station_state();
        let mut environment = env();
        // never marked active
        let actions = vec![Action::Dispatch {
            station_index: 0,
            incident_index: 0,
            apparatus_type: ApparatusType::Engine,
            count: 1,
            travel_time_sec: 60.0,
        }];
        let events = environment.apply_actions(&mut state, &actions).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn single_dispatch_emits_arrival_resolution_and_return_events() {
        let mut state = single_station_state();
        state.mark_active(0);
        state.get_incident(0).unwrap().required.insert(ApparatusType::Engine, 1);
        let mut environment = env();
        let actions = vec![Action::Dispatch {
            station_index: 0,
            incident_index: 0,
            apparatus_type: ApparatusType::Engine,
            count: 1,
            travel_time_sec: 60.0,
        }];
        let events = environment.apply_actions(&mut state, &actions).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().any(|e| matches!(e, SimEvent::ApparatusArrivalAtIncident { .. })));
        assert!(events.iter().any(|e| matches!(e, SimEvent::IncidentResolution { .. })));
        assert!(events.iter().any(|e| matches!(e, SimEvent::ApparatusReturnToStation { .. })));
    }
}
