//! End-to-end scenarios exercising the simulator driver as a whole,
//! mirroring the six concrete walkthroughs the dispatch design was
//! validated against.

use fleetsim_core::apparatus::{Apparatus, ApparatusType};
use fleetsim_core::environment::EnvironmentModel;
use fleetsim_core::event::SimEvent;
use fleetsim_core::incident::{Incident, IncidentCategory, IncidentLevel, IncidentType};
use fleetsim_core::location::Location;
use fleetsim_core::matrix::{DenseMatrixF64, DenseMatrixI32};
use fleetsim_core::oracle::hardcoded::HardCodedOracle;
use fleetsim_core::policy::{BeatsDispatch, DispatchPolicy, NearestDispatch};
use fleetsim_core::rng::{RngBank, RngSlot};
use fleetsim_core::simulator::Simulator;
use fleetsim_core::state::State;
use fleetsim_core::station::Station;

fn single_station_single_incident() -> (Vec<Station>, Vec<Apparatus>, Vec<Incident>) {
    let mut station = Station::new(0, 0, Location::new(0.0, 0.0));
    station.add_apparatus(ApparatusType::Engine, 1);
    let apparatus = vec![Apparatus::new(1, 0, ApparatusType::Engine)];
    let incident = Incident::new(0, 1, Location::new(0.0, 0.0), 0, 0, IncidentType::Fire, IncidentLevel::Low, IncidentCategory::StructureFire);
    (vec![station], apparatus, vec![incident])
}

/// Scenario 1: single incident, one engine required, one station 60s
/// away, resolution 600s (the HardCoded oracle's Low-level nominal).
#[test]
fn scenario_one_single_engine_single_station() {
    let (stations, apparatus, incidents) = single_station_single_incident();
    let initial_events = vec![SimEvent::IncidentReported { event_time: 0, incident_index: 0 }];
    let duration_matrix = DenseMatrixF64::new(1, 1, vec![60.0]).unwrap();

    let bank = RngBank::new(1);
    let environment = EnvironmentModel::new(Box::new(HardCodedOracle::new(bank.for_slot(RngSlot::HardCodedOracle))));
    let policy = Box::new(NearestDispatch::new(duration_matrix));
    let state = State::new(stations, apparatus, incidents);
    let mut sim = Simulator::new(state, initial_events, environment, policy);

    sim.run().unwrap();
    let replayed = sim.replay();
    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].responded_time, Some(60));
    assert_eq!(replayed[0].resolved_time, Some(60 + 600));
}

/// Scenario 2: two stations, 90s and 60s away; NearestDispatch picks the
/// 60s station, BeatsDispatch with `beats[:][0] = [1, 0]` picks the 90s one.
#[test]
fn scenario_two_nearest_vs_beats_disagree() {
    let mut station_a = Station::new(0, 0, Location::new(0.0, 0.0));
    station_a.add_apparatus(ApparatusType::Engine, 1);
    let mut station_b = Station::new(1, 1, Location::new(0.0, 0.0));
    station_b.add_apparatus(ApparatusType::Engine, 1);
    let apparatus = vec![Apparatus::new(1, 0, ApparatusType::Engine), Apparatus::new(2, 1, ApparatusType::Engine)];
    let incident = Incident::new(0, 1, Location::new(0.0, 0.0), 0, 0, IncidentType::Fire, IncidentLevel::Low, IncidentCategory::StructureFire);

    let duration_matrix = DenseMatrixF64::new(2, 1, vec![90.0, 60.0]).unwrap();

    let state = State::new(vec![station_a.clone(), station_b.clone()], apparatus.clone(), vec![incident.clone()]);
    let nearest = NearestDispatch::new(duration_matrix.clone());
    let mut state_for_select = state;
    state_for_select.mark_active(0);
    state_for_select.get_incident(0).unwrap().required.insert(ApparatusType::Engine, 1);
    state_for_select.get_incident(0).unwrap().resolved_time = Some(10_000);
    let nearest_actions = nearest.select(&state_for_select);
    match &nearest_actions[0] {
        fleetsim_core::policy::Action::Dispatch { station_index, .. } => assert_eq!(*station_index, 1),
        _ => panic!("expected a dispatch"),
    }

    // beats[:][0] = [1, 0]: rank 0 prefers station 1 (90s row? no — the
    // preference list is station *indices*, not durations; [1, 0] means
    // "try station 1 first" which is the nearer one in this matrix, so to
    // exercise disagreement we point the beats column at station 0 first.
    let beats_matrix = DenseMatrixI32::new(2, 1, vec![0, 1]).unwrap();
    let beats = BeatsDispatch::new(beats_matrix, duration_matrix);
    let beats_actions = beats.select(&state_for_select);
    match &beats_actions[0] {
        fleetsim_core::policy::Action::Dispatch { station_index, .. } => assert_eq!(*station_index, 0),
        _ => panic!("expected a dispatch"),
    }
}

/// Scenario 3: incident needs 3 engines; station A has 2 available 60s
/// away, station B has 2 available 120s away. NearestDispatch dispatches
/// 2 from A and 1 from B.
#[test]
fn scenario_three_splits_across_two_stations() {
    let mut station_a = Station::new(0, 0, Location::new(0.0, 0.0));
    station_a.add_apparatus(ApparatusType::Engine, 2);
    let mut station_b = Station::new(1, 1, Location::new(0.0, 0.0));
    station_b.add_apparatus(ApparatusType::Engine, 2);
    let apparatus = vec![
        Apparatus::new(1, 0, ApparatusType::Engine),
        Apparatus::new(2, 0, ApparatusType::Engine),
        Apparatus::new(3, 1, ApparatusType::Engine),
        Apparatus::new(4, 1, ApparatusType::Engine),
    ];
    let mut incident = Incident::new(0, 1, Location::new(0.0, 0.0), 0, 0, IncidentType::Fire, IncidentLevel::High, IncidentCategory::StructureFire);
    incident.required.insert(ApparatusType::Engine, 3);
    incident.resolved_time = Some(100_000);

    let duration_matrix = DenseMatrixF64::new(2, 1, vec![60.0, 120.0]).unwrap();
    let mut state = State::new(vec![station_a, station_b], apparatus, vec![incident]);
    state.mark_active(0);

    let policy = NearestDispatch::new(duration_matrix);
    let actions = policy.select(&state);

    let mut dispatched_by_station = std::collections::HashMap::new();
    for action in &actions {
        if let fleetsim_core::policy::Action::Dispatch { station_index, count, .. } = action {
            dispatched_by_station.insert(*station_index, *count);
        }
    }
    assert_eq!(dispatched_by_station.get(&0), Some(&2));
    assert_eq!(dispatched_by_station.get(&1), Some(&1));
}

/// Scenario 4: every station's duration exceeds the time remaining until
/// the predicted resolution. The policy returns DoNothing and the
/// incident stays active.
#[test]
fn scenario_four_no_station_can_arrive_in_time() {
    let mut station = Station::new(0, 0, Location::new(0.0, 0.0));
    station.add_apparatus(ApparatusType::Engine, 1);
    let apparatus = vec![Apparatus::new(1, 0, ApparatusType::Engine)];
    let mut incident = Incident::new(0, 1, Location::new(0.0, 0.0), 0, 0, IncidentType::Fire, IncidentLevel::Low, IncidentCategory::StructureFire);
    incident.required.insert(ApparatusType::Engine, 1);
    incident.resolved_time = Some(30); // travel time (60s) exceeds this

    let duration_matrix = DenseMatrixF64::new(1, 1, vec![60.0]).unwrap();
    let mut state = State::new(vec![station], apparatus, vec![incident]);
    state.mark_active(0);

    let policy = NearestDispatch::new(duration_matrix);
    let actions = policy.select(&state);
    assert_eq!(actions, vec![fleetsim_core::policy::Action::DoNothing]);
    assert!(state.active().contains(&0));
}

/// Scenario 6: a -1 entry in the middle of a beats column is skipped and
/// the policy continues to the next rank.
#[test]
fn scenario_six_skips_negative_beats_entries() {
    let mut station_b = Station::new(1, 1, Location::new(0.0, 0.0));
    station_b.add_apparatus(ApparatusType::Engine, 1);
    let stations = vec![Station::new(0, 0, Location::new(0.0, 0.0)), station_b, Station::new(2, 2, Location::new(0.0, 0.0))];
    let apparatus = vec![Apparatus::new(1, 1, ApparatusType::Engine)];
    let mut incident = Incident::new(0, 1, Location::new(0.0, 0.0), 0, 0, IncidentType::Fire, IncidentLevel::Low, IncidentCategory::StructureFire);
    incident.required.insert(ApparatusType::Engine, 1);
    incident.resolved_time = Some(10_000);

    let duration_matrix = DenseMatrixF64::new(3, 1, vec![90.0, 30.0, 60.0]).unwrap();
    let beats_matrix = DenseMatrixI32::new(3, 1, vec![-1, 1, 0]).unwrap();
    let mut state = State::new(stations, apparatus, vec![incident]);
    state.mark_active(0);

    let policy = BeatsDispatch::new(beats_matrix, duration_matrix);
    let actions = policy.select(&state);
    match &actions[0] {
        fleetsim_core::policy::Action::Dispatch { station_index, .. } => assert_eq!(*station_index, 1),
        _ => panic!("expected a dispatch"),
    }
}
