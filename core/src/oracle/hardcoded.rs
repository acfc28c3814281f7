//! Fixed nominal-duration-by-level oracle with a stochastic acceptance
//! gate, mirroring the reference implementation's "don't even try before
//! half the nominal time has elapsed" rule.

use std::collections::HashMap;

use crate::apparatus::ApparatusType;
use crate::incident::{Incident, IncidentLevel};
use crate::rng::SimRng;
use crate::state::State;

use super::ResolutionOracle;

const SECONDS_IN_MINUTE: f64 = 60.0;

/// Fraction of the nominal duration added as a retry window when the
/// stochastic acceptance check fails at the 50% mark.
const RETRY_WINDOW_FRACTION: f64 = 0.25;

fn nominal_duration_seconds(level: IncidentLevel) -> f64 {
    match level {
        IncidentLevel::Low => 10.0 * SECONDS_IN_MINUTE,
        IncidentLevel::Moderate => 30.0 * SECONDS_IN_MINUTE,
        IncidentLevel::High => 60.0 * SECONDS_IN_MINUTE,
        IncidentLevel::Critical => 90.0 * SECONDS_IN_MINUTE,
    }
}

/// Fixed required-apparatus table by level. Every level needs at least one
/// engine; higher levels add trucks and a chief.
fn required_for_level(level: IncidentLevel) -> HashMap<ApparatusType, u32> {
    let mut required = HashMap::new();
    match level {
        IncidentLevel::Low => {
            required.insert(ApparatusType::Engine, 1);
        }
        IncidentLevel::Moderate => {
            required.insert(ApparatusType::Engine, 2);
            required.insert(ApparatusType::Truck, 1);
        }
        IncidentLevel::High => {
            required.insert(ApparatusType::Engine, 3);
            required.insert(ApparatusType::Truck, 1);
            required.insert(ApparatusType::Chief, 1);
        }
        IncidentLevel::Critical => {
            required.insert(ApparatusType::Engine, 4);
            required.insert(ApparatusType::Truck, 2);
            required.insert(ApparatusType::Chief, 1);
            required.insert(ApparatusType::Hazard, 1);
        }
    }
    required
}

pub struct HardCodedOracle {
    rng: SimRng,
}

impl HardCodedOracle {
    pub fn new(rng: SimRng) -> Self {
        Self { rng }
    }
}

impl ResolutionOracle for HardCodedOracle {
    fn required_apparatus(&self, incident: &Incident) -> HashMap<ApparatusType, u32> {
        required_for_level(incident.level)
    }

    fn resolution_time(&mut self, state: &State, incident: &Incident) -> f64 {
        let nominal = nominal_duration_seconds(incident.level);
        let elapsed = (state.system_time - incident.report_time).max(0) as f64;

        // Never resolve before half the nominal time has elapsed; the
        // prediction stays the unmodified nominal duration until then.
        if elapsed < 0.5 * nominal {
            return nominal;
        }

        let time_factor = (elapsed / nominal).min(1.0);
        let apparatus_factor = if incident.required_total() == 0 {
            1.0
        } else {
            (incident.current_total() as f64 / incident.required_total() as f64).clamp(0.0, 1.0)
        };
        let probability = 0.9 * time_factor + 0.1 * apparatus_factor;

        let sample = self.rng.next_f64().clamp(0.1, 1.0);
        if sample < probability {
            elapsed
        } else {
            elapsed + nominal * RETRY_WINDOW_FRACTION
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::IncidentCategory;
    use crate::incident::IncidentType;
    use crate::location::Location;
    use crate::rng::RngBank;
    use crate::rng::RngSlot;
    use crate::station::Station;

    fn fresh_incident(report_time: i64) -> Incident {
        Incident::new(
            0,
            1,
            Location::new(0.0, 0.0),
            report_time,
            0,
            IncidentType::Fire,
            IncidentLevel::Low,
            IncidentCategory::StructureFire,
        )
    }

    #[test]
    fn never_resolves_before_half_nominal_elapsed() {
        let bank = RngBank::new(1);
        let mut oracle = HardCodedOracle::new(bank.for_slot(RngSlot::HardCodedOracle));
        let incident = fresh_incident(0);
        let state = State::new(vec![Station::new(0, 0, Location::new(0.0, 0.0))], vec![], vec![]);
        let predicted = oracle.resolution_time(&state, &incident);
        assert_eq!(predicted, nominal_duration_seconds(IncidentLevel::Low));
    }

    #[test]
    fn same_seed_gives_same_prediction_after_the_gate() {
        let bank_a = RngBank::new(99);
        let bank_b = RngBank::new(99);
        let mut oracle_a = HardCodedOracle::new(bank_a.for_slot(RngSlot::HardCodedOracle));
        let mut oracle_b = HardCodedOracle::new(bank_b.for_slot(RngSlot::HardCodedOracle));
        let incident = fresh_incident(0);
        let mut state = State::new(vec![Station::new(0, 0, Location::new(0.0, 0.0))], vec![], vec![]);
        state.advance_time(10 * 60).unwrap(); // past the 50% gate for Low
        let a = oracle_a.resolution_time(&state, &incident);
        let b = oracle_b.resolution_time(&state, &incident);
        assert_eq!(a, b);
    }

    #[test]
    fn required_apparatus_scales_with_level() {
        let mut incident = fresh_incident(0);
        incident.level = IncidentLevel::Critical;
        let required = required_for_level(incident.level);
        assert!(required.values().sum::<u32>() > required_for_level(IncidentLevel::Low).values().sum());
    }
}
