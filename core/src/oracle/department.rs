//! Category-table-driven oracle. Required apparatus and resolution
//! duration are both looked up by `IncidentCategory` from tables loaded at
//! init (typically from CSV via [`crate::loaders`]).

use std::collections::HashMap;

use crate::apparatus::ApparatusType;
use crate::incident::{Incident, IncidentCategory};
use crate::rng::SimRng;
use crate::state::State;

use super::ResolutionOracle;

/// Mean and variance of the sampled resolution duration for one category,
/// in seconds. Fed to [`crate::rng::SimRng::log_normal_from_moments`] —
/// log-normal rather than Gaussian so a duration is never negative.
#[derive(Debug, Clone, Copy)]
pub struct DurationMoments {
    pub mean: f64,
    pub variance: f64,
}

pub struct DepartmentOracle {
    rng: SimRng,
    required_by_category: HashMap<IncidentCategory, HashMap<ApparatusType, u32>>,
    duration_by_category: HashMap<IncidentCategory, DurationMoments>,
    fallback_duration: DurationMoments,
}

impl DepartmentOracle {
    pub fn new(
        rng: SimRng,
        required_by_category: HashMap<IncidentCategory, HashMap<ApparatusType, u32>>,
        duration_by_category: HashMap<IncidentCategory, DurationMoments>,
    ) -> Self {
        Self {
            rng,
            required_by_category,
            duration_by_category,
            fallback_duration: DurationMoments {
                mean: 1800.0,
                variance: 360_000.0,
            },
        }
    }
}

impl ResolutionOracle for DepartmentOracle {
    fn required_apparatus(&self, incident: &Incident) -> HashMap<ApparatusType, u32> {
        self.required_by_category
            .get(&incident.category)
            .cloned()
            .unwrap_or_default()
    }

    fn resolution_time(&mut self, _state: &State, incident: &Incident) -> f64 {
        let moments = self
            .duration_by_category
            .get(&incident.category)
            .copied()
            .unwrap_or(self.fallback_duration);
        self.rng.log_normal_from_moments(moments.mean, moments.variance)
    }
}
