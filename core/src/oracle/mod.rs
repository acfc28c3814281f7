//! Resolution oracles: pluggable models for how much apparatus an
//! incident needs and how long it takes to resolve once resourced.
//!
//! All three variants must be deterministic under a fixed seed — each
//! gets its own [`crate::rng::SimRng`] stream via [`crate::rng::RngBank`].

pub mod department;
pub mod hardcoded;
pub mod ml;

use std::collections::HashMap;

use crate::apparatus::ApparatusType;
use crate::incident::Incident;
use crate::state::State;

pub trait ResolutionOracle {
    /// Total units needed to resolve this incident, by type.
    fn required_apparatus(&self, incident: &Incident) -> HashMap<ApparatusType, u32>;

    /// Predicted resolution duration, in seconds, once resourcing is
    /// complete. Takes `&mut self` because every variant samples from its
    /// own RNG stream.
    fn resolution_time(&mut self, state: &State, incident: &Incident) -> f64;
}

pub use department::DepartmentOracle;
pub use hardcoded::HardCodedOracle;
pub use ml::MlOracle;
