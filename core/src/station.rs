//! Fire/EMS stations: fixed apparatus depots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::apparatus::ApparatusType;
use crate::location::Location;
use crate::types::{StationId, StationIndex};

/// A station's apparatus counters for one type. `available` must never
/// exceed `total`; both are driven exclusively through
/// [`crate::state::State::dispatch_apparatus`] and
/// [`crate::state::State::return_apparatus`], never assigned directly from
/// outside this module's invariant-preserving methods.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TypeCounts {
    pub available: u32,
    pub total: u32,
}

/// A fixed apparatus depot. Created at init, never destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub station_index: StationIndex,
    pub station_id: StationId,
    pub location: Location,
    counts: HashMap<ApparatusType, TypeCounts>,
}

impl Station {
    pub fn new(station_index: StationIndex, station_id: StationId, location: Location) -> Self {
        Self {
            station_index,
            station_id,
            location,
            counts: HashMap::new(),
        }
    }

    /// Registers `count` apparatus of `apparatus_type` as present at this
    /// station, all initially available. Called once per type during load.
    pub fn add_apparatus(&mut self, apparatus_type: ApparatusType, count: u32) {
        let entry = self.counts.entry(apparatus_type).or_default();
        entry.total += count;
        entry.available += count;
    }

    pub fn available(&self, apparatus_type: ApparatusType) -> u32 {
        self.counts.get(&apparatus_type).map(|c| c.available).unwrap_or(0)
    }

    pub fn total(&self, apparatus_type: ApparatusType) -> u32 {
        self.counts.get(&apparatus_type).map(|c| c.total).unwrap_or(0)
    }

    /// Removes `count` available units of `apparatus_type`, clamped to what
    /// is actually available. Returns the number actually removed.
    pub(crate) fn take_available(&mut self, apparatus_type: ApparatusType, count: u32) -> u32 {
        let entry = self.counts.entry(apparatus_type).or_default();
        let taken = count.min(entry.available);
        entry.available -= taken;
        taken
    }

    /// Returns `count` units of `apparatus_type` to the available pool.
    /// `total` is never exceeded; excess returns are clamped and logged by
    /// the caller, not here.
    pub(crate) fn give_back(&mut self, apparatus_type: ApparatusType, count: u32) -> u32 {
        let entry = self.counts.entry(apparatus_type).or_default();
        let room = entry.total.saturating_sub(entry.available);
        let accepted = count.min(room);
        entry.available += accepted;
        accepted
    }

    pub fn apparatus_types(&self) -> impl Iterator<Item = &ApparatusType> {
        self.counts.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        let mut s = Station::new(0, 100, Location::new(0.0, 0.0));
        s.add_apparatus(ApparatusType::Engine, 2);
        s
    }

    #[test]
    fn available_never_exceeds_total() {
        let mut s = station();
        let taken = s.take_available(ApparatusType::Engine, 5);
        assert_eq!(taken, 2);
        assert_eq!(s.available(ApparatusType::Engine), 0);
        assert_eq!(s.total(ApparatusType::Engine), 2);
    }

    #[test]
    fn give_back_is_clamped_to_total() {
        let mut s = station();
        s.take_available(ApparatusType::Engine, 2);
        let accepted = s.give_back(ApparatusType::Engine, 10);
        assert_eq!(accepted, 2);
        assert_eq!(s.available(ApparatusType::Engine), 2);
    }

    #[test]
    fn unregistered_type_reports_zero() {
        let s = station();
        assert_eq!(s.available(ApparatusType::Truck), 0);
        assert_eq!(s.total(ApparatusType::Truck), 0);
    }
}
