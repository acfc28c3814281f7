//! The single mutable world. Owns stations, apparatus, and incidents by
//! value; every mutation that crosses an invariant boundary (apparatus
//! status vs. station counters, incident status monotonicity) goes through
//! a method here rather than through direct field access.

use std::collections::HashSet;

use log::warn;

use crate::apparatus::{Apparatus, ApparatusStatus, ApparatusType};
use crate::error::{SimError, SimResult};
use crate::incident::Incident;
use crate::station::Station;
use crate::types::{ApparatusId, IncidentIndex, SimTime, StationIndex};

pub struct State {
    pub system_time: SimTime,
    stations: Vec<Station>,
    apparatus: Vec<Apparatus>,
    all_incidents: Vec<Incident>,
    active: HashSet<IncidentIndex>,
    done: HashSet<IncidentIndex>,
    in_progress: Vec<IncidentIndex>,
}

impl State {
    pub fn new(stations: Vec<Station>, apparatus: Vec<Apparatus>, all_incidents: Vec<Incident>) -> Self {
        Self {
            system_time: 0,
            stations,
            apparatus,
            all_incidents,
            active: HashSet::new(),
            done: HashSet::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn advance_time(&mut self, t: SimTime) -> SimResult<()> {
        if t < self.system_time {
            return Err(SimError::TimeWentBackwards {
                current: self.system_time,
                requested: t,
            });
        }
        self.system_time = t;
        Ok(())
    }

    pub fn get_station(&mut self, i: StationIndex) -> Option<&mut Station> {
        self.stations.get_mut(i as usize)
    }

    pub fn station(&self, i: StationIndex) -> Option<&Station> {
        self.stations.get(i as usize)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn get_incident(&mut self, i: IncidentIndex) -> Option<&mut Incident> {
        self.all_incidents.get_mut(i as usize)
    }

    pub fn incident(&self, i: IncidentIndex) -> Option<&Incident> {
        self.all_incidents.get(i as usize)
    }

    pub fn incident_count(&self) -> usize {
        self.all_incidents.len()
    }

    pub fn active(&self) -> &HashSet<IncidentIndex> {
        &self.active
    }

    pub fn done(&self) -> &HashSet<IncidentIndex> {
        &self.done
    }

    pub fn in_progress_indices(&self) -> &[IncidentIndex] {
        &self.in_progress
    }

    /// Moves an incident into `active` and appends it to the in-progress
    /// queue. Called exactly once per incident, from `IncidentReported`.
    pub fn mark_active(&mut self, i: IncidentIndex) {
        self.active.insert(i);
        self.in_progress.push(i);
    }

    /// Moves an incident from `active` to `done`, removing it from the
    /// in-progress queue. `active` and `done` remain disjoint by
    /// construction — an index is inserted into `done` only here, and only
    /// after being removed from `active`.
    pub fn mark_done(&mut self, i: IncidentIndex) {
        self.active.remove(&i);
        self.in_progress.retain(|idx| *idx != i);
        self.done.insert(i);
    }

    /// Picks up to `count` `Available` apparatus of `apparatus_type` at
    /// `station_index`, marks them `Dispatched`, and returns their ids. If
    /// fewer than `count` are available, dispatches what is available.
    pub fn dispatch_apparatus(
        &mut self,
        apparatus_type: ApparatusType,
        count: u32,
        station_index: StationIndex,
    ) -> Vec<ApparatusId> {
        let mut picked = Vec::new();
        if count == 0 {
            return picked;
        }
        let actually_available = self
            .stations
            .get(station_index as usize)
            .map(|s| s.available(apparatus_type))
            .unwrap_or(0);
        let to_take = count.min(actually_available);
        if to_take == 0 {
            return picked;
        }
        for unit in self.apparatus.iter_mut() {
            if picked.len() as u32 >= to_take {
                break;
            }
            if unit.station_index == station_index
                && unit.apparatus_type == apparatus_type
                && unit.status == ApparatusStatus::Available
            {
                unit.status = ApparatusStatus::Dispatched;
                picked.push(unit.id);
            }
        }
        if let Some(station) = self.stations.get_mut(station_index as usize) {
            station.take_available(apparatus_type, picked.len() as u32);
        }
        picked
    }

    /// Marks each apparatus in `ids` back to `Available` and returns it to
    /// its station's pool. Type mismatches or unknown ids are warned about,
    /// not fatal — the run continues.
    pub fn return_apparatus(&mut self, apparatus_type: ApparatusType, ids: &[ApparatusId]) {
        for &id in ids {
            let Some(unit) = self.apparatus.iter_mut().find(|a| a.id == id) else {
                warn!("return_apparatus: unknown apparatus id {id}");
                continue;
            };
            if unit.apparatus_type != apparatus_type {
                warn!(
                    "return_apparatus: apparatus {id} is type {:?}, expected {:?}",
                    unit.apparatus_type, apparatus_type
                );
                continue;
            }
            unit.status = ApparatusStatus::Available;
            let station_index = unit.station_index;
            if let Some(station) = self.stations.get_mut(station_index as usize) {
                station.give_back(apparatus_type, 1);
            }
        }
    }

    pub fn set_apparatus_status(&mut self, id: ApparatusId, status: ApparatusStatus) {
        if let Some(unit) = self.apparatus.iter_mut().find(|a| a.id == id) {
            unit.status = status;
        }
    }
}
