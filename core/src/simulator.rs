//! The simulator driver: the event loop that ties the queue, state,
//! environment model, and dispatch policy together.

use log::{info, warn};

use crate::environment::EnvironmentModel;
use crate::error::SimResult;
use crate::event::SimEvent;
use crate::event_queue::EventQueue;
use crate::incident::IncidentStatus;
use crate::policy::DispatchPolicy;
use crate::state::State;
use crate::types::{IncidentId, IncidentIndex, SimTime};

pub struct Simulator {
    pub state: State,
    pub queue: EventQueue,
    environment: EnvironmentModel,
    policy: Box<dyn DispatchPolicy>,
}

/// Per-incident timing summary, as produced by `replay()`.
#[derive(Debug, Clone)]
pub struct IncidentSummary {
    pub incident_index: IncidentIndex,
    pub incident_id: IncidentId,
    pub report_time: SimTime,
    pub responded_time: Option<SimTime>,
    pub resolved_time: Option<SimTime>,
    pub dispatch_count: usize,
}

impl Simulator {
    pub fn new(
        state: State,
        initial_events: Vec<SimEvent>,
        environment: EnvironmentModel,
        policy: Box<dyn DispatchPolicy>,
    ) -> Self {
        let mut queue = EventQueue::new();
        queue.push_all(initial_events);
        Self {
            state,
            queue,
            environment,
            policy,
        }
    }

    /// Drains the event queue to completion. Any incident still `active`
    /// when the queue empties is counted as unresolved — diagnostic only,
    /// it does not change what already happened.
    pub fn run(&mut self) -> SimResult<RunSummary> {
        let mut steps = 0u64;
        while let Some(event) = self.queue.pop_min() {
            steps += 1;
            self.environment.apply_event(&mut self.state, &event)?;
            let actions = self.policy.select(&self.state);
            let new_events = self.environment.apply_actions(&mut self.state, &actions)?;
            self.queue.push_all(new_events);
        }

        let unresolved = self.state.active().len();
        if unresolved > 0 {
            warn!("run finished with {unresolved} incident(s) still active (unresolved)");
        }
        info!("run finished after {steps} event(s), {} incident(s) resolved", self.state.done().len());

        Ok(RunSummary {
            steps_processed: steps,
            incidents_resolved: self.state.done().len(),
            incidents_unresolved: unresolved,
        })
    }

    /// Walks `done` and produces one timing summary per resolved incident,
    /// in `incident_index` order.
    pub fn replay(&self) -> Vec<IncidentSummary> {
        let mut done: Vec<IncidentIndex> = self.state.done().iter().copied().collect();
        done.sort_unstable();
        done.into_iter()
            .filter_map(|index| {
                let incident = self.state.incident(index)?;
                debug_assert!(incident.status == IncidentStatus::Resolved);
                Some(IncidentSummary {
                    incident_index: incident.incident_index,
                    incident_id: incident.incident_id,
                    report_time: incident.report_time,
                    responded_time: incident.responded_time,
                    resolved_time: incident.resolved_time,
                    dispatch_count: incident.dispatches.len(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub steps_processed: u64,
    pub incidents_resolved: usize,
    pub incidents_unresolved: usize,
}
