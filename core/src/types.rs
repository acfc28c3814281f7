//! Shared primitive types used across the entire simulation.

/// Simulated time, in whole seconds since an arbitrary epoch. Never negative
/// in a live state; the environment model treats `t < 0` as a fatal invariant
/// violation.
pub type SimTime = i64;

/// Dense 0..N index into the station table. Stable for the lifetime of a run.
pub type StationIndex = u32;

/// Dense 0..N index into the incident table. Stable for the lifetime of a run.
pub type IncidentIndex = u32;

/// Dense 0..Z index into the zone/beat table.
pub type ZoneIndex = i32;

/// Identifier for a single concrete apparatus unit.
pub type ApparatusId = u32;

/// The source system's id for an incident (may be sparse, unlike `IncidentIndex`).
pub type IncidentId = u32;

/// The source system's id for a station (may be sparse, unlike `StationIndex`).
pub type StationId = u32;

/// A stable, caller-supplied identifier for a simulation run. Used only for
/// log lines and run summaries — never for persistence, since the core does
/// not persist simulation state between runs.
pub type RunId = String;
