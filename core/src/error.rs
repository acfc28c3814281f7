//! Structured error taxonomy for the simulation core.
//!
//! Invariant violations are fatal: they indicate a programming error, not a
//! bad input, and the simulation aborts rather than trying to limp forward.
//! Data errors found while loading external inputs are recoverable — the
//! loader skips the offending row and keeps going.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    // -- Invariant violations (fatal) --------------------------------
    #[error("station index mismatch: action referenced station {action}, target is {target}")]
    StationIndexMismatch { action: u32, target: u32 },

    #[error("incident index mismatch: action referenced incident {action}, target is {target}")]
    IncidentIndexMismatch { action: u32, target: u32 },

    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("unknown action kind: {0}")]
    UnknownActionKind(String),

    #[error("time moved backwards: system time {current} was asked to advance to {requested}")]
    TimeWentBackwards { current: i64, requested: i64 },

    #[error(
        "apparatus {apparatus_id} returned with type {returned:?}, station expected {expected:?}"
    )]
    ApparatusTypeMismatch {
        apparatus_id: u32,
        expected: crate::apparatus::ApparatusType,
        returned: crate::apparatus::ApparatusType,
    },

    // -- External failures (fatal at init) ---------------------------
    #[error("required input file not found: {path}")]
    MatrixFileMissing { path: String },

    #[error("matrix shape error: {0}")]
    MatrixShape(String),

    #[error("bounds file not found: {path}")]
    BoundsFileMissing { path: String },

    #[error("required config key missing: {0}")]
    MissingConfig(String),

    #[error("invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    // -- I/O and parsing ----------------------------------------------
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
