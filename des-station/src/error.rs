//! Error types for the station simulation

use crate::job::JobId;
use crate::time::SimTime;
use thiserror::Error;

/// Errors raised by the station components and the simulation driver.
///
/// The first three variants are contract violations: the driver checks
/// `is_empty` / `has_free_device` before every mutating call, so seeing one of
/// them means the run is broken and must be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("Buffer is empty")]
    EmptyBuffer,

    #[error("No free device at {time}")]
    NoFreeDevice { time: SimTime },

    #[error("Job {job} is not bound to any device")]
    JobNotFound { job: JobId },

    #[error("Event scheduling failed: cannot schedule event in the past ({requested} < {now})")]
    ScheduleInPast { requested: SimTime, now: SimTime },

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl StationError {
    /// Whether the error signals a broken driver invariant rather than bad input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            StationError::EmptyBuffer
                | StationError::NoFreeDevice { .. }
                | StationError::JobNotFound { .. }
        )
    }
}
