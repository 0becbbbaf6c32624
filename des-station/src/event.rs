//! Event model: what happens to which job, and when

use crate::job::Job;
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, monotonically increasing identifier assigned when an event is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A source produced a job.
    ArrivalCreated,
    /// A device finished serving a job.
    ServiceCompleted,
}

impl EventKind {
    /// Rank among events sharing a timestamp; lower runs first.
    ///
    /// Completions go before arrivals so that a device whose service ends at `t`
    /// is already released when an arrival at `t` looks for a free device.
    pub(crate) fn tie_rank(self) -> u8 {
        match self {
            EventKind::ServiceCompleted => 0,
            EventKind::ArrivalCreated => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ArrivalCreated => "ArrivalCreated",
            EventKind::ServiceCompleted => "ServiceCompleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending state change. The event owns its job until it is processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub time: SimTime,
    pub job: Job,
}

impl Event {
    pub fn arrival(time: SimTime, job: Job) -> Self {
        Self {
            kind: EventKind::ArrivalCreated,
            time,
            job,
        }
    }

    pub fn service_completed(time: SimTime, job: Job) -> Self {
        Self {
            kind: EventKind::ServiceCompleted,
            time,
            job,
        }
    }
}
