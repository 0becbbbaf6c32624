//! Observer interface for a presentation layer
//!
//! The simulation calls these methods synchronously, in the order the state
//! changes happen inside a step. Observers only get shared references, so they
//! cannot alter the simulation.

use crate::device::DeviceId;
use crate::job::{Job, JobId, SourceId};
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listener for station state changes. Every method defaults to doing nothing.
pub trait SimulationObserver {
    /// The earliest pending arrival of `source` changed (`None`: no more arrivals).
    fn next_arrival_changed(&mut self, _source: SourceId, _next: Option<&Job>) {}

    fn job_created(&mut self, _time: SimTime, _job: &Job) {}

    fn job_buffered(&mut self, _time: SimTime, _job: &Job) {}

    fn job_unbuffered(&mut self, _time: SimTime, _job: &Job) {}

    /// `job` was pushed out of a full buffer and is now rejected.
    fn job_evicted(&mut self, _time: SimTime, _job: &Job) {}

    fn job_assigned(&mut self, _time: SimTime, _job: &Job, _device: DeviceId, _finish: SimTime) {}

    fn job_completed(&mut self, _time: SimTime, _job: &Job, _device: DeviceId) {}

    /// Running tallies after a completion or a rejection.
    fn tallies_changed(&mut self, _completed: u64, _rejected: u64) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

impl<O: SimulationObserver + ?Sized> SimulationObserver for Box<O> {
    fn next_arrival_changed(&mut self, source: SourceId, next: Option<&Job>) {
        (**self).next_arrival_changed(source, next)
    }

    fn job_created(&mut self, time: SimTime, job: &Job) {
        (**self).job_created(time, job)
    }

    fn job_buffered(&mut self, time: SimTime, job: &Job) {
        (**self).job_buffered(time, job)
    }

    fn job_unbuffered(&mut self, time: SimTime, job: &Job) {
        (**self).job_unbuffered(time, job)
    }

    fn job_evicted(&mut self, time: SimTime, job: &Job) {
        (**self).job_evicted(time, job)
    }

    fn job_assigned(&mut self, time: SimTime, job: &Job, device: DeviceId, finish: SimTime) {
        (**self).job_assigned(time, job, device, finish)
    }

    fn job_completed(&mut self, time: SimTime, job: &Job, device: DeviceId) {
        (**self).job_completed(time, job, device)
    }

    fn tallies_changed(&mut self, completed: u64, rejected: u64) {
        (**self).tallies_changed(completed, rejected)
    }
}

/// One observer notification, as recorded by [`TraceRecorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceEvent {
    NextArrival {
        source: SourceId,
        job: Option<JobId>,
        at: Option<SimTime>,
    },
    Created {
        time: SimTime,
        job: JobId,
    },
    Buffered {
        time: SimTime,
        job: JobId,
    },
    Unbuffered {
        time: SimTime,
        job: JobId,
    },
    Evicted {
        time: SimTime,
        job: JobId,
    },
    Assigned {
        time: SimTime,
        job: JobId,
        device: DeviceId,
        finish: SimTime,
    },
    Completed {
        time: SimTime,
        job: JobId,
        device: DeviceId,
    },
    Tallies {
        completed: u64,
        rejected: u64,
    },
}

impl TraceEvent {
    /// Event-table label, `None` for notifications that are not table rows.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            TraceEvent::Created { .. } => Some("CREATED"),
            TraceEvent::Buffered { .. } => Some("PUT IN BUFFER"),
            TraceEvent::Unbuffered { .. } => Some("OUT OF BUFFER"),
            TraceEvent::Evicted { .. } => Some("REJECTED"),
            TraceEvent::Assigned { .. } => Some("PUT IN DEVICE"),
            TraceEvent::Completed { .. } => Some("OUT OF DEVICE"),
            TraceEvent::NextArrival { .. } | TraceEvent::Tallies { .. } => None,
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label().unwrap_or_default();
        match self {
            TraceEvent::Created { time, job }
            | TraceEvent::Buffered { time, job }
            | TraceEvent::Unbuffered { time, job }
            | TraceEvent::Evicted { time, job } => write!(f, "{time:>10}  {job:<10}  {label}"),
            TraceEvent::Assigned {
                time,
                job,
                device,
                finish,
            } => write!(f, "{time:>10}  {job:<10}  {label} #{device} until {finish}"),
            TraceEvent::Completed { time, job, device } => {
                write!(f, "{time:>10}  {job:<10}  {label} #{device}")
            }
            TraceEvent::NextArrival { source, job, at } => match (job, at) {
                (Some(job), Some(at)) => write!(f, "source {source}: next {job} at {at}"),
                _ => write!(f, "source {source}: no further arrivals"),
            },
            TraceEvent::Tallies {
                completed,
                rejected,
            } => write!(f, "completed {completed}, rejected {rejected}"),
        }
    }
}

/// Observer that keeps every notification, in order.
#[derive(Debug, Default, Clone)]
pub struct TraceRecorder {
    events: Vec<TraceEvent>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    /// Only the event-table rows (no next-arrival or tally updates).
    pub fn table_rows(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(|event| event.label().is_some())
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SimulationObserver for TraceRecorder {
    fn next_arrival_changed(&mut self, source: SourceId, next: Option<&Job>) {
        self.events.push(TraceEvent::NextArrival {
            source,
            job: next.map(Job::id),
            at: next.map(Job::created_at),
        });
    }

    fn job_created(&mut self, time: SimTime, job: &Job) {
        self.events.push(TraceEvent::Created { time, job: job.id() });
    }

    fn job_buffered(&mut self, time: SimTime, job: &Job) {
        self.events.push(TraceEvent::Buffered { time, job: job.id() });
    }

    fn job_unbuffered(&mut self, time: SimTime, job: &Job) {
        self.events.push(TraceEvent::Unbuffered { time, job: job.id() });
    }

    fn job_evicted(&mut self, time: SimTime, job: &Job) {
        self.events.push(TraceEvent::Evicted { time, job: job.id() });
    }

    fn job_assigned(&mut self, time: SimTime, job: &Job, device: DeviceId, finish: SimTime) {
        self.events.push(TraceEvent::Assigned {
            time,
            job: job.id(),
            device,
            finish,
        });
    }

    fn job_completed(&mut self, time: SimTime, job: &Job, device: DeviceId) {
        self.events.push(TraceEvent::Completed {
            time,
            job: job.id(),
            device,
        });
    }

    fn tallies_changed(&mut self, completed: u64, rejected: u64) {
        self.events.push(TraceEvent::Tallies {
            completed,
            rejected,
        });
    }
}
