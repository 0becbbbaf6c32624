//! Running statistics and the derived station metrics
//!
//! Aggregates are kept in integer nanoseconds so that the means are exact.
//! Every record is also published through the `metrics` facade; without an
//! installed recorder that is a no-op.

use crate::job::Job;
use crate::time::SimTime;
use metrics::{counter, gauge, histogram};
use std::time::Duration;

pub const METRIC_COMPLETED: &str = "station_jobs_completed_total";
pub const METRIC_REJECTED: &str = "station_jobs_rejected_total";
pub const METRIC_SOJOURN: &str = "station_sojourn_seconds";
pub const METRIC_BUSY: &str = "station_device_busy_seconds";

#[derive(Debug, Clone)]
pub struct Statistics {
    devices: usize,
    completed: u64,
    rejected: u64,
    sojourn_times: Vec<Duration>,
    sojourn_total_nanos: u128,
    busy_nanos: u128,
    last_event_time: SimTime,
}

impl Statistics {
    /// Statistics for a pool of `devices` devices.
    pub fn new(devices: usize) -> Self {
        Self {
            devices,
            completed: 0,
            rejected: 0,
            sojourn_times: Vec::new(),
            sojourn_total_nanos: 0,
            busy_nanos: 0,
            last_event_time: SimTime::zero(),
        }
    }

    /// `job` left its device at `time`.
    pub fn record_completion(&mut self, job: &Job, time: SimTime) {
        self.completed += 1;
        counter!(METRIC_COMPLETED).increment(1);
        self.record_terminal(job, time);
    }

    /// `job` was evicted from the buffer at `time`.
    pub fn record_rejection(&mut self, job: &Job, time: SimTime) {
        self.rejected += 1;
        counter!(METRIC_REJECTED).increment(1);
        self.record_terminal(job, time);
    }

    /// A device was occupied from `start` until `finish`.
    pub fn record_device_busy(&mut self, start: SimTime, finish: SimTime) {
        debug_assert!(start <= finish, "Start time cannot be greater than finish time");
        self.busy_nanos += (finish - start).as_nanos();
        gauge!(METRIC_BUSY).set(self.busy_time().as_secs_f64());
    }

    fn record_terminal(&mut self, job: &Job, time: SimTime) {
        let sojourn = time - job.created_at();
        self.sojourn_total_nanos += sojourn.as_nanos();
        self.sojourn_times.push(sojourn);
        self.last_event_time = time;
        histogram!(METRIC_SOJOURN).record(sojourn.as_secs_f64());
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Jobs that reached a terminal state.
    pub fn terminated(&self) -> u64 {
        self.completed + self.rejected
    }

    /// Time spent in the system by each terminated job, in termination order.
    pub fn sojourn_times(&self) -> &[Duration] {
        &self.sojourn_times
    }

    pub fn busy_time(&self) -> Duration {
        nanos_to_duration(self.busy_nanos)
    }

    /// Time of the latest completion or rejection.
    pub fn last_event_time(&self) -> SimTime {
        self.last_event_time
    }

    /// Fraction of terminated jobs that were rejected, 0 when nothing terminated.
    pub fn reject_probability(&self) -> f64 {
        let total = self.terminated();
        if total == 0 {
            0.0
        } else {
            self.rejected as f64 / total as f64
        }
    }

    /// Mean time between creation and termination, zero when nothing terminated.
    pub fn mean_sojourn_time(&self) -> Duration {
        if self.sojourn_times.is_empty() {
            Duration::ZERO
        } else {
            nanos_to_duration(self.sojourn_total_nanos / self.sojourn_times.len() as u128)
        }
    }

    /// Busy time over the device time available up to the last terminal event.
    ///
    /// Zero when no terminal event has happened after t=0 or there are no devices.
    pub fn server_utilization(&self) -> f64 {
        let capacity = u128::from(self.last_event_time.as_nanos()) * self.devices as u128;
        if capacity == 0 {
            0.0
        } else {
            self.busy_nanos as f64 / capacity as f64
        }
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
