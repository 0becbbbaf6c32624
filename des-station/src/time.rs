//! Simulated clock values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// A point in simulated time, stored as nanoseconds since the start of the run.
///
/// The station works with real-valued times (seconds); fixed-point storage keeps
/// equal-time comparisons exact and lets running aggregates stay in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Largest representable time, in seconds.
    pub const MAX_SECS: f64 = (u64::MAX as f64) / 1_000_000_000.0;

    /// Simulation start
    pub const fn zero() -> Self {
        SimTime(0)
    }

    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis * 1_000_000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    /// Saturates at the largest representable time.
    pub fn from_duration(duration: Duration) -> Self {
        SimTime(saturating_nanos(duration))
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Real-valued view in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.as_duration().as_secs_f64()
    }

    /// Elapsed time since `earlier`, zero if `earlier` is later than `self`.
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    pub fn add_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_add(saturating_nanos(duration)))
    }
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        self.add_duration(rhs)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl From<f64> for SimTime {
    /// Convert from seconds to SimTime
    ///
    /// ```
    /// # use des_station::SimTime;
    /// let time = SimTime::from(0.1);
    /// assert_eq!(time.as_nanos(), 100_000_000);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the input is negative, infinite, NaN or too large to represent.
    fn from(secs: f64) -> Self {
        if !secs.is_finite() {
            panic!("SimTime cannot be created from non-finite value: {secs}");
        }
        if secs < 0.0 {
            panic!("SimTime cannot be negative: {secs}");
        }
        if secs > Self::MAX_SECS {
            panic!(
                "SimTime value too large: {secs} seconds (max: {} seconds)",
                Self::MAX_SECS
            );
        }

        SimTime::from_nanos((secs * 1_000_000_000.0).round() as u64)
    }
}

impl fmt::Display for SimTime {
    /// Seconds with millisecond precision, e.g. `1.250`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self.as_duration();
        f.pad(&format!("{}.{:03}", duration.as_secs(), duration.subsec_millis()))
    }
}
