//! Station configuration
//!
//! Times are given in seconds. Missing fields in a serialized document fall
//! back to the defaults below.

use crate::dists::TruncatedExponentialArrivals;
use crate::error::StationError;
use crate::time::SimTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Number of job sources
    pub sources: usize,
    /// Number of devices (servers)
    pub devices: usize,
    /// Arrivals are generated while the running clock is below this time
    pub time_horizon: f64,
    /// Buffer capacity
    pub buffer_capacity: usize,
    /// Lower bound of the uniform service time
    pub min_service_time: f64,
    /// Upper bound of the uniform service time
    pub max_service_time: f64,
    /// Arrival rate λ
    pub arrival_rate: f64,
    /// Seed for both random streams; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            sources: 5,
            devices: 5,
            time_horizon: 5.0,
            buffer_capacity: 5,
            min_service_time: 0.1,
            max_service_time: 1.0,
            arrival_rate: 0.5,
            seed: None,
        }
    }
}

impl StationConfig {
    pub fn new(
        sources: usize,
        devices: usize,
        time_horizon: f64,
        buffer_capacity: usize,
        min_service_time: f64,
        max_service_time: f64,
        arrival_rate: f64,
    ) -> Self {
        Self {
            sources,
            devices,
            time_horizon,
            buffer_capacity,
            min_service_time,
            max_service_time,
            arrival_rate,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn horizon(&self) -> SimTime {
        SimTime::from(self.time_horizon)
    }

    pub fn min_service(&self) -> Duration {
        Duration::from_secs_f64(self.min_service_time)
    }

    pub fn max_service(&self) -> Duration {
        Duration::from_secs_f64(self.max_service_time)
    }

    /// Check the values the simulation relies on.
    ///
    /// The simulation itself assumes a valid configuration; hosts call this
    /// before building one.
    pub fn validate(&self) -> Result<(), StationError> {
        let invalid = |msg: String| Err(StationError::Configuration(msg));

        if self.sources == 0 {
            return invalid("at least one source is required".into());
        }
        if self.buffer_capacity == 0 {
            return invalid("buffer capacity must be positive".into());
        }
        for (name, value) in [
            ("time horizon", self.time_horizon),
            ("min service time", self.min_service_time),
            ("max service time", self.max_service_time),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{name} must be non-negative, got {value}"));
            }
            if value > SimTime::MAX_SECS {
                return invalid(format!(
                    "{name} {value} exceeds the simulated clock range of {} seconds",
                    SimTime::MAX_SECS
                ));
            }
        }
        if self.min_service_time > self.max_service_time {
            return invalid(format!(
                "min service time {} exceeds max service time {}",
                self.min_service_time, self.max_service_time
            ));
        }
        if !self.arrival_rate.is_finite() || self.arrival_rate <= 0.0 {
            return invalid(format!("arrival rate must be positive, got {}", self.arrival_rate));
        }
        let longest_interval = -TruncatedExponentialArrivals::U_LOW.ln() / self.arrival_rate;
        if longest_interval > SimTime::MAX_SECS {
            return invalid(format!(
                "arrival rate {} is too small: intervals up to {longest_interval} seconds",
                self.arrival_rate
            ));
        }
        Ok(())
    }
}
