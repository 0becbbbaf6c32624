//! Arrival-interval and service-time distributions
//!
//! These are the only sources of randomness in a run. Both traits hand out
//! `Duration`s; the simulation turns them into `SimTime` offsets.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Uniform;
use std::time::Duration;

/// Source of inter-arrival intervals.
pub trait ArrivalPattern: Send {
    /// Time between the previous arrival and the next one.
    fn next_arrival_time(&mut self) -> Duration;
}

/// Source of service durations.
pub trait ServiceTimeDistribution: Send {
    fn sample(&mut self) -> Duration;
}

// =============================================================================
// Arrival patterns
// =============================================================================

/// Constant inter-arrival time.
#[derive(Debug, Clone)]
pub struct ConstantArrivalPattern {
    inter_arrival_time: Duration,
}

impl ConstantArrivalPattern {
    pub fn new(inter_arrival_time: Duration) -> Self {
        Self { inter_arrival_time }
    }
}

impl ArrivalPattern for ConstantArrivalPattern {
    fn next_arrival_time(&mut self) -> Duration {
        self.inter_arrival_time
    }
}

/// Exponential-shaped intervals `-(1/λ)·ln(U)` with `U` drawn from `[0.3, 0.6]`
/// instead of `(0, 1)`.
///
/// Restricting `U` cuts off both tails: every interval lies in
/// `[ln(1/0.6)/λ, ln(1/0.3)/λ]`, roughly `[0.51/λ, 1.20/λ]`.
pub struct TruncatedExponentialArrivals {
    /// Rate parameter (lambda)
    rate: f64,
    rng: ChaCha8Rng,
    uniform: Uniform<f64>,
}

impl TruncatedExponentialArrivals {
    pub const U_LOW: f64 = 0.3;
    pub const U_HIGH: f64 = 0.6;

    /// # Panics
    ///
    /// Panics if rate is not positive and finite.
    pub fn new(rate: f64, rng: ChaCha8Rng) -> Self {
        assert!(rate > 0.0 && rate.is_finite(), "Rate must be positive");
        Self {
            rate,
            rng,
            uniform: Uniform::new_inclusive(Self::U_LOW, Self::U_HIGH),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Shortest interval this pattern can produce.
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(-Self::U_HIGH.ln() / self.rate)
    }

    /// Longest interval this pattern can produce.
    pub fn max_interval(&self) -> Duration {
        Duration::from_secs_f64(-Self::U_LOW.ln() / self.rate)
    }
}

impl ArrivalPattern for TruncatedExponentialArrivals {
    fn next_arrival_time(&mut self) -> Duration {
        let u = self.rng.sample(self.uniform);
        Duration::from_secs_f64(-(1.0 / self.rate) * u.ln())
    }
}

// =============================================================================
// Service time distributions
// =============================================================================

#[derive(Debug, Clone)]
pub struct ConstantServiceTime {
    service_time: Duration,
}

impl ConstantServiceTime {
    pub fn new(service_time: Duration) -> Self {
        Self { service_time }
    }
}

impl ServiceTimeDistribution for ConstantServiceTime {
    fn sample(&mut self) -> Duration {
        self.service_time
    }
}

/// Service times drawn uniformly from `[min, max]`, both ends included.
///
/// `min == max` is allowed and always yields exactly that duration.
pub struct UniformServiceTime {
    min_duration: Duration,
    max_duration: Duration,
    rng: ChaCha8Rng,
    uniform_dist: Uniform<f64>,
}

impl UniformServiceTime {
    /// # Panics
    ///
    /// Panics if `min_duration > max_duration`.
    pub fn new(min_duration: Duration, max_duration: Duration, rng: ChaCha8Rng) -> Self {
        assert!(
            min_duration <= max_duration,
            "Minimum duration must not exceed maximum duration"
        );

        let uniform_dist =
            Uniform::new_inclusive(min_duration.as_secs_f64(), max_duration.as_secs_f64());

        Self {
            min_duration,
            max_duration,
            rng,
            uniform_dist,
        }
    }

    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn mean_service_time(&self) -> Duration {
        (self.min_duration + self.max_duration) / 2
    }
}

impl ServiceTimeDistribution for UniformServiceTime {
    fn sample(&mut self) -> Duration {
        let secs = self.rng.sample(self.uniform_dist);
        // Float round-off must not leave the configured range.
        Duration::from_secs_f64(secs).clamp(self.min_duration, self.max_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_constant_patterns() {
        let mut arrivals = ConstantArrivalPattern::new(Duration::from_millis(100));
        assert_eq!(arrivals.next_arrival_time(), Duration::from_millis(100));
        assert_eq!(arrivals.next_arrival_time(), Duration::from_millis(100));

        let mut service = ConstantServiceTime::new(Duration::from_secs(1));
        assert_eq!(service.sample(), Duration::from_secs(1));
    }

    #[test]
    fn test_truncated_arrivals_stay_in_bounds() {
        let mut pattern = TruncatedExponentialArrivals::new(2.0, rng(1));
        let (lo, hi) = (pattern.min_interval(), pattern.max_interval());
        // ln(1/0.6)/2 and ln(1/0.3)/2
        assert!((lo.as_secs_f64() - 0.255_412).abs() < 1e-5);
        assert!((hi.as_secs_f64() - 0.601_986).abs() < 1e-5);

        for _ in 0..1000 {
            let interval = pattern.next_arrival_time();
            assert!(interval >= lo - Duration::from_nanos(1), "{interval:?} below {lo:?}");
            assert!(interval <= hi + Duration::from_nanos(1), "{interval:?} above {hi:?}");
        }
    }

    #[test]
    fn test_truncated_arrivals_replay_with_same_seed() {
        let mut a = TruncatedExponentialArrivals::new(0.5, rng(9));
        let mut b = TruncatedExponentialArrivals::new(0.5, rng(9));
        for _ in 0..50 {
            assert_eq!(a.next_arrival_time(), b.next_arrival_time());
        }
    }

    #[test]
    #[should_panic(expected = "Rate must be positive")]
    fn test_truncated_arrivals_invalid_rate() {
        TruncatedExponentialArrivals::new(0.0, rng(0));
    }

    #[test]
    fn test_uniform_service_time_sampling() {
        let min = Duration::from_millis(100);
        let max = Duration::from_millis(1000);
        let mut dist = UniformServiceTime::new(min, max, rng(3));
        assert_eq!(dist.mean_service_time(), Duration::from_millis(550));

        let samples: Vec<_> = (0..500).map(|_| dist.sample()).collect();
        assert!(samples.iter().all(|s| *s >= min && *s <= max));

        // Should reach close to both ends of the range
        let tolerance = Duration::from_millis(100);
        assert!(*samples.iter().min().unwrap() <= min + tolerance);
        assert!(*samples.iter().max().unwrap() >= max - tolerance);
    }

    #[test]
    fn test_uniform_service_time_degenerate_range() {
        let one = Duration::from_secs(1);
        let mut dist = UniformServiceTime::new(one, one, rng(5));
        for _ in 0..10 {
            assert_eq!(dist.sample(), one);
        }
    }

    #[test]
    #[should_panic(expected = "Minimum duration must not exceed maximum duration")]
    fn test_uniform_service_time_inverted_range() {
        UniformServiceTime::new(Duration::from_secs(2), Duration::from_secs(1), rng(0));
    }
}
