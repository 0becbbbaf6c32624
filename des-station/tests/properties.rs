//! Property tests over randomly configured, seeded runs.

use des_station::{BoundedBuffer, EnqueueOutcome, JobRegistry, SimTime, Simulation, StationConfig};
use proptest::prelude::*;

fn station_config(min_devices: usize) -> impl Strategy<Value = StationConfig> {
    (
        1usize..6,
        min_devices..4,
        0.0f64..15.0,
        1usize..5,
        0.0f64..1.0,
        0.0f64..2.0,
        0.2f64..6.0,
        any::<u64>(),
    )
        .prop_map(
            |(sources, devices, horizon, capacity, min_service, spread, rate, seed)| {
                StationConfig::new(
                    sources,
                    devices,
                    horizon,
                    capacity,
                    min_service,
                    min_service + spread,
                    rate,
                )
                .with_seed(seed)
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Buffer length stays within capacity and utilization within [0, 1] after every step.
    #[test]
    fn station_invariants_hold_after_every_step(config in station_config(0)) {
        prop_assert!(config.validate().is_ok());
        let capacity = config.buffer_capacity;
        let mut sim = Simulation::new(config);

        while sim.step().unwrap() {
            prop_assert!(sim.buffer().len() <= capacity);
            let utilization = sim.server_utilization();
            prop_assert!((0.0..=1.0).contains(&utilization), "utilization {}", utilization);
            prop_assert!(sim.statistics().terminated() <= sim.jobs_issued());
        }
    }

    /// With at least one device every issued job reaches exactly one terminal state.
    #[test]
    fn every_job_terminates_once(config in station_config(1)) {
        let mut sim = Simulation::new(config);
        sim.run_to_completion().unwrap();

        let stats = sim.statistics();
        prop_assert_eq!(stats.completed() + stats.rejected(), sim.jobs_issued());
        prop_assert_eq!(stats.sojourn_times().len() as u64, sim.jobs_issued());
        prop_assert!(sim.buffer().is_empty());
        prop_assert_eq!(sim.devices().busy_count(), 0);
        prop_assert_eq!(stats.rejected(), sim.buffer().total_evicted());
    }

    /// Without devices nothing completes; jobs are either rejected or still waiting.
    #[test]
    fn without_devices_jobs_are_rejected_or_held(
        sources in 1usize..4,
        capacity in 1usize..4,
        seed in any::<u64>(),
    ) {
        let config = StationConfig::new(sources, 0, 10.0, capacity, 0.1, 1.0, 2.0).with_seed(seed);
        let mut sim = Simulation::new(config);
        sim.run_to_completion().unwrap();

        let stats = sim.statistics();
        prop_assert_eq!(stats.completed(), 0);
        prop_assert_eq!(stats.rejected() + sim.buffer().len() as u64, sim.jobs_issued());
        prop_assert_eq!(sim.buffer().len() as u64, (capacity as u64).min(sim.jobs_issued()));
    }

    /// Each enqueue into a full buffer evicts exactly the previous head.
    #[test]
    fn full_buffer_evicts_previous_head(capacity in 1usize..6, extra in 1usize..20) {
        let mut registry = JobRegistry::new();
        let mut buffer = BoundedBuffer::new(capacity);
        for i in 0..capacity {
            buffer.try_enqueue(registry.next_job(0, SimTime::from_secs(i as u64)));
        }

        for i in 0..extra {
            let head = buffer.peek_head().unwrap().id();
            let job = registry.next_job(0, SimTime::from_secs((capacity + i) as u64));
            let id = job.id();
            match buffer.try_enqueue(job) {
                EnqueueOutcome::Evicted(evicted) => prop_assert_eq!(evicted.id(), head),
                EnqueueOutcome::Accepted => {
                    prop_assert!(false, "full buffer accepted without eviction")
                }
            }
            prop_assert_eq!(buffer.newest().map(|job| job.id()), Some(id));
            prop_assert_eq!(buffer.len(), capacity);
        }
        prop_assert_eq!(buffer.total_evicted(), extra as u64);
    }
}
