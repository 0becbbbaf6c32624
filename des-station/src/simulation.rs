//! The station driver: owns the event queue, buffer, devices and statistics
//! and advances them one event at a time.

use crate::buffer::{BoundedBuffer, EnqueueOutcome};
use crate::config::StationConfig;
use crate::device::DevicePool;
use crate::dists::{
    ArrivalPattern, ServiceTimeDistribution, TruncatedExponentialArrivals, UniformServiceTime,
};
use crate::error::StationError;
use crate::event::{Event, EventKind};
use crate::execute::{Execute, Executor};
use crate::job::{Job, JobId, JobRegistry, SourceId};
use crate::logging::event_span;
use crate::observer::{NoopObserver, SimulationObserver};
use crate::randomness::{stream_rng, STREAM_ARRIVALS, STREAM_SERVICE};
use crate::scheduler::EventQueue;
use crate::stats::Statistics;
use crate::time::SimTime;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace};

/// Shortest gap between two seeded arrivals; keeps the seeding loop finite
/// when a pattern yields zero-length intervals.
const MIN_ARRIVAL_GAP: Duration = Duration::from_nanos(1);

/// A single run of the station.
///
/// All arrivals are generated up front at construction. The run is finished
/// once the event queue is empty.
pub struct Simulation<O = NoopObserver> {
    config: StationConfig,
    queue: EventQueue,
    buffer: BoundedBuffer,
    devices: DevicePool,
    stats: Statistics,
    jobs: JobRegistry,
    observer: O,
    events_processed: u64,
}

impl Simulation<NoopObserver> {
    /// Build a run with the truncated-exponential arrival process and uniform
    /// service times described by `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid; see [`StationConfig::validate`].
    pub fn new(config: StationConfig) -> Self {
        Self::with_observer(config, NoopObserver)
    }
}

impl Default for Simulation<NoopObserver> {
    fn default() -> Self {
        Self::new(StationConfig::default())
    }
}

impl<O: SimulationObserver> Simulation<O> {
    /// Like [`Simulation::new`], reporting every state change to `observer`.
    pub fn with_observer(config: StationConfig, observer: O) -> Self {
        let arrivals = TruncatedExponentialArrivals::new(
            config.arrival_rate,
            stream_rng(config.seed, STREAM_ARRIVALS),
        );
        let service = UniformServiceTime::new(
            config.min_service(),
            config.max_service(),
            stream_rng(config.seed, STREAM_SERVICE),
        );
        Self::with_distributions(config, Box::new(arrivals), Box::new(service), observer)
    }

    /// Build a run with explicit samplers. The arrival rate and service bounds
    /// in `config` are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the buffer capacity is zero.
    pub fn with_distributions(
        config: StationConfig,
        mut arrivals: Box<dyn ArrivalPattern>,
        service: Box<dyn ServiceTimeDistribution>,
        mut observer: O,
    ) -> Self {
        let mut queue = EventQueue::new();
        let mut jobs = JobRegistry::new();
        seed_arrivals(&config, arrivals.as_mut(), &mut queue, &mut jobs);

        for source in 0..config.sources {
            observer.next_arrival_changed(source, queue.next_arrival_for(source));
        }

        info!(
            sources = config.sources,
            devices = config.devices,
            buffer_capacity = config.buffer_capacity,
            arrivals = queue.len(),
            "Station initialised"
        );

        Self {
            buffer: BoundedBuffer::new(config.buffer_capacity),
            devices: DevicePool::new(config.devices, service),
            stats: Statistics::new(config.devices),
            config,
            queue,
            jobs,
            observer,
            events_processed: 0,
        }
    }

    /// Process the earliest pending event.
    ///
    /// Returns `Ok(false)` without doing anything once the run is finished.
    pub fn step(&mut self) -> Result<bool, StationError> {
        let Some(entry) = self.queue.pop() else {
            return Ok(false);
        };

        let span = event_span(entry.id(), entry.event().kind.as_str(), entry.time());
        let _guard = span.enter();
        trace!(pending = self.queue.len(), "Processing station event");

        let Event { kind, time, job } = entry.into_event();
        let outcome = match kind {
            EventKind::ArrivalCreated => self.on_arrival(time, job),
            EventKind::ServiceCompleted => self.on_completion(time, job),
        };
        outcome
            .inspect_err(|err| error!(error = %err, "Station invariant violated, aborting run"))?;

        self.events_processed += 1;
        Ok(true)
    }

    pub fn run_to_completion(&mut self) -> Result<(), StationError> {
        self.execute(Executor::unbound()).map(|_| ())
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Runs the simulation with the given executor and returns the number of
    /// events it processed.
    #[instrument(skip(self, executor), fields(initial_time = %self.time()))]
    pub fn execute<E: Execute<O>>(&mut self, executor: E) -> Result<u64, StationError> {
        info!("Starting simulation execution");
        let steps = executor.execute(self)?;
        info!(
            final_time = %self.time(),
            steps,
            completed = self.stats.completed(),
            rejected = self.stats.rejected(),
            "Simulation execution completed"
        );
        Ok(steps)
    }

    /// Issue a job for `source` created at `at` and schedule its arrival.
    pub fn schedule_arrival(
        &mut self,
        source: SourceId,
        at: SimTime,
    ) -> Result<JobId, StationError> {
        let now = self.time();
        if at < now {
            return Err(StationError::ScheduleInPast { requested: at, now });
        }

        let job = self.jobs.next_job(source, at);
        let id = job.id();
        let event_id = self.queue.schedule(Event::arrival(at, job));
        trace!(%event_id, job = %id, time = %at, "Arrival scheduled");
        Ok(id)
    }

    fn on_arrival(&mut self, time: SimTime, job: Job) -> Result<(), StationError> {
        let source = job.source();
        self.observer.next_arrival_changed(source, self.queue.next_arrival_for(source));
        self.observer.job_created(time, &job);
        debug!(job = %job, %time, "Job created");

        if self.devices.has_free_device(time) {
            self.admit(time, job);
            let job = self.buffer.dequeue()?;
            self.observer.job_unbuffered(time, &job);
            self.start_service(time, job)
        } else {
            self.admit(time, job);
            Ok(())
        }
    }

    fn on_completion(&mut self, time: SimTime, job: Job) -> Result<(), StationError> {
        let device = self.devices.release(job.id())?;
        let started_at = self.devices.devices()[device].started_at();
        self.stats.record_device_busy(started_at, time);
        self.stats.record_completion(&job, time);
        self.observer.job_completed(time, &job, device);
        self.observer
            .tallies_changed(self.stats.completed(), self.stats.rejected());
        debug!(job = %job, device, %time, "Job completed");

        if self.buffer.is_empty() {
            return Ok(());
        }
        let next = self.buffer.dequeue()?;
        self.observer.job_unbuffered(time, &next);
        self.start_service(time, next)
    }

    /// Put `job` into the buffer, rejecting whatever it displaces.
    fn admit(&mut self, time: SimTime, job: Job) {
        if let EnqueueOutcome::Evicted(evicted) = self.buffer.try_enqueue(job) {
            self.reject(time, evicted);
        }
        if let Some(job) = self.buffer.newest() {
            self.observer.job_buffered(time, job);
            trace!(job = %job, occupancy = self.buffer.len(), "Job buffered");
        }
    }

    fn reject(&mut self, time: SimTime, job: Job) {
        self.stats.record_rejection(&job, time);
        self.observer.job_evicted(time, &job);
        self.observer
            .tallies_changed(self.stats.completed(), self.stats.rejected());
        debug!(job = %job, %time, "Job rejected");
    }

    fn start_service(&mut self, time: SimTime, job: Job) -> Result<(), StationError> {
        let assignment = self.devices.assign(job.id(), time)?;
        self.observer
            .job_assigned(time, &job, assignment.device, assignment.finish_time);
        debug!(
            job = %job,
            device = assignment.device,
            finish = %assignment.finish_time,
            "Job assigned"
        );
        self.queue
            .schedule(Event::service_completed(assignment.finish_time, job));
        Ok(())
    }

    pub fn reject_probability(&self) -> f64 {
        self.stats.reject_probability()
    }

    pub fn mean_sojourn_time(&self) -> Duration {
        self.stats.mean_sojourn_time()
    }

    pub fn server_utilization(&self) -> f64 {
        self.stats.server_utilization()
    }

    /// Time of the last processed event.
    pub fn time(&self) -> SimTime {
        self.queue.time()
    }

    /// Time of the next pending event, `None` once finished.
    pub fn next_event_time(&self) -> Option<SimTime> {
        self.queue.peek().map(|entry| entry.time())
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn buffer(&self) -> &BoundedBuffer {
        &self.buffer
    }

    pub fn devices(&self) -> &DevicePool {
        &self.devices
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// The next job `source` will produce, if it has any left.
    pub fn next_arrival(&self, source: SourceId) -> Option<&Job> {
        self.queue.next_arrival_for(source)
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Jobs issued so far, seeded and forced arrivals alike.
    pub fn jobs_issued(&self) -> u64 {
        self.jobs.total_issued()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }
}

impl<O> fmt::Debug for Simulation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("time", &self.queue.time())
            .field("pending_events", &self.queue.len())
            .field("buffer", &self.buffer)
            .field("devices", &self.devices)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Generate every arrival of the run, round-robin over the sources, until the
/// running clock reaches the horizon.
fn seed_arrivals(
    config: &StationConfig,
    arrivals: &mut dyn ArrivalPattern,
    queue: &mut EventQueue,
    jobs: &mut JobRegistry,
) {
    if config.sources == 0 {
        return;
    }

    let horizon = config.horizon();
    let mut clock = SimTime::zero();
    let mut index = 0usize;
    while clock < horizon {
        let job = jobs.next_job(index % config.sources, clock);
        queue.schedule(Event::arrival(clock, job));
        clock = clock + arrivals.next_arrival_time().max(MIN_ARRIVAL_GAP);
        index += 1;
    }
    trace!(seeded = index, horizon = %horizon, "Arrivals seeded");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dists::{ConstantArrivalPattern, ConstantServiceTime};
    use crate::observer::{TraceEvent, TraceRecorder};

    fn config(sources: usize, devices: usize, horizon: f64, capacity: usize) -> StationConfig {
        StationConfig {
            sources,
            devices,
            time_horizon: horizon,
            buffer_capacity: capacity,
            ..Default::default()
        }
    }

    fn fixed(
        config: StationConfig,
        interval: Duration,
        service: Duration,
    ) -> Simulation<TraceRecorder> {
        Simulation::with_distributions(
            config,
            Box::new(ConstantArrivalPattern::new(interval)),
            Box::new(ConstantServiceTime::new(service)),
            TraceRecorder::new(),
        )
    }

    #[test]
    fn test_seeding_is_round_robin_up_to_horizon() {
        let sim = fixed(config(3, 1, 1.0, 2), Duration::from_millis(300), Duration::from_secs(1));
        // Clock values 0.0, 0.3, 0.6, 0.9
        assert_eq!(sim.pending_events(), 4);
        assert_eq!(sim.jobs_issued(), 4);
        assert_eq!(sim.next_arrival(0).unwrap().id(), JobId::new(0, 0));
        assert_eq!(sim.next_arrival(1).unwrap().created_at(), SimTime::from_millis(300));
        assert_eq!(sim.next_arrival(2).unwrap().created_at(), SimTime::from_millis(600));
        // The fourth arrival wraps back to source 0
        assert_eq!(sim.next_arrival(0).unwrap().sequence(), 0);
        assert_eq!(sim.next_event_time(), Some(SimTime::zero()));

        let initial: Vec<_> = sim.observer().events().to_vec();
        assert_eq!(initial.len(), 3);
        assert!(matches!(initial[2], TraceEvent::NextArrival { source: 2, .. }));
    }

    #[test]
    fn test_no_sources_or_zero_horizon_means_finished() {
        let mut sim = fixed(config(0, 1, 5.0, 1), Duration::from_secs(1), Duration::from_secs(1));
        assert!(sim.is_finished());
        assert_eq!(sim.step(), Ok(false));

        let sim = fixed(config(2, 1, 0.0, 1), Duration::from_secs(1), Duration::from_secs(1));
        assert!(sim.is_finished());
        assert_eq!(sim.observer().events().len(), 2);
    }

    #[test]
    fn test_zero_interval_does_not_stall_seeding() {
        let sim = fixed(config(1, 1, 0.000_000_005, 1), Duration::ZERO, Duration::ZERO);
        assert_eq!(sim.pending_events(), 5);
    }

    #[test]
    fn test_arrival_with_free_device_passes_through_buffer() {
        let mut sim = fixed(config(1, 1, 0.5, 1), Duration::from_secs(1), Duration::from_secs(2));
        sim.observer_mut().clear();

        assert_eq!(sim.step(), Ok(true));
        let job = JobId::new(0, 0);
        let t0 = SimTime::zero();
        assert_eq!(
            sim.observer().events(),
            &[
                TraceEvent::NextArrival { source: 0, job: None, at: None },
                TraceEvent::Created { time: t0, job },
                TraceEvent::Buffered { time: t0, job },
                TraceEvent::Unbuffered { time: t0, job },
                TraceEvent::Assigned { time: t0, job, device: 0, finish: SimTime::from_secs(2) },
            ]
        );
        assert!(sim.buffer().is_empty());
        assert_eq!(sim.devices().busy_count(), 1);
        // Busy time is accrued once the service has actually ended
        assert_eq!(sim.statistics().busy_time(), Duration::ZERO);

        assert_eq!(sim.step(), Ok(true));
        assert_eq!(sim.time(), SimTime::from_secs(2));
        assert_eq!(sim.statistics().completed(), 1);
        assert_eq!(sim.statistics().busy_time(), Duration::from_secs(2));
        assert_eq!(sim.server_utilization(), 1.0);
        assert!(sim.is_finished());
        assert_eq!(sim.events_processed(), 2);
    }

    #[test]
    fn test_completion_pulls_buffer_head() {
        let mut sim = fixed(config(2, 1, 0.2, 1), Duration::from_millis(100), Duration::from_secs(1));
        sim.step().unwrap(); // S0_0 served
        sim.step().unwrap(); // S1_0 buffered
        assert_eq!(sim.buffer().len(), 1);
        sim.observer_mut().clear();

        sim.step().unwrap(); // S0_0 completes at 1.0
        let t = SimTime::from_secs(1);
        let next = JobId::new(1, 0);
        assert_eq!(
            sim.observer().events(),
            &[
                TraceEvent::Completed { time: t, job: JobId::new(0, 0), device: 0 },
                TraceEvent::Tallies { completed: 1, rejected: 0 },
                TraceEvent::Unbuffered { time: t, job: next },
                TraceEvent::Assigned { time: t, job: next, device: 0, finish: SimTime::from_secs(2) },
            ]
        );
    }

    #[test]
    fn test_eviction_reports_rejection_before_buffering() {
        let mut sim = fixed(config(1, 0, 1.5, 1), Duration::from_secs(1), Duration::from_secs(1));
        sim.step().unwrap();
        sim.observer_mut().clear();
        sim.step().unwrap();

        let t = SimTime::from_secs(1);
        assert_eq!(
            sim.observer().events(),
            &[
                TraceEvent::NextArrival { source: 0, job: None, at: None },
                TraceEvent::Created { time: t, job: JobId::new(0, 1) },
                TraceEvent::Evicted { time: t, job: JobId::new(0, 0) },
                TraceEvent::Tallies { completed: 0, rejected: 1 },
                TraceEvent::Buffered { time: t, job: JobId::new(0, 1) },
            ]
        );
        // Sojourn of a rejected job runs until its eviction
        assert_eq!(sim.statistics().sojourn_times(), &[Duration::from_secs(1)]);
    }

    #[test]
    fn test_schedule_arrival() {
        let mut sim = fixed(config(1, 1, 0.5, 1), Duration::from_secs(1), Duration::from_secs(1));
        sim.run_to_completion().unwrap();
        assert_eq!(sim.time(), SimTime::from_secs(1));

        let err = sim.schedule_arrival(0, SimTime::from_millis(500)).unwrap_err();
        assert_eq!(
            err,
            StationError::ScheduleInPast {
                requested: SimTime::from_millis(500),
                now: SimTime::from_secs(1),
            }
        );

        let id = sim.schedule_arrival(0, SimTime::from_secs(3)).unwrap();
        assert_eq!(id, JobId::new(0, 1));
        assert!(!sim.is_finished());
        sim.run_to_completion().unwrap();
        assert_eq!(sim.statistics().completed(), 2);
        assert_eq!(sim.time(), SimTime::from_secs(4));
    }

    #[test]
    fn test_longest_valid_service_time_keeps_exact_finish() {
        let config = StationConfig::new(1, 1, 0.5, 1, 1.8e10, 1.8e10, 1.0).with_seed(3);
        assert!(config.validate().is_ok());
        let mut sim = Simulation::with_observer(config, TraceRecorder::new());

        assert_eq!(sim.step(), Ok(true));
        let finish = SimTime::from_secs(18_000_000_000);
        assert_eq!(sim.devices().devices()[0].finish_time(), finish);
        assert_eq!(sim.next_event_time(), Some(finish));
    }

    #[test]
    fn test_default_simulation_runs() {
        let mut sim = Simulation::new(StationConfig::default().with_seed(5));
        sim.run_to_completion().unwrap();
        assert!(sim.is_finished());
        assert_eq!(sim.statistics().terminated(), sim.jobs_issued());
        assert!(format!("{sim:?}").starts_with("Simulation"));
    }
}
