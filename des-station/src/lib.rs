//! Discrete event simulation of a finite-capacity queueing station.
//!
//! Jobs arrive from a fixed set of sources, wait in a shared bounded buffer and
//! are served by a pool of identical devices. A full buffer makes room for a
//! newcomer by rejecting the job that has waited longest.
//!
//! # Architecture Overview
//!
//! - [`Simulation`]: owns the event queue, the buffer, the devices and the
//!   statistics. All arrivals are generated when it is built; each
//!   [`Simulation::step`] then processes one event.
//! - [`SimulationObserver`]: synchronous listener for every state change, in
//!   the order it happens. [`TraceRecorder`] keeps them for later inspection.
//! - [`Executor`]: drives a simulation until no events are left, for a number
//!   of steps or up to a point in time, optionally calling a side effect after
//!   each step.
//!
//! # Basic Usage
//!
//! ```rust
//! use des_station::{Executor, Simulation, StationConfig};
//!
//! let config = StationConfig::default().with_seed(42);
//! config.validate()?;
//!
//! let mut simulation = Simulation::new(config);
//! simulation.execute(Executor::unbound())?;
//!
//! assert!(simulation.is_finished());
//! assert!(simulation.server_utilization() <= 1.0);
//! # Ok::<(), des_station::StationError>(())
//! ```
//!
//! # Time Model
//!
//! All timing uses [`SimTime`], which represents simulation time (not wall-clock time).
//! Runs with the same configuration and seed are reproducible event for event.

pub mod buffer;
pub mod config;
pub mod device;
pub mod dists;
pub mod error;
pub mod event;
pub mod execute;
pub mod job;
pub mod logging;
pub mod observer;
pub mod randomness;
pub mod scheduler;
pub mod simulation;
pub mod stats;
pub mod time;

pub use buffer::{BoundedBuffer, EnqueueOutcome};
pub use config::StationConfig;
pub use device::{Assignment, Device, DeviceId, DevicePool};
pub use dists::{
    ArrivalPattern, ConstantArrivalPattern, ConstantServiceTime, ServiceTimeDistribution,
    TruncatedExponentialArrivals, UniformServiceTime,
};
pub use error::StationError;
pub use event::{Event, EventId, EventKind};
pub use execute::{Execute, Executor, ExecutorWithSideEffect};
pub use job::{Job, JobId, JobRegistry, SourceId};
pub use logging::{
    event_span, init_detailed_station_logging, init_station_logging,
    init_station_logging_with_level, simulation_span,
};
pub use observer::{NoopObserver, SimulationObserver, TraceEvent, TraceRecorder};
pub use scheduler::{EventEntry, EventQueue};
pub use simulation::Simulation;
pub use stats::Statistics;
pub use time::SimTime;
