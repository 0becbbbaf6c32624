//! Runs one station simulation and prints its event table and metrics.
//!
//! ```bash
//! cargo run --example station_demo
//! cargo run --example station_demo -- station.json
//! RUST_LOG=des_station=debug cargo run --example station_demo
//! ```
//!
//! The optional JSON document may set any subset of the `StationConfig`
//! fields, e.g. `{ "devices": 2, "buffer_capacity": 3, "seed": 7 }`.

use des_station::{
    init_station_logging, simulation_span, DeviceId, Executor, Job, Simulation,
    SimulationObserver, SimTime, SourceId, StationConfig, TraceRecorder,
};
use std::error::Error;
use tracing::info;

/// Prints every event-table row as soon as the simulation reports it.
#[derive(Default)]
struct TablePrinter {
    recorder: TraceRecorder,
}

impl TablePrinter {
    fn print_latest(&self) {
        if let Some(event) = self.recorder.events().last() {
            println!("{event}");
        }
    }
}

impl SimulationObserver for TablePrinter {
    fn next_arrival_changed(&mut self, source: SourceId, next: Option<&Job>) {
        self.recorder.next_arrival_changed(source, next);
    }

    fn job_created(&mut self, time: SimTime, job: &Job) {
        self.recorder.job_created(time, job);
        self.print_latest();
    }

    fn job_buffered(&mut self, time: SimTime, job: &Job) {
        self.recorder.job_buffered(time, job);
        self.print_latest();
    }

    fn job_unbuffered(&mut self, time: SimTime, job: &Job) {
        self.recorder.job_unbuffered(time, job);
        self.print_latest();
    }

    fn job_evicted(&mut self, time: SimTime, job: &Job) {
        self.recorder.job_evicted(time, job);
        self.print_latest();
    }

    fn job_assigned(&mut self, time: SimTime, job: &Job, device: DeviceId, finish: SimTime) {
        self.recorder.job_assigned(time, job, device, finish);
        self.print_latest();
    }

    fn job_completed(&mut self, time: SimTime, job: &Job, device: DeviceId) {
        self.recorder.job_completed(time, job, device);
        self.print_latest();
    }
}

fn load_config() -> Result<StationConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let document = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&document)?)
        }
        None => Ok(StationConfig::default().with_seed(42)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_station_logging();

    let config = load_config()?;
    config.validate()?;
    info!(?config, "Loaded station configuration");

    let span = simulation_span("station_demo");
    let _guard = span.enter();

    let mut simulation = Simulation::with_observer(config, TablePrinter::default());
    for source in 0..simulation.config().sources {
        if let Some(job) = simulation.next_arrival(source) {
            println!("source {source}: first job {job} at {}", job.created_at());
        }
    }
    println!();

    let mut peak_occupancy = 0;
    let track_peak = |sim: &Simulation<TablePrinter>| {
        peak_occupancy = peak_occupancy.max(sim.buffer().len());
    };
    let steps = simulation.execute(Executor::unbound().side_effect(track_peak))?;

    let stats = simulation.statistics();
    println!();
    println!("events processed:   {steps}");
    println!("completed:          {}", stats.completed());
    println!("rejected:           {}", stats.rejected());
    println!("peak buffer length: {peak_occupancy}");
    println!("reject probability: {:.4}", simulation.reject_probability());
    println!("mean sojourn time:  {:.4} s", simulation.mean_sojourn_time().as_secs_f64());
    println!("server utilization: {:.4}", simulation.server_utilization());

    Ok(())
}
