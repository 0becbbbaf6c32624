//! Structured logging for station runs
//!
//! The driver logs through `tracing`:
//! - **TRACE**: every processed event (inside an `event` span) and buffer moves
//! - **DEBUG**: job state changes (created, assigned, completed, rejected)
//! - **INFO**: run start and finish
//! - **ERROR**: broken invariants that abort a run
//!
//! `RUST_LOG` always overrides the default filter:
//! ```bash
//! RUST_LOG=des_station=debug cargo run --example station_demo
//! RUST_LOG=des_station::simulation=trace cargo run --example station_demo
//! ```
//!
//! The initialisers only install a subscriber if none is set yet, so calling
//! them more than once is harmless.

use crate::event::EventId;
use crate::time::SimTime;
use tracing::{info, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for station runs at `info` level.
pub fn init_station_logging() {
    init_station_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
///
/// # Example
/// ```rust
/// use des_station::logging::init_station_logging_with_level;
///
/// init_station_logging_with_level("debug");
/// ```
pub fn init_station_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level).into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Station logging initialized at level: {}", level);
    }
}

/// Initialize logging with everything enabled and pretty-printed output.
pub fn init_detailed_station_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("debug,{}=trace", env!("CARGO_CRATE_NAME")).into());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed station logging initialized");
    }
}

/// Create a span for tracking a whole run
pub fn simulation_span(name: &str) -> Span {
    tracing::info_span!("simulation", name = name)
}

/// Create a span for tracking event processing
pub fn event_span(event_id: EventId, event_type: &str, time: SimTime) -> Span {
    tracing::trace_span!("event",
        id = event_id.0,
        event_type = event_type,
        time = %time
    )
}
