//! Subcommand handlers. Each module owns its clap `*Action` enum and a `run`
//! entry point.

pub mod config;
pub mod data;
pub mod food;
pub mod history;
pub mod profile;
pub mod run;
pub mod stats;
pub mod sync;
pub mod today;

use chrono::{Local, NaiveDate};
use healthtrack_core::{describe_api_error, ApiError, AppContext};
use serde::Serialize;
use tracing::warn;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the context over the default data directory.
pub fn open_context() -> Result<AppContext, Box<dyn std::error::Error>> {
    Ok(AppContext::open_default()?)
}

/// Runtime for commands that talk to the network or drive sensors.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

/// Turn a failed request into the message shown to the user.
pub fn api_failure(operation: &'static str) -> impl Fn(ApiError) -> Box<dyn std::error::Error> {
    move |e| {
        warn!(error = %e, operation, "request failed");
        describe_api_error(&e, operation).into()
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Destructive commands refuse to run without `--yes`.
pub fn require_confirmation(yes: bool, what: &str) -> CmdResult {
    if yes {
        Ok(())
    } else {
        Err(format!("{what}; pass --yes to confirm").into())
    }
}

/// Print an event as a JSON line, or as a short human-readable line.
pub fn print_event(event: &healthtrack_core::Event, json: bool) -> CmdResult {
    use healthtrack_core::Event;

    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::RunStarted { step_length_m, .. } => {
            println!("run started (step length {step_length_m:.2} m)")
        }
        Event::RunPaused { elapsed_secs, distance_m, .. } => {
            println!("paused at {} / {distance_m:.0} m", healthtrack_core::tracking::format_elapsed(*elapsed_secs))
        }
        Event::RunResumed { paused_secs, .. } => println!("resumed after {paused_secs:.0} s"),
        Event::FixAccepted { leg_m, distance_m, accuracy, .. } => {
            println!("gps  +{leg_m:>5.1} m  total {distance_m:>7.1} m  (±{accuracy:.0} m)")
        }
        Event::SourceSwitched { from, to, accuracy, .. } => {
            println!("source {from:?} -> {to:?} (accuracy {accuracy:.0} m)")
        }
        Event::StepsUpdated { steps, distance_m, .. } => {
            println!("steps {steps:>5}       total {distance_m:>7.1} m")
        }
        Event::RunSaved { run_id, distance_m, .. } => println!("run saved: {run_id} ({distance_m:.0} m)"),
        Event::RunDiscarded { distance_m, min_distance_m, .. } => {
            println!("run discarded: {distance_m:.0} m is under {min_distance_m:.0} m")
        }
        Event::SyncQueued { kind, queued, .. } => println!("offline: {kind} queued ({queued} pending)"),
        Event::SyncReplayed { succeeded, remaining, .. } => {
            println!("replayed {succeeded} queued item(s), {remaining} remaining")
        }
        other => println!("{}", serde_json::to_string(other)?),
    }
    Ok(())
}
