use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use clap::Subcommand;
use healthtrack_core::sensors::{LocationSource, SimulatedGps, SimulatedPedometer, StepSource};
use healthtrack_core::tracking::{format_elapsed, format_pace, LocationFix};
use healthtrack_core::{AppContext, Capability, MainLoop, RunDriver, RunRecord, StopOutcome};
use tracing::warn;
use uuid::Uuid;

use super::{date_or_today, open_context, print_event, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum RunAction {
    /// Drive a run from a simulated GPS track and step counter
    Simulate {
        /// Number of GPS fixes to generate
        #[arg(long, default_value = "60")]
        fixes: u64,
        /// Seconds between fixes
        #[arg(long, default_value = "2")]
        interval: u64,
        /// First fix index with a weak signal
        #[arg(long, requires = "weak_to")]
        weak_from: Option<u64>,
        /// Fix index where the weak signal ends (exclusive)
        #[arg(long, requires = "weak_from")]
        weak_to: Option<u64>,
        /// Pause after this fix index
        #[arg(long)]
        pause_at: Option<u64>,
        /// Pause length in seconds
        #[arg(long, default_value = "60")]
        pause_secs: u64,
        /// Simulate a device without a step counter
        #[arg(long)]
        no_pedometer: bool,
        /// Wait the real interval between fixes
        #[arg(long)]
        realtime: bool,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Replay GPS fixes from a JSON-lines file
    Replay {
        /// One fix object per line
        file: PathBuf,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List runs for a day
    List {
        /// Day to list (default today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a run
    Delete {
        /// Day the run was recorded on
        date: NaiveDate,
        /// Run ID
        id: Uuid,
    },
}

pub fn run(action: RunAction) -> CmdResult {
    match action {
        RunAction::Simulate {
            fixes,
            interval,
            weak_from,
            weak_to,
            pause_at,
            pause_secs,
            no_pedometer,
            realtime,
            json,
        } => {
            let plan = SimulationPlan {
                fixes,
                interval_secs: interval,
                weak: weak_from.zip(weak_to),
                pause_at,
                pause_secs,
                pedometer: !no_pedometer,
                realtime,
            };
            simulate(plan, json)
        }
        RunAction::Replay { file, json } => replay(&file, json),
        RunAction::List { date, json } => list(date_or_today(date), json),
        RunAction::Delete { date, id } => {
            let ctx = open_context()?;
            let removed = ctx.store.delete_run(date, id)?;
            println!("deleted run {} ({:.2} km)", removed.id, removed.distance_km());
            Ok(())
        }
    }
}

struct SimulationPlan {
    fixes: u64,
    interval_secs: u64,
    weak: Option<(u64, u64)>,
    pause_at: Option<u64>,
    pause_secs: u64,
    pedometer: bool,
    realtime: bool,
}

/// State owned by the main loop while a simulated run is in progress.
struct Simulation {
    driver: RunDriver,
    last_at: DateTime<Utc>,
    finished: bool,
}

fn simulate(plan: SimulationPlan, json: bool) -> CmdResult {
    let ctx = open_context()?;
    let pedometer: Capability<Box<dyn StepSource>> = if plan.pedometer {
        Capability::Available(Box::new(SimulatedPedometer::new()))
    } else {
        Capability::unavailable("simulated device has no step counter")
    };
    let mut driver = ctx.run_driver(pedometer);
    let t0 = Utc::now();
    driver.start(t0, ctx.step_length_m())?;

    let rt = runtime()?;
    let outcome = rt.block_on(async {
        let mut main = MainLoop::new(Simulation {
            driver,
            last_at: t0,
            finished: false,
        });
        let poster = main.poster();

        tokio::spawn(async move {
            let mut gps = SimulatedGps::default().with_limit(plan.fixes);
            if let Some((from, to)) = plan.weak {
                gps = gps.with_weak_window(from..to);
            }
            let mut offset = 0;
            for i in 0..plan.fixes {
                let at = t0 + Duration::seconds((i * plan.interval_secs + offset) as i64);
                let Some(fix) = gps.next_fix(at) else {
                    break;
                };
                poster.post(move |sim: &mut Simulation| {
                    sim.driver.handle_fix(&fix);
                    sim.driver.poll_steps(fix.timestamp);
                    sim.last_at = fix.timestamp;
                });
                if plan.pause_at == Some(i) {
                    let resume_at = at + Duration::seconds(plan.pause_secs as i64);
                    poster.post(move |sim: &mut Simulation| {
                        if let Err(e) = sim.driver.pause(at) {
                            warn!(error = %e, "pause rejected");
                        }
                    });
                    poster.post(move |sim: &mut Simulation| {
                        if let Err(e) = sim.driver.resume(resume_at) {
                            warn!(error = %e, "resume rejected");
                        }
                        sim.last_at = resume_at;
                    });
                    offset += plan.pause_secs;
                }
                if plan.realtime {
                    tokio::time::sleep(std::time::Duration::from_secs(plan.interval_secs)).await;
                }
            }
            poster.post(|sim: &mut Simulation| sim.finished = true);
        });

        while !main.context().finished {
            if main.run_next().await == 0 {
                break;
            }
            for event in main.context_mut().driver.take_events() {
                print_event(&event, json)?;
            }
        }

        let mut sim = main.into_context();
        let outcome = sim.driver.stop(sim.last_at)?;
        for event in sim.driver.take_events() {
            print_event(&event, json)?;
        }
        Ok::<_, Box<dyn std::error::Error>>(outcome)
    })?;

    finish(&ctx, outcome, json)
}

fn replay(file: &Path, json: bool) -> CmdResult {
    let content = fs::read_to_string(file)?;
    let mut fixes = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fix: LocationFix =
            serde_json::from_str(line).map_err(|e| format!("{}:{}: {e}", file.display(), n + 1))?;
        fixes.push(fix);
    }
    let (Some(first), Some(last)) = (fixes.first(), fixes.last()) else {
        return Err(format!("{} has no fixes", file.display()).into());
    };
    let (start, end) = (first.timestamp, last.timestamp);

    let ctx = open_context()?;
    let mut driver = ctx.run_driver(Capability::unavailable("replayed tracks carry no step counts"));
    driver.start(start, ctx.step_length_m())?;
    for fix in &fixes {
        driver.handle_fix(fix);
    }
    let outcome = driver.stop(end)?;
    for event in driver.take_events() {
        print_event(&event, json)?;
    }
    finish(&ctx, outcome, json)
}

fn finish(ctx: &AppContext, outcome: StopOutcome, json: bool) -> CmdResult {
    if let StopOutcome::Saved(record) = outcome {
        ctx.save_run(&record)?;
        if !json {
            print_summary(&record);
        }
    }
    Ok(())
}

fn print_summary(record: &RunRecord) {
    println!();
    println!("distance  {:.2} km", record.distance_km());
    println!("time      {}", format_elapsed(record.duration));
    println!("pace      {}", format_pace(record.average_pace));
    println!("calories  {} kcal", record.calories);
    if record.steps > 0 {
        println!("steps     {}", record.steps);
    }
}

fn list(date: NaiveDate, json: bool) -> CmdResult {
    let ctx = open_context()?;
    let day = ctx.store.load_runs(date)?;
    if json {
        return print_json(&day.runs);
    }
    if day.runs.is_empty() {
        println!("no runs on {date}");
        return Ok(());
    }
    for run in &day.runs {
        println!(
            "{}  {}  {:>6.2} km  {}  {:>9}  {:>4} kcal",
            run.id,
            run.start_time.with_timezone(&Local).format("%H:%M"),
            run.distance_km(),
            format_elapsed(run.duration),
            format_pace(run.average_pace),
            run.calories,
        );
    }
    println!(
        "total: {} run(s), {:.2} km, {} kcal",
        day.runs.len(),
        day.total_distance_m() / 1000.0,
        day.total_calories()
    );
    Ok(())
}
