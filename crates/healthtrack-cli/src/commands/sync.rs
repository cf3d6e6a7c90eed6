//! Cloud sync subcommands.
//!
//! Every command except `login`, `register` and `logout` restores the session
//! saved in the OS keyring and checks connectivity first. Writes made while
//! offline land in the offline queue and are reported as `SyncQueued`.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use healthtrack_core::cloud::{credentials, CloudSync, SyncOutcome};
use healthtrack_core::{AppContext, Event};

use super::{api_failure, date_or_today, open_context, print_event, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum SyncAction {
    /// Sign in and remember the session
    Login {
        email: String,
        /// Password (falls back to HEALTHTRACK_PASSWORD)
        #[arg(long, env = "HEALTHTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        email: String,
        /// Password (falls back to HEALTHTRACK_PASSWORD)
        #[arg(long, env = "HEALTHTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show connectivity, session and queue state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload the profile and one day's runs and foods
    Push {
        /// Day to upload (default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Download the profile and one day's runs and foods
    Pull {
        /// Day to download (default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Send everything in the offline queue now
    Replay,
    /// Forget the session and drop queued writes
    Logout,
    /// Keep checking connectivity and replay the queue when it returns
    Watch {
        /// Seconds between checks (default from config)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many checks
        #[arg(long)]
        rounds: Option<usize>,
    },
}

fn cloud(ctx: &mut AppContext) -> Result<&mut CloudSync, Box<dyn std::error::Error>> {
    if let Some(reason) = ctx.cloud.reason() {
        return Err(format!("cloud sync unavailable: {reason}").into());
    }
    ctx.cloud
        .get_mut()
        .ok_or_else(|| "cloud sync unavailable".into())
}

fn report(kind: &str, outcome: SyncOutcome, queued: usize) -> CmdResult {
    match outcome {
        SyncOutcome::Synced => println!("{kind}: synced"),
        SyncOutcome::Queued => print_event(
            &Event::SyncQueued {
                kind: kind.to_string(),
                queued,
                at: Utc::now(),
            },
            false,
        )?,
    }
    Ok(())
}

pub fn run(action: SyncAction) -> CmdResult {
    let mut ctx = open_context()?;
    let rt = runtime()?;

    match action {
        SyncAction::Login { email, password } => {
            let sync = cloud(&mut ctx)?;
            let session = rt.block_on(sync.sign_in(&email, &password)).map_err(api_failure("Sign-in"))?;
            credentials::save_session(&session)?;
            println!("signed in as {}", session.email.as_deref().unwrap_or(&session.user_id));
        }
        SyncAction::Register { email, password } => {
            let sync = cloud(&mut ctx)?;
            let session = rt.block_on(sync.register(&email, &password)).map_err(api_failure("Registration"))?;
            credentials::save_session(&session)?;
            println!("registered and signed in as {email}");
        }
        SyncAction::Logout => {
            let sync = cloud(&mut ctx)?;
            sync.logout()?;
            credentials::delete_session()?;
            println!("signed out");
        }
        SyncAction::Status { json } => {
            ctx.restore_cloud_session();
            let sync = cloud(&mut ctx)?;
            rt.block_on(sync.check_connection());
            let status = sync.status();
            if json {
                return print_json(&status);
            }
            println!("online         {}", status.online);
            println!("signed in      {}", status.user_id.as_deref().unwrap_or("no"));
            println!("queued writes  {}", status.queued);
        }
        SyncAction::Push { date } => {
            let date = date_or_today(date);
            ctx.restore_cloud_session();
            let profile = ctx.profile.clone();
            let runs = ctx.store.load_runs(date)?;
            let mut foods = ctx.store.load_food_day(date)?;
            foods.recompute();
            let sync = cloud(&mut ctx)?;
            rt.block_on(async {
                sync.check_connection().await;
                let outcome = sync.push_profile(&profile).await.map_err(api_failure("Profile upload"))?;
                report("user_data", outcome, sync.queue().len())?;
                for run in &runs.runs {
                    let outcome = sync.push_run(run).await.map_err(api_failure("Run upload"))?;
                    report("run_data", outcome, sync.queue().len())?;
                }
                if !foods.is_empty() {
                    let outcome = sync.push_food_day(&foods).await.map_err(api_failure("Food upload"))?;
                    report("food_data", outcome, sync.queue().len())?;
                }
                Ok::<_, Box<dyn std::error::Error>>(())
            })?;
        }
        SyncAction::Pull { date } => {
            let date = date_or_today(date);
            ctx.restore_cloud_session();
            let sync = cloud(&mut ctx)?;
            let (profile, runs, foods) = rt.block_on(async {
                if !sync.check_connection().await {
                    return Err::<_, Box<dyn std::error::Error>>("offline: nothing pulled".into());
                }
                if !sync.is_authenticated() {
                    return Err("not signed in; run `healthtrack sync login` first".into());
                }
                Ok((
                    sync.fetch_profile().await.map_err(api_failure("Profile download"))?,
                    sync.fetch_runs(date).await.map_err(api_failure("Run download"))?,
                    sync.fetch_food_day(date).await.map_err(api_failure("Food download"))?,
                ))
            })?;
            if let Some(profile) = profile {
                ctx.profile = profile;
                ctx.save_profile()?;
                println!("profile updated");
            }
            if let Some(day) = runs {
                let local = ctx.store.load_runs(date)?;
                let mut added = 0;
                for run in day.runs {
                    if !local.runs.iter().any(|r| r.id == run.id) {
                        ctx.save_run(&run)?;
                        added += 1;
                    }
                }
                println!("{added} run(s) added for {date}");
            }
            if let Some(mut log) = foods {
                log.date = date;
                log.recompute();
                ctx.store.save_food_day(&mut log)?;
                println!("{} food(s) restored for {date}", log.foods.len());
            }
        }
        SyncAction::Replay => {
            ctx.restore_cloud_session();
            let sync = cloud(&mut ctx)?;
            let replayed = rt.block_on(async {
                sync.check_connection().await;
                sync.replay_queue().await
            })
            .map_err(api_failure("Queue replay"))?;
            print_event(
                &Event::SyncReplayed {
                    succeeded: replayed.succeeded,
                    remaining: replayed.remaining,
                    at: Utc::now(),
                },
                false,
            )?;
        }
        SyncAction::Watch { interval, rounds } => {
            let secs = interval.unwrap_or(ctx.config.cloud.auto_sync_interval_secs).max(1);
            ctx.restore_cloud_session();
            let sync = cloud(&mut ctx)?;
            let replayed = rt.block_on(sync.auto_sync(Duration::from_secs(secs), rounds));
            print_event(
                &Event::SyncReplayed {
                    succeeded: replayed.succeeded,
                    remaining: replayed.remaining,
                    at: Utc::now(),
                },
                false,
            )?;
        }
    }
    Ok(())
}
