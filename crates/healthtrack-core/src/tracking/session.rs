//! Run session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = RunTracker::new(TrackerSettings::default());
//! tracker.start(Utc::now(), profile.step_length_m(config.tracking.step_length_factor))?;
//! // From the location callback:
//! tracker.on_fix(&fix);
//! // From the step counter callback:
//! tracker.on_steps(steps, Utc::now());
//! let outcome = tracker.stop(Utc::now())?;
//! ```
//!
//! Nothing is persisted until `stop`; an interrupted session is lost.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::arbiter::{DistanceSource, LocationFix, SignalStatus, SourceArbiter};
use super::distance::DistanceAccumulator;
use super::record::{pace_from_speed, pace_min_per_km, RouteSample, RunRecord};
use super::timer::SessionTimer;
use crate::error::TrackingError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

/// Tunables for a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerSettings {
    pub weak_signal_accuracy_m: f64,
    pub min_run_distance_m: f64,
    pub calories_per_meter: f64,
    pub fix_interval_secs: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            weak_signal_accuracy_m: super::arbiter::DEFAULT_WEAK_SIGNAL_ACCURACY_M,
            min_run_distance_m: 100.0,
            calories_per_meter: 0.05,
            fix_interval_secs: 2.0,
        }
    }
}

/// Result of stopping a run.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Saved(RunRecord),
    /// Shorter than the minimum distance.
    Discarded { distance_m: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTracker {
    settings: TrackerSettings,
    state: RunState,
    timer: SessionTimer,
    arbiter: SourceArbiter,
    distance: DistanceAccumulator,
    steps: u64,
    route: Vec<RouteSample>,
}

impl RunTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            settings,
            state: RunState::Idle,
            timer: SessionTimer::new(),
            arbiter: SourceArbiter::new(settings.weak_signal_accuracy_m),
            distance: DistanceAccumulator::new(0.0, settings.fix_interval_secs),
            steps: 0,
            route: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn distance_m(&self) -> f64 {
        self.distance.total_m()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn active_source(&self) -> DistanceSource {
        self.arbiter.active()
    }

    pub fn use_pedometer(&self) -> bool {
        self.arbiter.use_pedometer()
    }

    pub fn arbiter(&self) -> &SourceArbiter {
        &self.arbiter
    }

    pub fn route(&self) -> &[RouteSample] {
        &self.route
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        self.timer.elapsed_secs(now)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let elapsed = self.elapsed_secs(now);
        Event::RunSnapshot {
            state: self.state,
            elapsed_secs: elapsed,
            distance_m: self.distance.total_m(),
            steps: self.steps,
            source: self.arbiter.active(),
            average_pace_min_per_km: pace_min_per_km(elapsed, self.distance.total_m()),
            current_pace_min_per_km: pace_from_speed(self.distance.current_speed_kmh()),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>, step_length_m: f64) -> Result<Event, TrackingError> {
        if self.state != RunState::Idle {
            return Err(TrackingError::AlreadyRunning);
        }
        self.timer.start(now);
        self.arbiter.reset();
        self.distance = DistanceAccumulator::new(step_length_m, self.settings.fix_interval_secs);
        self.steps = 0;
        self.route.clear();
        self.state = RunState::Running;
        info!(step_length_m, "run started");
        Ok(Event::RunStarted {
            step_length_m,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Event, TrackingError> {
        match self.state {
            RunState::Running => {
                self.timer.pause(now);
                self.state = RunState::Paused;
                Ok(Event::RunPaused {
                    elapsed_secs: self.timer.elapsed_secs(now),
                    distance_m: self.distance.total_m(),
                    at: now,
                })
            }
            RunState::Paused => Err(TrackingError::AlreadyPaused),
            RunState::Idle => Err(TrackingError::NotRunning),
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Event, TrackingError> {
        match self.state {
            RunState::Paused => {
                let before = self.timer.paused_total();
                self.timer.resume(now);
                self.state = RunState::Running;
                let paused = self.timer.paused_total() - before;
                Ok(Event::RunResumed {
                    paused_secs: paused.num_milliseconds() as f64 / 1000.0,
                    at: now,
                })
            }
            RunState::Running => Err(TrackingError::NotPaused),
            RunState::Idle => Err(TrackingError::NotRunning),
        }
    }

    /// Location callback. Ignored unless running.
    pub fn on_fix(&mut self, fix: &LocationFix) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != RunState::Running {
            return events;
        }

        if let Some(switch) = self.arbiter.observe(fix) {
            info!(from = ?switch.from, to = ?switch.to, accuracy = fix.accuracy, "distance source switched");
            if switch.to == DistanceSource::Pedometer {
                // The step counter restarts from zero each time it is engaged.
                self.steps = 0;
            }
            events.push(Event::SourceSwitched {
                from: switch.from,
                to: switch.to,
                accuracy: fix.accuracy,
                status: fix.status,
                at: fix.timestamp,
            });
        }

        if !self.arbiter.use_pedometer() {
            let leg = self.distance.add_fix(fix.point(), fix.timestamp);
            let total = self.distance.total_m();
            self.route.push(RouteSample::Gps {
                lat: fix.latitude,
                lon: fix.longitude,
                accuracy: fix.accuracy,
                distance: total,
                timestamp: fix.timestamp,
            });
            debug!(leg, total, "fix accepted");
            events.push(Event::FixAccepted {
                leg_m: leg,
                distance_m: total,
                accuracy: fix.accuracy,
                at: fix.timestamp,
            });
        }
        events
    }

    /// Step counter callback. Ignored unless running on the pedometer.
    pub fn on_steps(&mut self, steps: u64, now: DateTime<Utc>) -> Option<Event> {
        if self.state != RunState::Running || !self.arbiter.use_pedometer() {
            return None;
        }
        self.steps = steps;
        let total = self.distance.set_steps(steps);
        self.route.push(RouteSample::Pedometer {
            steps,
            estimated_distance: total,
            timestamp: now,
        });
        Some(Event::StepsUpdated {
            steps,
            distance_m: total,
            at: now,
        })
    }

    /// Finalize the session and return to idle.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<StopOutcome, TrackingError> {
        if self.state == RunState::Idle {
            return Err(TrackingError::NotRunning);
        }
        let start = self.timer.started_at().ok_or(TrackingError::NotRunning)?;
        let distance = self.distance.total_m();
        let duration = self.timer.elapsed_secs(now);

        let outcome = if distance < self.settings.min_run_distance_m {
            info!(distance, "run below minimum distance, discarded");
            StopOutcome::Discarded {
                distance_m: distance,
            }
        } else {
            StopOutcome::Saved(RunRecord {
                id: Uuid::new_v4(),
                date: start.with_timezone(&Local).date_naive(),
                start_time: start,
                duration,
                distance,
                average_pace: pace_min_per_km(duration, distance).unwrap_or(0.0),
                calories: (distance * self.settings.calories_per_meter).floor() as u32,
                steps: self.steps,
                route: std::mem::take(&mut self.route),
            })
        };

        self.reset();
        Ok(outcome)
    }

    fn reset(&mut self) {
        self.state = RunState::Idle;
        self.timer.reset();
        self.arbiter.reset();
        self.distance.reset();
        self.steps = 0;
        self.route.clear();
    }

    /// Signal status of the most recent fix.
    pub fn signal_status(&self) -> SignalStatus {
        self.arbiter.last_status()
    }
}
