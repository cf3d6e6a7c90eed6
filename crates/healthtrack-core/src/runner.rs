//! Wires sensors to a [`RunTracker`].
//!
//! The driver owns the optional step counter and engages it only while the
//! tracker has fallen back to pedometer distance.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::events::Event;
use crate::sensors::{Capability, StepSource};
use crate::tracking::{DistanceSource, LocationFix, RunTracker, StopOutcome, TrackerSettings};
use crate::error::TrackingError;

pub struct RunDriver {
    tracker: RunTracker,
    pedometer: Capability<Box<dyn StepSource>>,
    events: Vec<Event>,
}

impl RunDriver {
    pub fn new(settings: TrackerSettings, pedometer: Capability<Box<dyn StepSource>>) -> Self {
        if let Some(reason) = pedometer.reason() {
            warn!(reason, "no step counter; weak GPS stretches will not add distance");
        }
        Self {
            tracker: RunTracker::new(settings),
            pedometer,
            events: Vec::new(),
        }
    }

    pub fn tracker(&self) -> &RunTracker {
        &self.tracker
    }

    pub fn has_pedometer(&self) -> bool {
        self.pedometer.is_available()
    }

    /// Every event emitted so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn start(&mut self, now: DateTime<Utc>, step_length_m: f64) -> Result<(), TrackingError> {
        let event = self.tracker.start(now, step_length_m)?;
        self.events.push(event);
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        let event = self.tracker.pause(now)?;
        self.events.push(event);
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        let event = self.tracker.resume(now)?;
        self.events.push(event);
        Ok(())
    }

    /// Feed a fix, starting or stopping the step counter on source switches.
    pub fn handle_fix(&mut self, fix: &LocationFix) {
        let events = self.tracker.on_fix(fix);
        for event in &events {
            if let Event::SourceSwitched { to, .. } = event {
                if let Some(pedometer) = self.pedometer.get_mut() {
                    match to {
                        DistanceSource::Pedometer => pedometer.start(),
                        DistanceSource::Gps => pedometer.stop(),
                    }
                    debug!(source = pedometer.name(), engaged = *to == DistanceSource::Pedometer, "step counter toggled");
                }
            }
        }
        self.events.extend(events);
    }

    /// Poll the step counter once. Does nothing while GPS is the source.
    pub fn poll_steps(&mut self, now: DateTime<Utc>) {
        if !self.tracker.use_pedometer() {
            return;
        }
        let Some(pedometer) = self.pedometer.get_mut() else {
            return;
        };
        if let Some(count) = pedometer.next_count(now) {
            if let Some(event) = self.tracker.on_steps(count, now) {
                self.events.push(event);
            }
        }
    }

    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<StopOutcome, TrackingError> {
        if let Some(pedometer) = self.pedometer.get_mut() {
            pedometer.stop();
        }
        let outcome = self.tracker.stop(now)?;
        let event = match &outcome {
            StopOutcome::Saved(record) => Event::RunSaved {
                run_id: record.id,
                distance_m: record.distance,
                duration_secs: record.duration,
                at: now,
            },
            StopOutcome::Discarded { distance_m } => Event::RunDiscarded {
                distance_m: *distance_m,
                min_distance_m: self.tracker.settings().min_run_distance_m,
                at: now,
            },
        };
        self.events.push(event);
        Ok(outcome)
    }
}
