//! Active-time clock for a run.
//!
//! Like the rest of the tracker this is wall-clock based with no internal
//! thread; callers pass the current instant into every operation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTimer {
    started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    /// Accumulated paused time in milliseconds.
    paused_ms: i64,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn paused_total(&self) -> Duration {
        Duration::milliseconds(self.paused_ms)
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.paused_at = None;
        self.paused_ms = 0;
    }

    /// Returns false if not started or already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.started_at.is_none() || self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// Returns false if not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        match self.paused_at.take() {
            Some(since) => {
                self.paused_ms += (now - since).num_milliseconds().max(0);
                true
            }
            None => false,
        }
    }

    /// `(now - start) - paused`, frozen while paused.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let Some(start) = self.started_at else {
            return Duration::zero();
        };
        let end = self.paused_at.unwrap_or(now);
        let active = (end - start).num_milliseconds() - self.paused_ms;
        Duration::milliseconds(active.max(0))
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> f64 {
        self.elapsed(now).num_milliseconds() as f64 / 1000.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `HH:MM:SS` for a number of seconds.
pub fn format_elapsed(total_secs: f64) -> String {
    let secs = total_secs.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
