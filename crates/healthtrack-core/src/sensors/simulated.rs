//! Stand-in sensors for platforms without GPS or an accelerometer.

use std::ops::Range;

use chrono::{DateTime, Utc};

use super::{LocationSource, StepSource};
use crate::tracking::{LocationFix, SignalStatus};

const DEFAULT_BASE: (f64, f64) = (39.9042, 116.4074);
const RADIUS_DEG: f64 = 0.001;
const ANGLE_STEP_RAD: f64 = 0.1;
const GOOD_ACCURACY_M: f64 = 5.0;
const WEAK_ACCURACY_M: f64 = 35.0;

/// Walks a small circle around a base coordinate.
#[derive(Debug, Clone)]
pub struct SimulatedGps {
    base_lat: f64,
    base_lon: f64,
    step: u64,
    limit: Option<u64>,
    weak_windows: Vec<Range<u64>>,
}

impl Default for SimulatedGps {
    fn default() -> Self {
        Self::new(DEFAULT_BASE.0, DEFAULT_BASE.1)
    }
}

impl SimulatedGps {
    pub fn new(base_lat: f64, base_lon: f64) -> Self {
        Self {
            base_lat,
            base_lon,
            step: 0,
            limit: None,
            weak_windows: Vec::new(),
        }
    }

    /// Stop after `fixes` fixes.
    pub fn with_limit(mut self, fixes: u64) -> Self {
        self.limit = Some(fixes);
        self
    }

    /// Report weak accuracy for fix indices in `window`.
    pub fn with_weak_window(mut self, window: Range<u64>) -> Self {
        self.weak_windows.push(window);
        self
    }

    fn is_weak(&self, index: u64) -> bool {
        self.weak_windows.iter().any(|w| w.contains(&index))
    }
}

impl LocationSource for SimulatedGps {
    fn name(&self) -> &str {
        "simulated-gps"
    }

    fn next_fix(&mut self, now: DateTime<Utc>) -> Option<LocationFix> {
        if self.limit.is_some_and(|limit| self.step >= limit) {
            return None;
        }
        let index = self.step;
        self.step += 1;

        let angle = index as f64 * ANGLE_STEP_RAD;
        let (accuracy, status) = if self.is_weak(index) {
            (WEAK_ACCURACY_M, SignalStatus::Weak)
        } else {
            (GOOD_ACCURACY_M, SignalStatus::Good)
        };
        Some(LocationFix {
            latitude: self.base_lat + RADIUS_DEG * angle.sin(),
            longitude: self.base_lon + RADIUS_DEG * angle.cos(),
            altitude: 50.0,
            accuracy,
            status,
            timestamp: now,
        })
    }
}

/// Counts one step per poll while started.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPedometer {
    counting: bool,
    steps: u64,
    steps_per_poll: u64,
}

impl SimulatedPedometer {
    pub fn new() -> Self {
        Self::with_rate(1)
    }

    pub fn with_rate(steps_per_poll: u64) -> Self {
        Self {
            counting: false,
            steps: 0,
            steps_per_poll,
        }
    }
}

impl StepSource for SimulatedPedometer {
    fn name(&self) -> &str {
        "simulated-pedometer"
    }

    fn start(&mut self) {
        self.counting = true;
        self.steps = 0;
    }

    fn stop(&mut self) {
        self.counting = false;
    }

    fn next_count(&mut self, _now: DateTime<Utc>) -> Option<u64> {
        if !self.counting {
            return None;
        }
        self.steps += self.steps_per_poll;
        Some(self.steps)
    }
}
