//! Step detection from raw accelerometer samples.
//!
//! A step is a rising sample whose magnitude exceeds the threshold, at
//! least `cooldown` after the previous step.

use chrono::{DateTime, Utc};

use super::StepSource;

const DEFAULT_THRESHOLD: f64 = 12.0;
const DEFAULT_COOLDOWN_SECS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Seconds on any monotonic clock.
    pub t: f64,
}

impl AccelSample {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone)]
pub struct StepDetector {
    threshold: f64,
    cooldown_secs: f64,
    last_magnitude: f64,
    last_step_t: Option<f64>,
    steps: u64,
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_COOLDOWN_SECS)
    }
}

impl StepDetector {
    pub fn new(threshold: f64, cooldown_secs: f64) -> Self {
        Self {
            threshold,
            cooldown_secs,
            last_magnitude: 0.0,
            last_step_t: None,
            steps: 0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn reset(&mut self) {
        self.last_magnitude = 0.0;
        self.last_step_t = None;
        self.steps = 0;
    }

    /// Feed one sample. Returns true if it registered a step.
    pub fn push(&mut self, sample: AccelSample) -> bool {
        let magnitude = sample.magnitude();
        let cooled = self
            .last_step_t
            .map_or(true, |t| sample.t - t > self.cooldown_secs);
        let is_step = magnitude > self.threshold && magnitude > self.last_magnitude && cooled;

        if is_step {
            self.steps += 1;
            self.last_step_t = Some(sample.t);
        }
        self.last_magnitude = magnitude;
        is_step
    }
}

/// Step source driven by a stream of accelerometer samples.
pub struct DetectorStepSource<I> {
    samples: I,
    detector: StepDetector,
    counting: bool,
}

impl<I: Iterator<Item = AccelSample>> DetectorStepSource<I> {
    pub fn new(samples: I) -> Self {
        Self {
            samples,
            detector: StepDetector::default(),
            counting: false,
        }
    }
}

impl<I: Iterator<Item = AccelSample> + Send> StepSource for DetectorStepSource<I> {
    fn name(&self) -> &str {
        "accelerometer"
    }

    fn start(&mut self) {
        self.detector.reset();
        self.counting = true;
    }

    fn stop(&mut self) {
        self.counting = false;
    }

    /// Consumes samples until the next step or the end of the stream.
    fn next_count(&mut self, _now: DateTime<Utc>) -> Option<u64> {
        if !self.counting {
            return None;
        }
        for sample in self.samples.by_ref() {
            if self.detector.push(sample) {
                return Some(self.detector.steps());
            }
        }
        None
    }
}
