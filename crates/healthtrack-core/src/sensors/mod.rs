//! Location and step-count providers.
//!
//! Platform sensors are reached through [`LocationSource`] and
//! [`StepSource`]. Whether a platform has them at all is expressed with
//! [`Capability`], so callers never probe for optional services.

mod pedometer;
mod simulated;
mod step_detector;

pub use pedometer::{calibrate_step_length, estimate_step_calories, pace_from_steps};
pub use simulated::{SimulatedGps, SimulatedPedometer};
pub use step_detector::{AccelSample, DetectorStepSource, StepDetector};

use chrono::{DateTime, Utc};

use crate::tracking::LocationFix;

/// An optional platform service.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Capability<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Capability::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Capability::Available(t) => Some(t),
            Capability::Unavailable { .. } => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Capability::Available(t) => Some(t),
            Capability::Unavailable { .. } => None,
        }
    }

    /// Reason the service is missing, if it is.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Available(_) => None,
            Capability::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(t) => Capability::Available(t),
            None => Capability::unavailable("not provided"),
        }
    }
}

/// A source of GPS fixes.
pub trait LocationSource: Send {
    fn name(&self) -> &str;

    /// Next fix at `now`, or `None` when the source has ended.
    fn next_fix(&mut self, now: DateTime<Utc>) -> Option<LocationFix>;
}

/// A step counter. Counts restart from zero on `start`.
pub trait StepSource: Send {
    fn name(&self) -> &str;

    fn start(&mut self);

    fn stop(&mut self);

    /// Steps counted since `start`, or `None` if nothing new was detected.
    fn next_count(&mut self, now: DateTime<Utc>) -> Option<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_accessors() {
        let mut cap: Capability<u32> = Capability::Available(3);
        assert!(cap.is_available());
        *cap.get_mut().unwrap() += 1;
        assert_eq!(cap.get(), Some(&4));
        assert!(cap.reason().is_none());

        let missing: Capability<u32> = None.into();
        assert!(!missing.is_available());
        assert_eq!(missing.reason(), Some("not provided"));
    }
}
