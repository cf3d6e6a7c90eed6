//! Chooses between GPS and step counting for distance.
//!
//! The switch is a plain per-sample threshold with no hysteresis: a fix at
//! 20.5 m followed by one at 19.5 m flips the source twice. That can
//! oscillate near the threshold and is kept as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Default accuracy (meters) above which a fix counts as weak.
pub const DEFAULT_WEAK_SIGNAL_ACCURACY_M: f64 = 20.0;

/// Reported state of the GPS provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Good,
    Weak,
    Unavailable,
    Disabled,
    Enabled,
    Available,
    Unknown,
}

impl SignalStatus {
    pub fn from_accuracy(accuracy: f64, threshold: f64) -> Self {
        if accuracy > threshold {
            SignalStatus::Weak
        } else {
            SignalStatus::Good
        }
    }

    /// Map a platform provider callback `(kind, value)` to a status.
    ///
    /// Returns `None` for callbacks that carry no status change.
    pub fn from_provider_event(kind: &str, value: &str) -> Option<Self> {
        match (kind, value) {
            ("provider-enabled", "true") => Some(SignalStatus::Enabled),
            ("provider-enabled", "false") => Some(SignalStatus::Disabled),
            ("provider-status", "available") => Some(SignalStatus::Available),
            ("provider-status", "out-of-service") => Some(SignalStatus::Unavailable),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalStatus::Good => "good",
            SignalStatus::Weak => "weak",
            SignalStatus::Unavailable | SignalStatus::Disabled => "unavailable",
            _ => "unknown",
        }
    }
}

/// A single GPS position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    pub accuracy: f64,
    pub status: SignalStatus,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceSource {
    Gps,
    Pedometer,
}

/// Emitted when the active source changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSwitch {
    pub from: DistanceSource,
    pub to: DistanceSource,
}

/// Two-state GPS/pedometer switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceArbiter {
    threshold_m: f64,
    use_pedometer: bool,
    last_accuracy: Option<f64>,
    last_status: SignalStatus,
}

impl Default for SourceArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_WEAK_SIGNAL_ACCURACY_M)
    }
}

impl SourceArbiter {
    pub fn new(threshold_m: f64) -> Self {
        Self {
            threshold_m,
            use_pedometer: false,
            last_accuracy: None,
            last_status: SignalStatus::Unknown,
        }
    }

    pub fn use_pedometer(&self) -> bool {
        self.use_pedometer
    }

    pub fn active(&self) -> DistanceSource {
        if self.use_pedometer {
            DistanceSource::Pedometer
        } else {
            DistanceSource::Gps
        }
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    pub fn last_accuracy(&self) -> Option<f64> {
        self.last_accuracy
    }

    pub fn last_status(&self) -> SignalStatus {
        self.last_status
    }

    /// True if the fix alone would select the pedometer.
    pub fn is_weak(&self, accuracy: f64, status: SignalStatus) -> bool {
        accuracy > self.threshold_m
            || matches!(status, SignalStatus::Weak | SignalStatus::Unavailable)
    }

    /// Weak-signal test used for status display; also treats a disabled
    /// provider as weak.
    pub fn is_signal_weak(&self) -> bool {
        let weak_accuracy = self.last_accuracy.is_some_and(|a| a > self.threshold_m);
        weak_accuracy
            || matches!(
                self.last_status,
                SignalStatus::Weak | SignalStatus::Unavailable | SignalStatus::Disabled
            )
    }

    /// Feed a fix. Returns the switch if the active source changed.
    pub fn observe(&mut self, fix: &LocationFix) -> Option<SourceSwitch> {
        self.last_accuracy = Some(fix.accuracy);
        self.last_status = fix.status;

        let before = self.active();
        self.use_pedometer = self.is_weak(fix.accuracy, fix.status);
        let after = self.active();

        (before != after).then_some(SourceSwitch {
            from: before,
            to: after,
        })
    }

    pub fn reset(&mut self) {
        self.use_pedometer = false;
        self.last_accuracy = None;
        self.last_status = SignalStatus::Unknown;
    }
}
