//! GPS/pedometer run tracking.

mod arbiter;
mod distance;
mod record;
mod session;
mod timer;

pub use arbiter::{
    DistanceSource, LocationFix, SignalStatus, SourceArbiter, SourceSwitch,
    DEFAULT_WEAK_SIGNAL_ACCURACY_M,
};
pub use distance::{step_length_m, DistanceAccumulator, DEFAULT_STEP_LENGTH_FACTOR};
pub use record::{format_pace, pace_from_speed, pace_min_per_km, RouteSample, RunRecord};
pub use session::{RunState, RunTracker, StopOutcome, TrackerSettings};
pub use timer::{format_elapsed, SessionTimer};
