use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::nutrition::MealSlot;
use crate::tracking::{DistanceSource, RunState, SignalStatus};

/// Every state change in the system produces an Event.
/// Front-ends render them; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RunStarted {
        step_length_m: f64,
        at: DateTime<Utc>,
    },
    RunPaused {
        elapsed_secs: f64,
        distance_m: f64,
        at: DateTime<Utc>,
    },
    RunResumed {
        paused_secs: f64,
        at: DateTime<Utc>,
    },
    /// GPS fix accepted into the distance total.
    FixAccepted {
        leg_m: f64,
        distance_m: f64,
        accuracy: f64,
        at: DateTime<Utc>,
    },
    /// Active distance source changed.
    SourceSwitched {
        from: DistanceSource,
        to: DistanceSource,
        accuracy: f64,
        status: SignalStatus,
        at: DateTime<Utc>,
    },
    StepsUpdated {
        steps: u64,
        distance_m: f64,
        at: DateTime<Utc>,
    },
    RunSaved {
        run_id: Uuid,
        distance_m: f64,
        duration_secs: f64,
        at: DateTime<Utc>,
    },
    /// Stopped below the minimum distance; nothing persisted.
    RunDiscarded {
        distance_m: f64,
        min_distance_m: f64,
        at: DateTime<Utc>,
    },
    RunSnapshot {
        state: RunState,
        elapsed_secs: f64,
        distance_m: f64,
        steps: u64,
        source: DistanceSource,
        average_pace_min_per_km: Option<f64>,
        current_pace_min_per_km: Option<f64>,
        at: DateTime<Utc>,
    },
    FoodAdded {
        record_id: Uuid,
        date: NaiveDate,
        meal: MealSlot,
        calories: f64,
        at: DateTime<Utc>,
    },
    FoodEdited {
        record_id: Uuid,
        date: NaiveDate,
        calories_delta: f64,
        at: DateTime<Utc>,
    },
    FoodDeleted {
        record_id: Uuid,
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// Cloud write deferred to the offline queue.
    SyncQueued {
        kind: String,
        queued: usize,
        at: DateTime<Utc>,
    },
    SyncReplayed {
        succeeded: usize,
        remaining: usize,
        at: DateTime<Utc>,
    },
}
