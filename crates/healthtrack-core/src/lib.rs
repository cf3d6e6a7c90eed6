//! # HealthTrack Core Library
//!
//! Run tracking, food logging and cloud sync for the HealthTrack app. Every
//! operation is available through the `healthtrack` CLI binary; graphical
//! front-ends are thin layers over this same library.
//!
//! ## Architecture
//!
//! - **Tracking**: A wall-clock run state machine. Callers inject the current
//!   instant, feed GPS fixes and step counts, and read back [`Event`]s
//! - **Sensors**: Location and step sources behind traits, with
//!   [`Capability`] marking services a platform lacks
//! - **Storage**: Per-day JSON documents and TOML configuration
//! - **Services**: Open Food Facts lookups and Firebase sync with an offline
//!   queue
//!
//! ## Key Components
//!
//! - [`RunTracker`]: Core run state machine
//! - [`Store`]: Profile, run and food persistence
//! - [`Config`]: Application configuration management
//! - [`AppContext`]: The state a front-end operates on

pub mod cloud;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod foodapi;
pub mod geo;
pub mod history;
pub mod mainloop;
pub mod nutrition;
pub mod profile;
pub mod runner;
pub mod sensors;
pub mod storage;
pub mod summary;
pub mod tracking;

pub use cloud::{CloudSync, OfflineQueue, Session, SyncStatus};
pub use context::AppContext;
pub use diagnostics::{describe_api_error, ErrorCategory, ErrorJournal};
pub use error::{ApiError, ConfigError, CoreError, StorageError, TrackingError, ValidationError};
pub use events::Event;
pub use foodapi::FoodApiClient;
pub use geo::{haversine_m, GeoPoint};
pub use history::{DayDetail, MonthCalendar};
pub use mainloop::{MainLoop, Poster};
pub use nutrition::{DailyFoodLog, FoodItem, FoodRecord, MealSlot, NutritionFacts, NutritionTotals};
pub use profile::UserProfile;
pub use runner::RunDriver;
pub use sensors::Capability;
pub use storage::{Config, Store};
pub use summary::TodaySummary;
pub use tracking::{LocationFix, RunRecord, RunState, RunTracker, SignalStatus, StopOutcome};
