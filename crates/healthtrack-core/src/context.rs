//! Application state handed to every front-end operation.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cloud::{credentials, CloudSync, OfflineQueue, QUEUE_FILE};
use crate::diagnostics::ErrorJournal;
use crate::error::Result;
use crate::events::Event;
use crate::foodapi::FoodApiClient;
use crate::nutrition::{DailyFoodLog, FoodRecord, NutritionTotals};
use crate::profile::UserProfile;
use crate::runner::RunDriver;
use crate::sensors::{Capability, StepSource};
use crate::storage::{data_dir, Config, Store};
use crate::summary::TodaySummary;
use crate::tracking::RunRecord;

pub struct AppContext {
    pub config: Config,
    pub store: Store,
    pub profile: UserProfile,
    pub nutrition_today: NutritionTotals,
    pub food_api: Capability<FoodApiClient>,
    pub cloud: Capability<CloudSync>,
    pub errors: ErrorJournal,
}

impl AppContext {
    /// Open everything under the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(&data_dir()?)
    }

    /// Open everything under `root`. Services that cannot be built are
    /// recorded as unavailable rather than failing the whole context.
    pub fn open(root: &Path) -> Result<Self> {
        let config = Config::load_from(&root.join("config.toml"))?;
        let store = Store::open(root)?;
        let profile = store.load_profile()?;
        let nutrition_today = store
            .load_food_day_or_default(Local::now().date_naive())
            .nutrition;

        let food_api = match FoodApiClient::new(&config.food_api) {
            Ok(client) => Capability::Available(client),
            Err(e) => {
                warn!(error = %e, "food database client unavailable");
                Capability::unavailable(e.to_string())
            }
        };

        let cloud = if config.cloud.is_configured() {
            let queue = OfflineQueue::open(root.join(QUEUE_FILE));
            match CloudSync::new(&config.cloud, queue) {
                Ok(sync) => Capability::Available(sync),
                Err(e) => Capability::unavailable(e.to_string()),
            }
        } else {
            Capability::unavailable("cloud.database_url and cloud.api_key are not set")
        };

        Ok(Self {
            config,
            store,
            profile,
            nutrition_today,
            food_api,
            cloud,
            errors: ErrorJournal::new(),
        })
    }

    pub fn root(&self) -> PathBuf {
        self.store.root().to_path_buf()
    }

    /// Attach the session stored in the OS keyring, if any.
    pub fn restore_cloud_session(&mut self) {
        let Some(cloud) = self.cloud.get_mut() else {
            return;
        };
        match credentials::load_session() {
            Ok(session) => cloud.set_session(session),
            Err(e) => {
                self.errors.handle(e.to_string(), "restore cloud session", false);
            }
        }
    }

    pub fn step_length_m(&self) -> f64 {
        self.profile.step_length_m(self.config.tracking.step_length_factor)
    }

    pub fn run_driver(&self, pedometer: Capability<Box<dyn StepSource>>) -> RunDriver {
        RunDriver::new(self.config.tracker_settings(), pedometer)
    }

    pub fn save_run(&self, run: &RunRecord) -> Result<()> {
        self.store.append_run(run)
    }

    /// Add a food to its day and refresh today's totals.
    pub fn add_food(&mut self, record: FoodRecord) -> Result<Event> {
        let mut log = self.store.load_food_day(record.date)?;
        let event = Event::FoodAdded {
            record_id: record.id,
            date: record.date,
            meal: record.meal,
            calories: record.calories,
            at: Utc::now(),
        };
        info!(name = %record.name, date = %record.date, calories = record.calories, "food added");
        log.add(record);
        self.store.save_food_day(&mut log)?;
        self.refresh_today(&log);
        Ok(event)
    }

    /// Replace a logged food, keeping its id.
    pub fn edit_food(&mut self, date: NaiveDate, id: Uuid, replacement: FoodRecord) -> Result<Event> {
        let mut log = self.store.load_food_day(date)?;
        let new_calories = replacement.calories;
        let old = log.edit(id, replacement)?;
        self.store.save_food_day(&mut log)?;
        self.refresh_today(&log);
        Ok(Event::FoodEdited {
            record_id: id,
            date,
            calories_delta: new_calories - old.calories,
            at: Utc::now(),
        })
    }

    pub fn delete_food(&mut self, date: NaiveDate, id: Uuid) -> Result<Event> {
        let mut log = self.store.load_food_day(date)?;
        let removed = log.delete(id)?;
        self.store.save_food_day(&mut log)?;
        self.refresh_today(&log);
        info!(name = %removed.name, %date, "food deleted");
        Ok(Event::FoodDeleted {
            record_id: id,
            date,
            at: Utc::now(),
        })
    }

    fn refresh_today(&mut self, log: &DailyFoodLog) {
        if log.date == Local::now().date_naive() {
            self.nutrition_today = log.nutrition;
        }
    }

    pub fn save_profile(&mut self) -> Result<()> {
        self.store.save_profile(&mut self.profile)
    }

    pub fn today_summary(&self, date: NaiveDate) -> TodaySummary {
        TodaySummary::build(&self.store, &self.profile, date)
    }
}
