//! The "today" dashboard.
//!
//! Foods and runs are resolved independently: when the requested day has no
//! entries of a kind, the previous day is shown for that kind instead, and
//! the summary says which day each half describes.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nutrition::{DailyFoodLog, NutritionTotals};
use crate::profile::UserProfile;
use crate::storage::{RunDay, Store};

/// Daily macro targets in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroGoals {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Default for MacroGoals {
    fn default() -> Self {
        Self {
            protein_g: 60.0,
            carbs_g: 250.0,
            fat_g: 65.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySummary {
    pub requested: NaiveDate,
    /// Day the nutrition figures come from.
    pub food_date: NaiveDate,
    /// Day the exercise figures come from.
    pub run_date: NaiveDate,
    pub nutrition: NutritionTotals,
    pub food_count: usize,
    pub calorie_goal: f64,
    pub macro_goals: MacroGoals,
    pub run_count: usize,
    pub distance_m: f64,
    pub duration_secs: f64,
    pub calories_burned: u64,
}

impl TodaySummary {
    pub fn build(store: &Store, profile: &UserProfile, date: NaiveDate) -> Self {
        let (food_date, foods) = pick_day(date, |d| store.load_food_day_or_default(d), DailyFoodLog::is_empty);
        let (run_date, runs) = pick_day(date, |d| store.load_runs_or_default(d), |r: &RunDay| r.runs.is_empty());

        Self {
            requested: date,
            food_date,
            run_date,
            nutrition: NutritionTotals::from_records(&foods.foods),
            food_count: foods.foods.len(),
            calorie_goal: profile.daily_calorie_goal,
            macro_goals: MacroGoals::default(),
            run_count: runs.runs.len(),
            distance_m: runs.total_distance_m(),
            duration_secs: runs.total_duration_secs(),
            calories_burned: runs.total_calories(),
        }
    }

    pub fn calorie_progress(&self) -> f64 {
        self.nutrition.goal_progress(self.calorie_goal)
    }

    /// Percent of each macro goal, capped at 100.
    pub fn macro_percent(&self) -> (f64, f64, f64) {
        let pct = |v: f64, goal: f64| if goal > 0.0 { (v / goal * 100.0).min(100.0) } else { 0.0 };
        (
            pct(self.nutrition.protein, self.macro_goals.protein_g),
            pct(self.nutrition.carbs, self.macro_goals.carbs_g),
            pct(self.nutrition.fat, self.macro_goals.fat_g),
        )
    }

    pub fn net_calories(&self) -> f64 {
        self.nutrition.calories - self.calories_burned as f64
    }

    /// `1h5m` or `12m`.
    pub fn duration_label(&self) -> String {
        format_duration_short(self.duration_secs)
    }
}

fn pick_day<T>(
    date: NaiveDate,
    load: impl Fn(NaiveDate) -> T,
    is_empty: impl Fn(&T) -> bool,
) -> (NaiveDate, T) {
    let doc = load(date);
    if !is_empty(&doc) {
        return (date, doc);
    }
    let previous = date - Duration::days(1);
    let fallback = load(previous);
    if is_empty(&fallback) {
        (date, doc)
    } else {
        debug!(%date, %previous, "no entries for day, showing previous day");
        (previous, fallback)
    }
}

pub fn format_duration_short(total_secs: f64) -> String {
    let secs = total_secs.max(0.0) as u64;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{hours}h{minutes}m")
    } else {
        format!("{minutes}m")
    }
}
