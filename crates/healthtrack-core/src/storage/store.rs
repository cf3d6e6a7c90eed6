//! Per-day JSON document store.
//!
//! Layout under the data directory:
//!
//! ```text
//! user_data.json
//! runs/runs_<YYYY-MM-DD>.json     {"date": ..., "runs": [...]}
//! foods/foods_<YYYY-MM-DD>.json   {"date": ..., "foods": [...], "nutrition": {...}}
//! ```
//!
//! Documents are rewritten whole on every save.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::data_dir;
use crate::error::{Result, StorageError, ValidationError};
use crate::nutrition::{DailyFoodLog, FoodRecord, NutritionTotals};
use crate::profile::UserProfile;
use crate::tracking::RunRecord;

const USER_FILE: &str = "user_data.json";
const RUNS_DIR: &str = "runs";
const FOODS_DIR: &str = "foods";
const BACKUP_PREFIX: &str = "healthtrack_backup_";

/// Files `clear` leaves alone.
const PRESERVED_ON_CLEAR: &[&str] = &["config.toml"];

/// The daily run document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl RunDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            runs: Vec::new(),
        }
    }

    pub fn total_distance_m(&self) -> f64 {
        self.runs.iter().map(|r| r.distance).sum()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.runs.iter().map(|r| r.duration).sum()
    }

    pub fn total_calories(&self) -> u64 {
        self.runs.iter().map(|r| r.calories as u64).sum()
    }
}

/// Lifetime totals across every stored day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_runs: u64,
    pub total_distance_m: f64,
    pub total_duration_secs: f64,
    pub total_calories_burned: u64,
    pub total_foods: u64,
    pub total_calories_consumed: f64,
    /// Day files that could not be read and were left out.
    pub skipped_files: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Runs,
    Foods,
    Both,
}

impl RangeKind {
    fn runs(self) -> bool {
        matches!(self, RangeKind::Runs | RangeKind::Both)
    }

    fn foods(self) -> bool {
        matches!(self, RangeKind::Foods | RangeKind::Both)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeData {
    pub dates: Vec<NaiveDate>,
    pub runs: Vec<RunRecord>,
    pub foods: Vec<FoodRecord>,
}

/// Handle to the on-disk documents.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open a store rooted at `root`, creating the layout if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { root: root.into() };
        store.ensure_layout()?;
        Ok(store)
    }

    /// Open the store in the default data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(data_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.root.join(RUNS_DIR)
    }

    pub fn foods_dir(&self) -> PathBuf {
        self.root.join(FOODS_DIR)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root.join(USER_FILE)
    }

    fn runs_path(&self, date: NaiveDate) -> PathBuf {
        self.runs_dir().join(format!("runs_{}.json", date.format("%Y-%m-%d")))
    }

    fn foods_path(&self, date: NaiveDate) -> PathBuf {
        self.foods_dir().join(format!("foods_{}.json", date.format("%Y-%m-%d")))
    }

    fn ensure_layout(&self) -> Result<()> {
        for dir in [self.root.clone(), self.runs_dir(), self.foods_dir()] {
            fs::create_dir_all(&dir).map_err(|source| StorageError::WriteFailed { path: dir, source })?;
        }
        Ok(())
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// Load the profile; a missing file yields the defaults.
    pub fn load_profile(&self) -> Result<UserProfile> {
        let mut profile = read_json::<UserProfile>(&self.profile_path())?.unwrap_or_default();
        if profile.created_at.is_none() {
            profile.created_at = Some(Utc::now());
        }
        Ok(profile)
    }

    /// Validate and save, stamping `updated_at`.
    pub fn save_profile(&self, profile: &mut UserProfile) -> Result<()> {
        profile.validate()?;
        profile.updated_at = Some(Utc::now());
        if profile.created_at.is_none() {
            profile.created_at = profile.updated_at;
        }
        write_json(&self.profile_path(), profile)
    }

    // ── Runs ─────────────────────────────────────────────────────────

    pub fn load_runs(&self, date: NaiveDate) -> Result<RunDay> {
        Ok(read_json(&self.runs_path(date))?.unwrap_or_else(|| RunDay::new(date)))
    }

    /// Append to the run's day document.
    pub fn append_run(&self, run: &RunRecord) -> Result<()> {
        let mut day = self.load_runs(run.date)?;
        day.runs.push(run.clone());
        write_json(&self.runs_path(run.date), &day)?;
        info!(run_id = %run.id, date = %run.date, distance_m = run.distance, "run saved");
        Ok(())
    }

    pub fn delete_run(&self, date: NaiveDate, id: Uuid) -> Result<RunRecord> {
        let mut day = self.load_runs(date)?;
        let index = day
            .runs
            .iter()
            .position(|r| r.id == id)
            .ok_or(ValidationError::UnknownRun(id))?;
        let removed = day.runs.remove(index);
        write_json(&self.runs_path(date), &day)?;
        Ok(removed)
    }

    // ── Foods ────────────────────────────────────────────────────────

    pub fn load_food_day(&self, date: NaiveDate) -> Result<DailyFoodLog> {
        Ok(read_json(&self.foods_path(date))?.unwrap_or_else(|| DailyFoodLog::new(date)))
    }

    /// Like [`Store::load_food_day`] but an unreadable document loads as empty.
    pub fn load_food_day_or_default(&self, date: NaiveDate) -> DailyFoodLog {
        self.load_food_day(date).unwrap_or_else(|e| {
            warn!(%date, error = %e, "food log unreadable, using empty log");
            DailyFoodLog::new(date)
        })
    }

    pub fn load_runs_or_default(&self, date: NaiveDate) -> RunDay {
        self.load_runs(date).unwrap_or_else(|e| {
            warn!(%date, error = %e, "run log unreadable, using empty log");
            RunDay::new(date)
        })
    }

    /// Save, stamping `updated_at`.
    pub fn save_food_day(&self, log: &mut DailyFoodLog) -> Result<()> {
        log.updated_at = Some(Utc::now());
        write_json(&self.foods_path(log.date), log)
    }

    pub fn today_nutrition(&self) -> Result<NutritionTotals> {
        let today = Local::now().date_naive();
        Ok(self.load_food_day(today)?.nutrition)
    }

    // ── Aggregates ───────────────────────────────────────────────────

    /// Totals over every day file. Unreadable files are skipped.
    pub fn statistics(&self) -> Result<UserStatistics> {
        let mut stats = UserStatistics::default();

        for path in day_files(&self.runs_dir(), "runs_")? {
            match read_json::<RunDay>(&path) {
                Ok(Some(day)) => {
                    stats.total_runs += day.runs.len() as u64;
                    stats.total_distance_m += day.total_distance_m();
                    stats.total_duration_secs += day.total_duration_secs();
                    stats.total_calories_burned += day.total_calories();
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping run file");
                    stats.skipped_files += 1;
                }
            }
        }

        for path in day_files(&self.foods_dir(), "foods_")? {
            match read_json::<DailyFoodLog>(&path) {
                Ok(Some(log)) => {
                    stats.total_foods += log.foods.len() as u64;
                    stats.total_calories_consumed += log.nutrition.calories;
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping food file");
                    stats.skipped_files += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Records for each day in `start..=end`. Unreadable days contribute nothing.
    pub fn date_range(&self, start: NaiveDate, end: NaiveDate, kind: RangeKind) -> Result<DateRangeData> {
        if end < start {
            return Err(ValidationError::InvalidValue {
                field: "end".into(),
                message: format!("{end} is before {start}"),
            }
            .into());
        }

        let mut data = DateRangeData::default();
        for date in start.iter_days().take_while(|d| *d <= end) {
            data.dates.push(date);
            if kind.runs() {
                data.runs.extend(self.load_runs_or_default(date).runs);
            }
            if kind.foods() {
                data.foods.extend(self.load_food_day_or_default(date).foods);
            }
        }
        Ok(data)
    }

    /// Whether `date` has at least one run or food entry.
    pub fn has_data(&self, date: NaiveDate) -> bool {
        !self.load_runs_or_default(date).runs.is_empty()
            || !self.load_food_day_or_default(date).foods.is_empty()
    }

    /// Days of the given month that have any run or food entry.
    pub fn dates_with_data(&self, year: i32, month: u32) -> Result<BTreeSet<NaiveDate>> {
        let mut candidates = BTreeSet::new();
        for (dir, prefix) in [(self.runs_dir(), "runs_"), (self.foods_dir(), "foods_")] {
            for path in day_files(&dir, prefix)? {
                if let Some(date) = date_from_file(&path, prefix) {
                    if date.year() == year && date.month() == month {
                        candidates.insert(date);
                    }
                }
            }
        }
        Ok(candidates.into_iter().filter(|d| self.has_data(*d)).collect())
    }

    // ── Maintenance ──────────────────────────────────────────────────

    /// Copy the whole data directory to `<dest>/healthtrack_backup_<YYYYmmdd_HHMMSS>`.
    pub fn backup(&self, dest: &Path) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let mut target = dest.join(format!("{BACKUP_PREFIX}{stamp}"));
        // Two backups within the same second must not merge.
        let mut n = 1;
        while target.exists() {
            target = dest.join(format!("{BACKUP_PREFIX}{stamp}_{n}"));
            n += 1;
        }
        copy_dir(&self.root, &target)?;
        info!(path = %target.display(), "backup written");
        Ok(target)
    }

    /// Replace the data directory with `backup`. The current data is first
    /// backed up next to the data directory; that path is returned.
    ///
    /// Backups stored inside the data directory survive the restore, so
    /// `backup` itself may live there.
    pub fn restore(&self, backup: &Path) -> Result<PathBuf> {
        if !backup.is_dir() {
            return Err(StorageError::ReadFailed {
                path: backup.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "backup directory not found"),
            }
            .into());
        }
        let safety_dir = self.root.parent().unwrap_or(&self.root).to_path_buf();
        let safety = self.backup(&safety_dir)?;

        self.remove_entries(is_backup)?;
        copy_dir(backup, &self.root)?;
        self.ensure_layout()?;
        info!(from = %backup.display(), safety = %safety.display(), "data restored");
        Ok(safety)
    }

    /// Delete profile, runs, foods and queued sync items.
    pub fn clear(&self) -> Result<()> {
        self.remove_entries(|name| PRESERVED_ON_CLEAR.contains(&name) || is_backup(name))?;
        self.ensure_layout()?;
        warn!(root = %self.root.display(), "all data cleared");
        Ok(())
    }

    /// Remove every top-level entry of the data directory whose name `keep`
    /// rejects.
    fn remove_entries(&self, keep: impl Fn(&str) -> bool) -> Result<()> {
        let entries = fs::read_dir(&self.root).map_err(|source| StorageError::ReadFailed {
            path: self.root.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.file_name().and_then(|n| n.to_str()).is_some_and(&keep) {
                continue;
            }
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|source| StorageError::WriteFailed { path, source })?;
        }
        Ok(())
    }
}

fn is_backup(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX)
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }
            .into())
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| {
            StorageError::Corrupt {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|source| {
        StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

fn day_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::ReadFailed {
                path: dir.to_path_buf(),
                source,
            }
            .into())
        }
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".json"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn date_from_file(path: &Path, prefix: &str) -> Option<NaiveDate> {
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem.strip_prefix(prefix)?, "%Y-%m-%d").ok()
}

/// Recursive copy that leaves out backup directories, so backups kept
/// inside the data directory are never nested into new ones.
fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).map_err(|source| StorageError::WriteFailed {
        path: to.to_path_buf(),
        source,
    })?;
    let entries = fs::read_dir(from).map_err(|source| StorageError::ReadFailed {
        path: from.to_path_buf(),
        source,
    })?;
    for entry in entries.flatten() {
        let src = entry.path();
        let dst = to.join(entry.file_name());
        if src.is_dir() {
            if entry.file_name().to_str().is_some_and(is_backup) {
                continue;
            }
            copy_dir(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).map_err(|source| StorageError::WriteFailed { path: dst, source })?;
        }
    }
    Ok(())
}
