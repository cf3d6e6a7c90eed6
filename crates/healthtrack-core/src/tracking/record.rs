//! Finalized run records as stored in the per-day runs document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in a run's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RouteSample {
    Gps {
        lat: f64,
        lon: f64,
        accuracy: f64,
        /// Cumulative distance after this fix.
        distance: f64,
        timestamp: DateTime<Utc>,
    },
    Pedometer {
        steps: u64,
        estimated_distance: f64,
        timestamp: DateTime<Utc>,
    },
}

impl RouteSample {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RouteSample::Gps { timestamp, .. } | RouteSample::Pedometer { timestamp, .. } => {
                *timestamp
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    /// Active seconds, pauses excluded.
    pub duration: f64,
    /// Meters.
    pub distance: f64,
    /// Minutes per kilometer, 0 when no distance.
    pub average_pace: f64,
    pub calories: u32,
    #[serde(default)]
    pub steps: u64,
    #[serde(default)]
    pub route: Vec<RouteSample>,
}

impl RunRecord {
    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }
}

/// Minutes per kilometer, or `None` if either input is not positive.
pub fn pace_min_per_km(elapsed_secs: f64, distance_m: f64) -> Option<f64> {
    if elapsed_secs <= 0.0 || distance_m <= 0.0 {
        return None;
    }
    Some((elapsed_secs / 60.0) / (distance_m / 1000.0))
}

/// Minutes per kilometer at a given speed, or `None` when not moving.
pub fn pace_from_speed(speed_kmh: f64) -> Option<f64> {
    (speed_kmh > 0.0).then(|| 60.0 / speed_kmh)
}

/// `m'ss"/km`.
pub fn format_pace(min_per_km: f64) -> String {
    if !min_per_km.is_finite() || min_per_km <= 0.0 {
        return "0'00\"/km".to_string();
    }
    let minutes = min_per_km.trunc() as u64;
    let seconds = ((min_per_km - min_per_km.trunc()) * 60.0) as u64;
    format!("{minutes}'{seconds:02}\"/km")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_of_five_minute_kilometer() {
        let pace = pace_min_per_km(300.0, 1000.0).unwrap();
        assert!((pace - 5.0).abs() < 1e-9);
        assert_eq!(format_pace(pace), "5'00\"/km");
        assert_eq!(format_pace(5.5), "5'30\"/km");
    }

    #[test]
    fn pace_needs_time_and_distance() {
        assert!(pace_min_per_km(0.0, 100.0).is_none());
        assert!(pace_min_per_km(100.0, 0.0).is_none());
        assert!(pace_from_speed(0.0).is_none());
        assert_eq!(format_pace(0.0), "0'00\"/km");
    }

    #[test]
    fn route_samples_are_tagged_by_source() {
        let sample = RouteSample::Pedometer {
            steps: 12,
            estimated_distance: 8.16,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["source"], "pedometer");
        assert_eq!(json["steps"], 12);
    }
}
