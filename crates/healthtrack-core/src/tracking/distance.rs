//! Running distance total fed by GPS fixes and pedometer counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{haversine_m, GeoPoint};

/// Step length as a fraction of height in centimeters (yields meters).
pub const DEFAULT_STEP_LENGTH_FACTOR: f64 = 0.004;

/// Step length in meters for a height in centimeters.
pub fn step_length_m(height_cm: f64, factor: f64) -> f64 {
    height_cm * factor
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceAccumulator {
    total_m: f64,
    step_length_m: f64,
    /// Interval assumed between fixes when timestamps coincide.
    fallback_interval_secs: f64,
    last_fix: Option<(GeoPoint, DateTime<Utc>)>,
    current_speed_kmh: f64,
}

impl DistanceAccumulator {
    pub fn new(step_length_m: f64, fallback_interval_secs: f64) -> Self {
        Self {
            total_m: 0.0,
            step_length_m,
            fallback_interval_secs,
            last_fix: None,
            current_speed_kmh: 0.0,
        }
    }

    pub fn total_m(&self) -> f64 {
        self.total_m
    }

    pub fn step_length_m(&self) -> f64 {
        self.step_length_m
    }

    pub fn current_speed_kmh(&self) -> f64 {
        self.current_speed_kmh
    }

    /// Add the leg from the previous accepted fix. Returns the leg length.
    pub fn add_fix(&mut self, point: GeoPoint, at: DateTime<Utc>) -> f64 {
        let leg = match self.last_fix {
            Some((prev, prev_at)) => {
                let leg = haversine_m(prev, point);
                let mut secs = (at - prev_at).num_milliseconds() as f64 / 1000.0;
                if secs <= 0.0 {
                    secs = self.fallback_interval_secs;
                }
                if secs > 0.0 {
                    self.current_speed_kmh = (leg / 1000.0) / (secs / 3600.0);
                }
                leg
            }
            None => 0.0,
        };
        self.total_m += leg;
        self.last_fix = Some((point, at));
        leg
    }

    /// Replace the total with the step-based estimate. Returns the new total.
    pub fn set_steps(&mut self, steps: u64) -> f64 {
        self.total_m = steps as f64 * self.step_length_m;
        self.total_m
    }

    pub fn reset(&mut self) {
        self.total_m = 0.0;
        self.last_fix = None;
        self.current_speed_kmh = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn first_fix_adds_nothing() {
        let mut acc = DistanceAccumulator::new(0.68, 2.0);
        assert_eq!(acc.add_fix(GeoPoint::new(1.0, 1.0), Utc::now()), 0.0);
        assert_eq!(acc.total_m(), 0.0);
    }

    #[test]
    fn steps_replace_rather_than_add() {
        let mut acc = DistanceAccumulator::new(step_length_m(170.0, DEFAULT_STEP_LENGTH_FACTOR), 2.0);
        let t0 = Utc::now();
        acc.add_fix(GeoPoint::new(0.0, 0.0), t0);
        acc.add_fix(GeoPoint::new(0.0, 0.01), t0 + Duration::seconds(2));
        assert!(acc.total_m() > 1000.0);

        let total = acc.set_steps(100);
        assert!((total - 68.0).abs() < 1e-9);
        assert!((acc.total_m() - 68.0).abs() < 1e-9);
    }

    #[test]
    fn speed_uses_real_interval() {
        let mut acc = DistanceAccumulator::new(0.7, 2.0);
        let t0 = Utc::now();
        acc.add_fix(GeoPoint::new(0.0, 0.0), t0);
        let leg = acc.add_fix(GeoPoint::new(0.0, 0.001), t0 + Duration::seconds(10));
        let expected = (leg / 1000.0) / (10.0 / 3600.0);
        assert!((acc.current_speed_kmh() - expected).abs() < 1e-9);
    }

    #[test]
    fn coincident_timestamps_fall_back_to_interval() {
        let mut acc = DistanceAccumulator::new(0.7, 2.0);
        let t0 = Utc::now();
        acc.add_fix(GeoPoint::new(0.0, 0.0), t0);
        let leg = acc.add_fix(GeoPoint::new(0.0, 0.001), t0);
        let expected = (leg / 1000.0) / (2.0 / 3600.0);
        assert!((acc.current_speed_kmh() - expected).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_pairwise_legs(
            coords in proptest::collection::vec((-60.0f64..60.0, -170.0f64..170.0), 0..40)
        ) {
            let points: Vec<GeoPoint> = coords.iter().map(|&(la, lo)| GeoPoint::new(la, lo)).collect();
            let mut acc = DistanceAccumulator::new(0.7, 2.0);
            let t0 = Utc::now();
            for (i, p) in points.iter().enumerate() {
                acc.add_fix(*p, t0 + Duration::seconds(i as i64 * 2));
            }
            let expected = crate::geo::path_length_m(&points);
            prop_assert!((acc.total_m() - expected).abs() <= 1e-6 * expected.max(1.0));
        }
    }
}
