//! Step-count arithmetic shared by the pedometer fallback.

use tracing::info;

/// Plausible step length bounds in meters.
const MIN_STEP_LENGTH_M: f64 = 0.4;
const MAX_STEP_LENGTH_M: f64 = 1.0;

/// Calories per step for a 60 kg runner.
const CALORIES_PER_STEP: f64 = 0.045;

/// Step length from a known distance. `None` if the result is implausible.
pub fn calibrate_step_length(actual_distance_m: f64, steps: u64) -> Option<f64> {
    if steps == 0 {
        return None;
    }
    let length = actual_distance_m / steps as f64;
    if (MIN_STEP_LENGTH_M..=MAX_STEP_LENGTH_M).contains(&length) {
        info!(step_length_m = length, "step length calibrated");
        Some(length)
    } else {
        None
    }
}

/// Calories burned over `steps`, scaled by body weight.
pub fn estimate_step_calories(steps: u64, weight_kg: f64) -> f64 {
    steps as f64 * CALORIES_PER_STEP * (weight_kg / 60.0)
}

/// Minutes per kilometer from a step count.
pub fn pace_from_steps(steps: u64, elapsed_secs: f64, step_length_m: f64) -> Option<f64> {
    if steps == 0 || elapsed_secs <= 0.0 {
        return None;
    }
    let distance_km = steps as f64 * step_length_m / 1000.0;
    let speed_kmh = distance_km / (elapsed_secs / 3600.0);
    (speed_kmh > 0.0).then(|| 60.0 / speed_kmh)
}
