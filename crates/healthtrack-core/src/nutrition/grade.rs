//! Simplified A–E nutrition grade from per-100 g values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::food::NutritionFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        };
        f.write_str(s)
    }
}

/// 0–3 points for each band a value exceeds.
fn band_points(value: f64, bands: [f64; 3]) -> u32 {
    bands.iter().filter(|b| value > **b).count() as u32
}

/// Sum of calorie, fat, sugar and sodium points (0–12).
pub fn nutrition_score(facts: &NutritionFacts) -> u32 {
    band_points(facts.calories, [100.0, 200.0, 400.0])
        + band_points(facts.fat, [5.0, 10.0, 20.0])
        + band_points(facts.sugar, [5.0, 10.0, 20.0])
        + band_points(facts.sodium, [120.0, 300.0, 600.0])
}

pub fn nutrition_grade(facts: &NutritionFacts) -> Grade {
    match nutrition_score(facts) {
        0..=2 => Grade::A,
        3..=5 => Grade::B,
        6..=8 => Grade::C,
        9..=11 => Grade::D,
        _ => Grade::E,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lean_food_grades_a() {
        let apple = NutritionFacts {
            calories: 52.0,
            sugar: 10.0,
            ..Default::default()
        };
        // sugar 10 is not > 10
        assert_eq!(nutrition_score(&apple), 1);
        assert_eq!(nutrition_grade(&apple), Grade::A);
    }

    #[test]
    fn bands_are_exclusive_at_the_edge() {
        let facts = NutritionFacts {
            calories: 400.0,
            fat: 20.0,
            sugar: 20.0,
            sodium: 600.0,
            ..Default::default()
        };
        assert_eq!(nutrition_score(&facts), 8);
        assert_eq!(nutrition_grade(&facts), Grade::C);
    }

    #[test]
    fn everything_high_grades_e() {
        let facts = NutritionFacts {
            calories: 550.0,
            fat: 30.0,
            sugar: 45.0,
            sodium: 900.0,
            ..Default::default()
        };
        assert_eq!(nutrition_score(&facts), 12);
        assert_eq!(nutrition_grade(&facts), Grade::E);
        assert_eq!(Grade::E.to_string(), "E");
    }

    #[test]
    fn mid_scores_map_to_b_and_d() {
        let b = NutritionFacts {
            calories: 250.0,
            fat: 12.0,
            ..Default::default()
        };
        assert_eq!(nutrition_grade(&b), Grade::B);

        let d = NutritionFacts {
            calories: 450.0,
            fat: 25.0,
            sugar: 15.0,
            sodium: 150.0,
            ..Default::default()
        };
        assert_eq!(nutrition_score(&d), 9);
        assert_eq!(nutrition_grade(&d), Grade::D);
    }
}
