//! Per-day food log: the records and their running totals.

use std::collections::BTreeMap;
use std::ops::{AddAssign, SubAssign};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::food::{FoodRecord, MealSlot};
use crate::error::ValidationError;

/// Daily calories/protein/carbs/fat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl NutritionTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FoodRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals += record;
        }
        totals
    }

    /// Fraction of a calorie goal consumed, capped at 1.0.
    pub fn goal_progress(&self, goal_kcal: f64) -> f64 {
        if goal_kcal <= 0.0 {
            return 0.0;
        }
        (self.calories / goal_kcal).clamp(0.0, 1.0)
    }
}

impl AddAssign<&FoodRecord> for NutritionTotals {
    fn add_assign(&mut self, record: &FoodRecord) {
        self.calories += record.calories;
        self.protein += record.protein;
        self.carbs += record.carbs;
        self.fat += record.fat;
    }
}

impl SubAssign<&FoodRecord> for NutritionTotals {
    fn sub_assign(&mut self, record: &FoodRecord) {
        self.calories -= record.calories;
        self.protein -= record.protein;
        self.carbs -= record.carbs;
        self.fat -= record.fat;
    }
}

/// The daily document: `foods_<date>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFoodLog {
    pub date: NaiveDate,
    #[serde(default)]
    pub foods: Vec<FoodRecord>,
    #[serde(default)]
    pub nutrition: NutritionTotals,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyFoodLog {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            foods: Vec::new(),
            nutrition: NutritionTotals::default(),
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&FoodRecord> {
        self.foods.iter().find(|f| f.id == id)
    }

    pub fn add(&mut self, record: FoodRecord) {
        self.nutrition += &record;
        self.foods.push(record);
    }

    /// Replace the record with `id`, keeping its identity. Returns the old one.
    pub fn edit(&mut self, id: Uuid, mut replacement: FoodRecord) -> Result<FoodRecord, ValidationError> {
        let index = self
            .foods
            .iter()
            .position(|f| f.id == id)
            .ok_or(ValidationError::UnknownRecord(id))?;
        replacement.id = id;
        self.nutrition += &replacement;
        let old = std::mem::replace(&mut self.foods[index], replacement);
        self.nutrition -= &old;
        Ok(old)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<FoodRecord, ValidationError> {
        let index = self
            .foods
            .iter()
            .position(|f| f.id == id)
            .ok_or(ValidationError::UnknownRecord(id))?;
        let removed = self.foods.remove(index);
        self.nutrition -= &removed;
        Ok(removed)
    }

    /// Rebuild totals from the records, discarding accumulated drift.
    pub fn recompute(&mut self) {
        self.nutrition = NutritionTotals::from_records(&self.foods);
    }

    /// Records grouped by meal in breakfast/lunch/dinner/snack order.
    pub fn by_meal(&self) -> BTreeMap<MealSlot, Vec<&FoodRecord>> {
        let mut meals: BTreeMap<MealSlot, Vec<&FoodRecord>> =
            MealSlot::ALL.iter().map(|m| (*m, Vec::new())).collect();
        for food in &self.foods {
            meals.entry(food.meal).or_default().push(food);
        }
        meals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::NutritionFacts;
    use proptest::prelude::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    fn record(name: &str, kcal: f64, meal: MealSlot) -> FoodRecord {
        let facts = NutritionFacts {
            calories: kcal,
            protein: kcal / 10.0,
            carbs: kcal / 5.0,
            fat: kcal / 20.0,
            ..Default::default()
        };
        FoodRecord::from_facts(name, "", &facts, 100.0, 1.0, meal, date()).unwrap()
    }

    #[test]
    fn add_edit_delete_adjust_totals() {
        let mut log = DailyFoodLog::new(date());
        let rice = record("Rice", 130.0, MealSlot::Lunch);
        let egg = record("Egg", 155.0, MealSlot::Breakfast);
        let rice_id = rice.id;
        let egg_id = egg.id;

        log.add(rice);
        log.add(egg);
        assert!((log.nutrition.calories - 285.0).abs() < 1e-9);
        assert!((log.nutrition.protein - 28.5).abs() < 1e-9);

        let old = log.edit(rice_id, record("Rice", 260.0, MealSlot::Lunch)).unwrap();
        assert_eq!(old.calories, 130.0);
        assert!((log.nutrition.calories - 415.0).abs() < 1e-9);
        assert_eq!(log.get(rice_id).unwrap().calories, 260.0);

        log.delete(egg_id).unwrap();
        assert!((log.nutrition.calories - 260.0).abs() < 1e-9);
        assert!((log.nutrition.fat - 13.0).abs() < 1e-9);
        assert_eq!(log.foods.len(), 1);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut log = DailyFoodLog::new(date());
        let id = Uuid::new_v4();
        assert!(matches!(log.delete(id), Err(ValidationError::UnknownRecord(x)) if x == id));
        assert!(log.edit(id, record("x", 1.0, MealSlot::Snack)).is_err());
    }

    #[test]
    fn same_timestamp_records_are_still_distinct() {
        let mut log = DailyFoodLog::new(date());
        let a = record("A", 100.0, MealSlot::Snack);
        let mut b = record("B", 50.0, MealSlot::Snack);
        b.logged_at = a.logged_at;
        let b_id = b.id;
        log.add(a);
        log.add(b);

        log.delete(b_id).unwrap();
        assert_eq!(log.foods.len(), 1);
        assert_eq!(log.foods[0].name, "A");
    }

    #[test]
    fn groups_by_meal_in_order() {
        let mut log = DailyFoodLog::new(date());
        log.add(record("Soup", 80.0, MealSlot::Dinner));
        log.add(record("Toast", 90.0, MealSlot::Breakfast));
        let meals = log.by_meal();
        let order: Vec<_> = meals.keys().copied().collect();
        assert_eq!(order, MealSlot::ALL.to_vec());
        assert_eq!(meals[&MealSlot::Breakfast][0].name, "Toast");
        assert!(meals[&MealSlot::Lunch].is_empty());
    }

    #[test]
    fn goal_progress_is_capped() {
        let totals = NutritionTotals {
            calories: 2500.0,
            ..Default::default()
        };
        assert_eq!(totals.goal_progress(2000.0), 1.0);
        assert_eq!(totals.goal_progress(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn incremental_totals_match_recompute(kcals in proptest::collection::vec(0.0f64..900.0, 1..20), drop in 0usize..20) {
            let mut log = DailyFoodLog::new(date());
            let mut ids = Vec::new();
            for (i, k) in kcals.iter().enumerate() {
                let r = record(&format!("f{i}"), *k, MealSlot::Snack);
                ids.push(r.id);
                log.add(r);
            }
            let victim = ids[drop % ids.len()];
            log.delete(victim).unwrap();

            let incremental = log.nutrition;
            log.recompute();
            prop_assert!((incremental.calories - log.nutrition.calories).abs() < 1e-6);
            prop_assert!((incremental.protein - log.nutrition.protein).abs() < 1e-6);
        }
    }
}
