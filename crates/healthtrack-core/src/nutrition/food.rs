use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }
}

impl Default for MealSlot {
    fn default() -> Self {
        MealSlot::Snack
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snack" => Ok(MealSlot::Snack),
            other => Err(ValidationError::InvalidValue {
                field: "meal".into(),
                message: format!("unknown meal slot '{other}'"),
            }),
        }
    }
}

/// Nutrition per 100 g as reported by a food database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
}

impl NutritionFacts {
    /// Scale by `(serving_size_g / 100) * servings`.
    pub fn scaled(&self, serving_size_g: f64, servings: f64) -> NutritionFacts {
        let m = (serving_size_g / 100.0) * servings;
        NutritionFacts {
            calories: self.calories * m,
            protein: self.protein * m,
            carbs: self.carbs * m,
            fat: self.fat * m,
            fiber: self.fiber * m,
            sugar: self.sugar * m,
            sodium: self.sodium * m,
        }
    }
}

/// A food item from a lookup, before it is logged against a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    /// Per 100 g.
    pub per_100g: NutritionFacts,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub ingredients: String,
    pub source: String,
}

/// A logged food entry. Nutrition values are already scaled by serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default = "default_serving_size")]
    pub serving_size: f64,
    #[serde(default = "default_servings")]
    pub servings: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub meal: MealSlot,
    pub date: NaiveDate,
    pub logged_at: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
}

fn default_serving_size() -> f64 {
    100.0
}

fn default_servings() -> f64 {
    1.0
}

impl FoodRecord {
    /// Build a record from per-100 g values and a serving.
    pub fn from_facts(
        name: impl Into<String>,
        brand: impl Into<String>,
        per_100g: &NutritionFacts,
        serving_size: f64,
        servings: f64,
        meal: MealSlot,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        validate_serving(serving_size, servings)?;
        let scaled = per_100g.scaled(serving_size, servings);
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            serving_size,
            servings,
            calories: scaled.calories,
            protein: scaled.protein,
            carbs: scaled.carbs,
            fat: scaled.fat,
            meal,
            date,
            logged_at: Utc::now(),
            source: "manual".into(),
        })
    }

    pub fn from_item(
        item: &FoodItem,
        serving_size: f64,
        servings: f64,
        meal: MealSlot,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let mut record = Self::from_facts(
            item.name.clone(),
            item.brand.clone(),
            &item.per_100g,
            serving_size,
            servings,
            meal,
            date,
        )?;
        record.source = item.source.clone();
        Ok(record)
    }
}

fn validate_serving(serving_size: f64, servings: f64) -> Result<(), ValidationError> {
    if !(serving_size.is_finite() && serving_size > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "serving_size".into(),
            message: "must be a positive number of grams".into(),
        });
    }
    if !(servings.is_finite() && servings > 0.0) {
        return Err(ValidationError::InvalidValue {
            field: "servings".into(),
            message: "must be positive".into(),
        });
    }
    Ok(())
}
