//! The user's body profile and derived metrics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::tracking::step_length_m;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("male"),
            Gender::Female => f.write_str("female"),
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(ValidationError::InvalidValue {
                field: "gender".into(),
                message: format!("expected male or female, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 24.0 {
            BmiCategory::Normal
        } else if bmi < 28.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

/// Persisted as `user_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    #[serde(rename = "height")]
    pub height_cm: f64,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub age: u32,
    pub gender: Gender,
    pub daily_calorie_goal: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "User".into(),
            height_cm: 170.0,
            weight_kg: 60.0,
            age: 25,
            gender: Gender::Male,
            daily_calorie_goal: 2000.0,
            created_at: None,
            updated_at: None,
        }
    }
}

impl UserProfile {
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        if height_m <= 0.0 {
            return 0.0;
        }
        self.weight_kg / (height_m * height_m)
    }

    pub fn bmi_category(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi())
    }

    /// Basal metabolic rate, revised Harris–Benedict.
    pub fn bmr(&self) -> f64 {
        let (w, h, a) = (self.weight_kg, self.height_cm, self.age as f64);
        match self.gender {
            Gender::Male => 88.362 + 13.397 * w + 4.799 * h - 5.677 * a,
            Gender::Female => 447.593 + 9.247 * w + 3.098 * h - 4.330 * a,
        }
    }

    /// Stride length for this height; `factor` is metres per centimetre.
    pub fn step_length_m(&self, factor: f64) -> f64 {
        step_length_m(self.height_cm, factor)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("height", self.height_cm, 1.0, 300.0)?;
        check_range("weight", self.weight_kg, 1.0, 500.0)?;
        check_range("age", self.age as f64, 1.0, 150.0)?;
        if !(self.daily_calorie_goal.is_finite() && self.daily_calorie_goal > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "daily_calorie_goal".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Apply a `field=value` edit, validating the result before committing.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        let mut next = self.clone();
        match field {
            "name" => next.name = value.trim().to_string(),
            "height" | "height_cm" => next.height_cm = parse_number(field, value)?,
            "weight" | "weight_kg" => next.weight_kg = parse_number(field, value)?,
            "age" => {
                next.age = value.trim().parse().map_err(|_| ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("'{value}' is not a whole number"),
                })?
            }
            "gender" => next.gender = value.parse()?,
            "goal" | "daily_calorie_goal" => next.daily_calorie_goal = parse_number(field, value)?,
            other => {
                return Err(ValidationError::InvalidValue {
                    field: other.into(),
                    message: "unknown profile field".into(),
                })
            }
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidValue {
            field: field.into(),
            message: format!("'{value}' is not a number"),
        })
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }
}
