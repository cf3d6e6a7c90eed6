//! Food records, daily logs and nutrition grading.

mod catalog;
mod food;
mod grade;
mod log;

pub use catalog::{common_foods, find_common};
pub use food::{FoodItem, FoodRecord, MealSlot, NutritionFacts};
pub use grade::{nutrition_grade, nutrition_score, Grade};
pub use log::{DailyFoodLog, NutritionTotals};
