//! Built-in foods offered when no food database is reachable.

use super::food::{FoodItem, NutritionFacts};

const COMMON: &[(&str, f64, f64, f64, f64)] = &[
    ("Steamed rice", 130.0, 2.7, 28.0, 0.3),
    ("Apple", 52.0, 0.3, 14.0, 0.2),
    ("Chicken breast", 165.0, 31.0, 0.0, 3.6),
    ("Milk", 42.0, 3.4, 5.0, 1.0),
    ("Egg", 155.0, 13.0, 1.1, 11.0),
];

pub fn common_foods() -> Vec<FoodItem> {
    COMMON
        .iter()
        .map(|&(name, calories, protein, carbs, fat)| FoodItem {
            name: name.to_string(),
            brand: String::new(),
            per_100g: NutritionFacts {
                calories,
                protein,
                carbs,
                fat,
                ..Default::default()
            },
            image_url: String::new(),
            ingredients: String::new(),
            source: "builtin".to_string(),
        })
        .collect()
}

/// Case-insensitive lookup by name.
pub fn find_common(name: &str) -> Option<FoodItem> {
    let needle = name.trim().to_lowercase();
    common_foods()
        .into_iter()
        .find(|f| f.name.to_lowercase() == needle)
}
