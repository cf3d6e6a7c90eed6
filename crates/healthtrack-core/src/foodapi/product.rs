//! Open Food Facts product JSON to [`FoodItem`].

use serde_json::Value;

use crate::nutrition::{FoodItem, NutritionFacts};

pub const SOURCE: &str = "openfoodfacts";

/// Fields requested from the search endpoint.
pub const SEARCH_FIELDS: &str = "product_name,generic_name,brands,nutriments,image_front_url,ingredients_text";

pub fn parse_product(product: &Value) -> FoodItem {
    let name = text(product, "product_name")
        .or_else(|| text(product, "generic_name"))
        .unwrap_or_else(|| "Unknown food".to_string());

    let nutriments = product.get("nutriments").unwrap_or(&Value::Null);
    let nutrient = |key: &str| nutrient_value(nutriments, &format!("{key}_100g"), key);

    FoodItem {
        name,
        brand: text(product, "brands").unwrap_or_default(),
        per_100g: NutritionFacts {
            calories: nutrient("energy-kcal"),
            protein: nutrient("proteins"),
            carbs: nutrient("carbohydrates"),
            fat: nutrient("fat"),
            fiber: nutrient("fiber"),
            sugar: nutrient("sugars"),
            sodium: nutrient("sodium"),
        },
        image_url: text(product, "image_front_url").unwrap_or_default(),
        ingredients: text(product, "ingredients_text").unwrap_or_default(),
        source: SOURCE.to_string(),
    }
}

/// Non-empty trimmed string field.
fn text(product: &Value, key: &str) -> Option<String> {
    product
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Prefer the per-100 g key, then the plain one. Numeric strings are accepted.
pub fn nutrient_value(nutriments: &Value, primary: &str, fallback: &str) -> f64 {
    [primary, fallback]
        .iter()
        .find_map(|key| match nutriments.get(*key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .unwrap_or(0.0)
}
