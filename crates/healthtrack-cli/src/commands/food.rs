use chrono::NaiveDate;
use clap::{Args, Subcommand};
use healthtrack_core::error::ValidationError;
use healthtrack_core::nutrition::{common_foods, find_common, nutrition_grade};
use healthtrack_core::{AppContext, FoodApiClient, FoodItem, FoodRecord, MealSlot, NutritionFacts};
use uuid::Uuid;

use super::{api_failure, date_or_today, open_context, print_event, print_json, runtime, CmdResult};

/// How much of a food was eaten, and when.
#[derive(Args, Clone, Copy)]
pub struct Portion {
    /// Serving size in grams
    #[arg(long, default_value = "100")]
    serving: f64,
    /// Number of servings
    #[arg(long, default_value = "1")]
    servings: f64,
    /// Meal (breakfast, lunch, dinner, snack)
    #[arg(long, default_value = "snack")]
    meal: MealSlot,
    /// Day to log on (default today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum FoodAction {
    /// Log a food from per-100 g values or the built-in list
    Add {
        /// Food name
        name: String,
        /// Use the built-in entry with this name
        #[arg(long)]
        common: bool,
        /// Brand
        #[arg(long, default_value = "")]
        brand: String,
        /// kcal per 100 g
        #[arg(long)]
        calories: Option<f64>,
        /// Protein per 100 g
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbohydrates per 100 g
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat per 100 g
        #[arg(long, default_value = "0")]
        fat: f64,
        #[command(flatten)]
        portion: Portion,
    },
    /// Change the portion, meal or name of a logged food
    Edit {
        date: NaiveDate,
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        serving: Option<f64>,
        #[arg(long)]
        servings: Option<f64>,
        #[arg(long)]
        meal: Option<MealSlot>,
    },
    /// Remove a logged food
    Delete { date: NaiveDate, id: Uuid },
    /// Show a day's foods grouped by meal
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up a product by barcode
    Barcode {
        code: String,
        /// Log the product after looking it up
        #[arg(long)]
        add: bool,
        #[command(flatten)]
        portion: Portion,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search the food database by name
    Search {
        query: String,
        /// Maximum results (default from config)
        #[arg(long)]
        limit: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in foods
    Common {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: FoodAction) -> CmdResult {
    match action {
        FoodAction::Add {
            name,
            common,
            brand,
            calories,
            protein,
            carbs,
            fat,
            portion,
        } => {
            let item = if common {
                find_common(&name).ok_or_else(|| {
                    let names: Vec<String> = common_foods().into_iter().map(|f| f.name).collect();
                    format!("no built-in food named '{name}' (try: {})", names.join(", "))
                })?
            } else {
                let calories = calories.ok_or("--calories is required unless --common is given")?;
                FoodItem {
                    name,
                    brand,
                    per_100g: NutritionFacts {
                        calories,
                        protein,
                        carbs,
                        fat,
                        ..Default::default()
                    },
                    image_url: String::new(),
                    ingredients: String::new(),
                    source: "manual".into(),
                }
            };
            let mut ctx = open_context()?;
            add_item(&mut ctx, &item, portion)
        }
        FoodAction::Edit {
            date,
            id,
            name,
            serving,
            servings,
            meal,
        } => {
            let mut ctx = open_context()?;
            let old = ctx
                .store
                .load_food_day(date)?
                .get(id)
                .cloned()
                .ok_or(ValidationError::UnknownRecord(id))?;
            let replacement = rescale(&old, name, serving, servings, meal)?;
            let event = ctx.edit_food(date, id, replacement)?;
            print_event(&event, false)?;
            Ok(())
        }
        FoodAction::Delete { date, id } => {
            let mut ctx = open_context()?;
            let event = ctx.delete_food(date, id)?;
            print_event(&event, false)?;
            Ok(())
        }
        FoodAction::List { date, json } => list(date_or_today(date), json),
        FoodAction::Barcode {
            code,
            add,
            portion,
            json,
        } => {
            let mut ctx = open_context()?;
            let api = food_api(&ctx)?;
            let found = runtime()?
                .block_on(api.lookup_barcode(&code))
                .map_err(api_failure("Barcode lookup"))?;
            let Some(item) = found else {
                return Err(format!("no product found for barcode {code}").into());
            };
            if json {
                print_json(&item)?;
            } else {
                print_item(&item);
            }
            if add {
                add_item(&mut ctx, &item, portion)?;
            }
            Ok(())
        }
        FoodAction::Search { query, limit, json } => {
            let ctx = open_context()?;
            let api = food_api(&ctx)?;
            let limit = limit.unwrap_or(api.page_size());
            let items = runtime()?
                .block_on(api.search(&query, limit))
                .map_err(api_failure("Food search"))?;
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("no results for '{query}'");
            }
            for item in &items {
                print_item(item);
            }
            Ok(())
        }
        FoodAction::Common { json } => {
            let foods = common_foods();
            if json {
                return print_json(&foods);
            }
            for item in &foods {
                print_item(item);
            }
            Ok(())
        }
    }
}

fn food_api(ctx: &AppContext) -> Result<&FoodApiClient, Box<dyn std::error::Error>> {
    ctx.food_api
        .get()
        .ok_or_else(|| format!("food database unavailable: {}", ctx.food_api.reason().unwrap_or("unknown")).into())
}

fn add_item(ctx: &mut AppContext, item: &FoodItem, portion: Portion) -> CmdResult {
    let record = FoodRecord::from_item(
        item,
        portion.serving,
        portion.servings,
        portion.meal,
        date_or_today(portion.date),
    )?;
    let event = ctx.add_food(record)?;
    print_event(&event, false)
}

/// Rebuild a record with a new portion. Per-100 g values are recovered from
/// the stored totals.
fn rescale(
    old: &FoodRecord,
    name: Option<String>,
    serving: Option<f64>,
    servings: Option<f64>,
    meal: Option<MealSlot>,
) -> Result<FoodRecord, ValidationError> {
    let factor = old.serving_size / 100.0 * old.servings;
    let per_100g = NutritionFacts {
        calories: old.calories / factor,
        protein: old.protein / factor,
        carbs: old.carbs / factor,
        fat: old.fat / factor,
        ..Default::default()
    };
    let mut record = FoodRecord::from_facts(
        name.unwrap_or_else(|| old.name.clone()),
        old.brand.clone(),
        &per_100g,
        serving.unwrap_or(old.serving_size),
        servings.unwrap_or(old.servings),
        meal.unwrap_or(old.meal),
        old.date,
    )?;
    record.source = old.source.clone();
    Ok(record)
}

fn print_item(item: &FoodItem) {
    let f = &item.per_100g;
    let brand = if item.brand.is_empty() {
        String::new()
    } else {
        format!(" ({})", item.brand)
    };
    println!(
        "[{}] {}{brand}: {:.0} kcal, P {:.1} g, C {:.1} g, F {:.1} g per 100 g",
        nutrition_grade(f),
        item.name,
        f.calories,
        f.protein,
        f.carbs,
        f.fat
    );
}

fn list(date: NaiveDate, json: bool) -> CmdResult {
    let ctx = open_context()?;
    let log = ctx.store.load_food_day(date)?;
    if json {
        return print_json(&log);
    }
    if log.is_empty() {
        println!("nothing logged on {date}");
        return Ok(());
    }
    for (meal, foods) in log.by_meal() {
        if foods.is_empty() {
            continue;
        }
        println!("{meal}:");
        for food in foods {
            println!(
                "  {}  {:<24} {:>5.0} g x {:<3} {:>6.0} kcal",
                food.id, food.name, food.serving_size, food.servings, food.calories
            );
        }
    }
    let n = &log.nutrition;
    println!(
        "total: {:.0} kcal, protein {:.1} g, carbs {:.1} g, fat {:.1} g",
        n.calories, n.protein, n.carbs, n.fat
    );
    Ok(())
}
