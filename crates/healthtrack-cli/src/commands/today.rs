use chrono::NaiveDate;

use super::{date_or_today, open_context, print_json, CmdResult};

pub fn run(date: Option<NaiveDate>, json: bool) -> CmdResult {
    let ctx = open_context()?;
    let summary = ctx.today_summary(date_or_today(date));
    if json {
        return print_json(&summary);
    }

    let n = &summary.nutrition;
    let (protein_pct, carbs_pct, fat_pct) = summary.macro_percent();
    let goals = &summary.macro_goals;

    println!("{}", summary.requested);
    println!();
    println!("Nutrition{}", from_note(summary.food_date, summary.requested));
    println!(
        "  calories  {:.0} / {:.0} kcal ({:.0}%)",
        n.calories,
        summary.calorie_goal,
        summary.calorie_progress() * 100.0
    );
    println!("  protein   {:.1} / {:.0} g ({protein_pct:.0}%)", n.protein, goals.protein_g);
    println!("  carbs     {:.1} / {:.0} g ({carbs_pct:.0}%)", n.carbs, goals.carbs_g);
    println!("  fat       {:.1} / {:.0} g ({fat_pct:.0}%)", n.fat, goals.fat_g);
    println!("  foods     {}", summary.food_count);
    println!();
    println!("Exercise{}", from_note(summary.run_date, summary.requested));
    println!("  runs      {}", summary.run_count);
    println!("  distance  {:.2} km", summary.distance_m / 1000.0);
    println!("  time      {}", summary.duration_label());
    println!("  burned    {} kcal", summary.calories_burned);
    println!();
    println!("Net {:.0} kcal", summary.net_calories());
    Ok(())
}

fn from_note(shown: NaiveDate, requested: NaiveDate) -> String {
    if shown == requested {
        String::new()
    } else {
        format!(" (from {shown})")
    }
}
