use clap::Subcommand;
use serde_json::json;

use super::{open_context, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile with BMI and BMR
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a profile field (name, height, weight, age, gender, daily_calorie_goal)
    Set {
        field: String,
        value: String,
    },
}

pub fn run(action: ProfileAction) -> CmdResult {
    let mut ctx = open_context()?;
    match action {
        ProfileAction::Show { json } => {
            let p = &ctx.profile;
            if json {
                return print_json(&json!({
                    "profile": p,
                    "bmi": p.bmi(),
                    "bmi_category": p.bmi_category().label(),
                    "bmr": p.bmr(),
                    "step_length_m": ctx.step_length_m(),
                }));
            }
            println!("name          {}", p.name);
            println!("height        {:.0} cm", p.height_cm);
            println!("weight        {:.1} kg", p.weight_kg);
            println!("age           {}", p.age);
            println!("gender        {}", p.gender);
            println!("calorie goal  {:.0} kcal", p.daily_calorie_goal);
            println!("BMI           {:.1} ({})", p.bmi(), p.bmi_category().label());
            println!("BMR           {:.0} kcal", p.bmr());
            println!("step length   {:.2} m", ctx.step_length_m());
        }
        ProfileAction::Set { field, value } => {
            ctx.profile.set_field(&field, &value)?;
            ctx.save_profile()?;
            println!("ok");
        }
    }
    Ok(())
}
