use chrono::{Datelike, Local, NaiveDate};
use clap::Subcommand;
use healthtrack_core::tracking::format_elapsed;
use healthtrack_core::{DayDetail, MonthCalendar};

use super::{open_context, print_json, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Calendar of a month, marking days with records
    Month {
        /// Year (default current)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default current)
        #[arg(long)]
        month: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Everything recorded on one day
    Day {
        date: NaiveDate,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: HistoryAction) -> CmdResult {
    let ctx = open_context()?;
    match action {
        HistoryAction::Month { year, month, json } => {
            let today = Local::now().date_naive();
            let calendar = MonthCalendar::build(
                &ctx.store,
                year.unwrap_or(today.year()),
                month.unwrap_or(today.month()),
            )?;
            if json {
                return print_json(&calendar);
            }
            print_calendar(&calendar);
        }
        HistoryAction::Day { date, json } => {
            let detail = DayDetail::load(&ctx.store, date)?;
            if json {
                return print_json(&detail);
            }
            print_day(&detail);
        }
    }
    Ok(())
}

/// Days with records are starred.
fn print_calendar(calendar: &MonthCalendar) {
    println!("{:04}-{:02}", calendar.year, calendar.month);
    println!(" Mo  Tu  We  Th  Fr  Sa  Su");
    for week in calendar.weeks() {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                Some(day) if day.has_data => format!("{:>3}*", day.date.day()),
                Some(day) => format!("{:>3} ", day.date.day()),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", row.trim_end());
    }
}

fn print_day(detail: &DayDetail) {
    println!("{}", detail.date);
    if detail.is_empty() {
        println!("  no records");
        return;
    }
    if !detail.runs.is_empty() {
        println!("Runs ({:.2} km)", detail.total_distance_m() / 1000.0);
        for run in &detail.runs {
            println!(
                "  {}  {:.2} km  {}  {} kcal",
                run.id,
                run.distance_km(),
                format_elapsed(run.duration),
                run.calories
            );
        }
    }
    if !detail.foods.is_empty() {
        println!("Foods ({:.0} kcal)", detail.nutrition.calories);
        for food in &detail.foods {
            println!("  {}  {:<10} {:<24} {:.0} kcal", food.id, food.meal, food.name, food.calories);
        }
    }
}
