use healthtrack_core::tracking::format_elapsed;

use super::{open_context, print_json, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let ctx = open_context()?;
    let stats = ctx.store.statistics()?;
    if json {
        return print_json(&stats);
    }
    println!("runs              {}", stats.total_runs);
    println!("distance          {:.2} km", stats.total_distance_m / 1000.0);
    println!("time              {}", format_elapsed(stats.total_duration_secs));
    println!("calories burned   {} kcal", stats.total_calories_burned);
    println!("foods logged      {}", stats.total_foods);
    println!("calories eaten    {:.0} kcal", stats.total_calories_consumed);
    if stats.skipped_files > 0 {
        println!("({} unreadable file(s) skipped)", stats.skipped_files);
    }
    Ok(())
}
