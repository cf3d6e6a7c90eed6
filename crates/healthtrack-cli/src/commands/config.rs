use clap::Subcommand;
use healthtrack_core::Config;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Dotted key (e.g. "tracking.min_run_distance_m", "ui.dark_mode")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the theme front-ends should apply
    Theme {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List { json } => {
            if json {
                return print_json(&config);
            }
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Theme { json } => {
            let ui = &config.ui;
            if json {
                return print_json(&serde_json::json!({
                    "font_family": ui.font_family,
                    "font_size": ui.font_size,
                    "scheme": ui.scheme(),
                }));
            }
            println!("font    {}", ui.font_family.as_deref().unwrap_or("(system default)"));
            println!("size    {}", ui.font_size);
            println!("scheme  {}", ui.scheme());
        }
        ConfigAction::Reset => {
            config.reset()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
