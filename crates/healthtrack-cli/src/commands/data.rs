use std::path::PathBuf;

use clap::Subcommand;

use super::{open_context, require_confirmation, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Copy the data directory into a timestamped backup
    Backup {
        /// Directory to write the backup into (default: next to the data directory)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Replace all data with a backup
    Restore {
        backup: PathBuf,
        #[arg(long)]
        yes: bool,
    },
    /// Delete the profile, runs, foods and queued sync writes
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CmdResult {
    let ctx = open_context()?;
    match action {
        DataAction::Backup { dest } => {
            let dest = match dest {
                Some(d) => d,
                None => ctx
                    .store
                    .root()
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| ctx.root()),
            };
            std::fs::create_dir_all(&dest)?;
            let path = ctx.store.backup(&dest)?;
            println!("backup written to {}", path.display());
        }
        DataAction::Restore { backup, yes } => {
            require_confirmation(yes, "restore replaces all current data")?;
            let safety = ctx.store.restore(&backup)?;
            println!("restored from {}", backup.display());
            println!("previous data saved to {}", safety.display());
        }
        DataAction::Clear { yes } => {
            require_confirmation(yes, "clear deletes every record")?;
            ctx.store.clear()?;
            println!("all records cleared (config and backups kept)");
        }
    }
    Ok(())
}
