use std::path::PathBuf;

use crate::db::db_path;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, Settings};
use crate::store::SqliteStore;

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    let defaults = Settings::default();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if settings.data_dir == defaults.data_dir {
        // First run, offer to pick a different location
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;
    std::fs::create_dir_all(resolved.join("backups"))?;

    SqliteStore::open(&db_path(&resolved))?;
    save_settings(&settings)?;
    tracing::info!(data_dir = %resolved.display(), "initialized data directory");

    println!("Initialized outlay at {}", resolved.display());
    if settings.user_name.is_empty() {
        println!("Next: run `outlay login <name>` to start tracking.");
    }
    Ok(())
}
