use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::Config;

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_file(),
    }
}

pub fn show_config(path: Option<&Path>) -> Result<()> {
    let config = Config::load_from(path)?;
    let mut shown = config.clone();
    if !shown.exercise_db.api_key.is_empty() {
        shown.exercise_db.api_key = "********".to_string();
    }
    let config_str = toml::to_string_pretty(&shown)?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);
    println!("API root: {}", config.api_root());

    Ok(())
}

pub fn edit_config(path: Option<&Path>) -> Result<()> {
    let config_file = resolve(path)?;

    // Ensure config file exists
    if !config_file.exists() {
        Config::default().save_to(&config_file)?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    Command::new(&editor)
        .arg(&config_file)
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;

    // Reject a file the next command could not parse
    Config::load_from(Some(&config_file))?;
    println!("✓ Configuration saved!");

    Ok(())
}

pub fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let config_file = resolve(path)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(&config_file)?;

    println!("✓ Configuration initialized at: {}", config_file.display());
    println!();
    println!("Set your ExerciseDB key with the EXERCISEDB_API_KEY environment variable");
    println!("or edit it with: gym config edit");

    Ok(())
}
