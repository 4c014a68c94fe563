//! Init command - first-run setup.

use crate::booking::{sample_classes, BookingStore};
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::PathBuf;

/// Run the init command for first-time setup.
///
/// Writes the configuration to `config_path` (or the default location)
/// when missing and, with `seed`, the sample class list.
pub fn run_init(settings: &Settings, config_path: Option<PathBuf>, seed: bool) -> anyhow::Result<()> {
    Output::header("gymbot Setup");
    println!();

    // Step 1: Check API key
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  The chat agent needs an OpenAI API key. Booking commands work without one.");
        println!("  Set it in your shell configuration or in a .env file:");
        println!("  {}", style("OPENAI_API_KEY=sk-...").green());
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Create directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    println!();

    // Step 3: Create config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = config_path.unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("gymbot config edit").green());
    }

    println!();

    // Step 4: Bookings file
    println!("{}", style("Step 4: Bookings file").bold().cyan());
    println!();

    let bookings_path = settings.bookings_path();
    if bookings_path.exists() {
        Output::info(&format!("Bookings file exists: {}", bookings_path.display()));
    } else if seed {
        let store = BookingStore::open(&bookings_path);
        store.replace_all(sample_classes())?;
        Output::success(&format!("Seeded bookings file: {}", bookings_path.display()));
        for class in store.classes() {
            Output::class_info(&class);
        }
    } else {
        Output::info(&format!(
            "No bookings file at {}. Seed one with: {}",
            bookings_path.display(),
            style("gymbot init --seed").green()
        ));
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("gymbot doctor").cyan());
    println!("  {} See the class schedule", style("gymbot classes").cyan());
    println!("  {} Talk to the booking agent", style("gymbot chat").cyan());
    println!();
    println!("For more help: {}", style("gymbot --help").cyan());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_seed() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.data_dir = dir.path().join("data").display().to_string();
        settings.bookings.path = dir.path().join("data/bookings.json").display().to_string();
        let config_path = dir.path().join("config.toml");

        run_init(&settings, Some(config_path.clone()), true).unwrap();

        assert!(config_path.exists());
        let store = BookingStore::open(settings.bookings_path());
        assert_eq!(store.classes(), sample_classes());
    }

    #[test]
    fn test_seed_leaves_existing_bookings_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.data_dir = dir.path().display().to_string();
        settings.bookings.path = dir.path().join("bookings.json").display().to_string();
        std::fs::write(settings.bookings_path(), "[]").unwrap();

        run_init(&settings, Some(dir.path().join("config.toml")), true).unwrap();

        assert_eq!(std::fs::read_to_string(settings.bookings_path()).unwrap(), "[]");
    }
}
