//! gymbot CLI entry point.

use anyhow::Result;
use clap::Parser;
use gymbot::cli::{commands, Cli, Commands};
use gymbot::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let mut settings = Settings::load_from(Some(&config_path))?;
    if let Some(path) = &cli.bookings {
        settings.bookings.path = path.clone();
    }

    // Initialize logging; stdout belongs to MCP when serving over stdio
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("gymbot={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Init { seed } => {
            commands::run_init(&settings, Some(config_path), *seed)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Chat { model } => {
            commands::run_chat(model.clone(), settings).await?;
        }

        Commands::Ask { message, model } => {
            commands::run_ask(message, model.clone(), settings).await?;
        }

        Commands::Classes => {
            commands::run_classes(&settings)?;
        }

        Commands::Book { class, user } => {
            commands::run_book(class, user, &settings)?;
        }

        Commands::Cancel { class, user } => {
            commands::run_cancel(class, user, &settings)?;
        }

        Commands::Bookings { user } => {
            commands::run_bookings(user, &settings)?;
        }

        Commands::Calendar { action } => {
            commands::run_calendar(action, &settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Mcp => {
            commands::run_mcp(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
