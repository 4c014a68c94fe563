//! Calendar commands.

use crate::calendar::oauth::{authorize_installed, ClientSecrets};
use crate::calendar::{CalendarService, EventRequest};
use crate::cli::preflight::{self, Operation};
use crate::cli::{CalendarAction, Output};
use crate::config::Settings;
use anyhow::Result;
use console::style;

/// Run a calendar subcommand.
pub async fn run_calendar(action: &CalendarAction, settings: &Settings) -> Result<()> {
    match action {
        CalendarAction::Auth => run_auth(settings).await?,

        CalendarAction::List { max } => {
            let service = connect(settings)?;
            Output::header(&format!("Upcoming events ({})", service.provider_name()));
            let spinner = Output::spinner("Fetching events...");
            let listing = service.list_upcoming(*max).await;
            spinner.finish_and_clear();
            if listing.starts_with("Error") {
                Output::error(&listing);
            } else {
                println!("{}", listing);
            }
        }

        CalendarAction::Create {
            title,
            day,
            time,
            duration,
            description,
        } => {
            let service = connect(settings)?;
            let request = EventRequest {
                duration_hours: *duration,
                description: description.clone(),
                ..EventRequest::new(title, day, time)
            };
            let spinner = Output::spinner("Creating event...");
            let result = service.create_event(&request).await;
            spinner.finish_and_clear();
            Output::tool_result(&result);
        }

        CalendarAction::Delete { title } => {
            let service = connect(settings)?;
            let spinner = Output::spinner("Looking for the event...");
            let result = service.delete_by_title(title).await;
            spinner.finish_and_clear();
            Output::tool_result(&result);
        }
    }

    Ok(())
}

/// Check for a token and build the configured calendar.
fn connect(settings: &Settings) -> Result<CalendarService> {
    if let Err(e) = preflight::check(Operation::Calendar, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'gymbot doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if !settings.calendar.enabled {
        Output::warning("calendar.enabled is false; the agent will not offer calendar tools.");
    }

    Ok(CalendarService::from_settings(settings)?)
}

/// Run the OAuth loopback flow and save the token file.
async fn run_auth(settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::CalendarAuth, settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let secrets = ClientSecrets::load(&settings.credentials_path())?;
    let http = reqwest::Client::new();

    Output::header("Google Calendar authorization");
    println!();
    let user = authorize_installed(&secrets, &http, |url| {
        println!("Open this URL in your browser and grant access:\n");
        println!("  {}\n", style(url).underlined());
        Output::info("Waiting for the authorization callback...");
    })
    .await?;

    let token_path = settings.token_path();
    user.save(&token_path)?;
    Output::success(&format!("Saved calendar token to {}", token_path.display()));

    if !settings.calendar.enabled {
        Output::info("Set calendar.enabled = true in your config to give the agent calendar tools.");
    }

    Ok(())
}
