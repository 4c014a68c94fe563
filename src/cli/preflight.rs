//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials are available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{GymError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Talking to the agent requires an API key.
    Chat,
    /// Calendar calls require an authorized token.
    Calendar,
    /// Authorizing requires the OAuth client secrets.
    CalendarAuth,
    /// Booking operations only touch the local file.
    Bookings,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat => {
            check_api_key()?;
        }
        Operation::Calendar => {
            check_token(settings)?;
        }
        Operation::CalendarAuth => {
            check_credentials(settings)?;
        }
        Operation::Bookings => {
            // No external requirements for bookings
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(GymError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(GymError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...' (or in .env)"
                .to_string(),
        )),
    }
}

/// Check that a calendar token has been saved.
fn check_token(settings: &Settings) -> Result<()> {
    let token_path = settings.token_path();
    if token_path.exists() {
        Ok(())
    } else {
        Err(GymError::Auth(format!(
            "no calendar token at {}. Run: gymbot calendar auth",
            token_path.display()
        )))
    }
}

/// Check that the OAuth client secrets file exists.
fn check_credentials(settings: &Settings) -> Result<()> {
    let credentials_path = settings.credentials_path();
    if credentials_path.exists() {
        Ok(())
    } else {
        Err(GymError::Auth(format!(
            "no OAuth client secrets at {}. Download them from the Google Cloud console.",
            credentials_path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bookings_no_requirements() {
        assert!(check(Operation::Bookings, &Settings::default()).is_ok());
    }

    #[test]
    fn test_calendar_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.calendar.token_path = dir.path().join("token.json").display().to_string();
        settings.calendar.credentials_path =
            dir.path().join("credentials.json").display().to_string();

        assert!(check(Operation::Calendar, &settings).is_err());
        assert!(check(Operation::CalendarAuth, &settings).is_err());

        std::fs::write(settings.token_path(), "{}").unwrap();
        std::fs::write(settings.credentials_path(), "{}").unwrap();
        assert!(check(Operation::Calendar, &settings).is_ok());
        assert!(check(Operation::CalendarAuth, &settings).is_ok());
    }
}
