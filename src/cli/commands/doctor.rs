//! Doctor command - verify configuration, credentials and data files.

use crate::booking::StoredEntry;
use crate::calendar::oauth::{AuthorizedUser, ClientSecrets};
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use serde_json::Value;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("gymbot Doctor");
    println!();
    println!("Checking configuration and data files...\n");

    let mut checks = Vec::new();

    let mut section = |title: &str, results: Vec<CheckResult>| {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    };

    section("API Configuration", vec![check_openai_api_key()]);
    section("Configuration", vec![check_config_file(config_path)]);
    section("Bookings", vec![check_bookings_file(&settings.bookings_path())]);
    section("Calendar", check_calendar(settings));

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using gymbot.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! gymbot is ready to use.");
    }

    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "not set (chat and ask will not work)",
            "Set with: export OPENAI_API_KEY='sk-...' or add it to .env",
        ),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: gymbot init (or gymbot config edit)",
        )
    }
}

/// Check that the bookings document parses and count its entries.
fn check_bookings_file(path: &Path) -> CheckResult {
    const NAME: &str = "Bookings file";

    if !path.exists() {
        return CheckResult::warning(
            NAME,
            &format!("{} (not created yet)", path.display()),
            "Create with: gymbot init --seed",
        );
    }

    let size = std::fs::metadata(path)
        .map(|m| format_size(m.len()))
        .unwrap_or_else(|_| "unknown size".to_string());

    let items = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()))
    {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            return CheckResult::error(
                NAME,
                "not a JSON array (loads as an empty schedule)",
                "The file must hold a list of class objects",
            )
        }
        Err(e) => {
            return CheckResult::error(
                NAME,
                &format!("unreadable: {}", e),
                "Fix the JSON by hand, or move it aside and run: gymbot init --seed",
            )
        }
    };

    let entries: Vec<StoredEntry> = items.into_iter().map(StoredEntry::from_value).collect();
    let invalid = entries.iter().filter(|e| e.as_class().is_none()).count();
    let classes = entries.len() - invalid;
    let message = format!("{} ({} classes, {})", path.display(), classes, size);

    if invalid > 0 {
        CheckResult::warning(
            NAME,
            &format!("{}, {} malformed entries", message, invalid),
            "Malformed entries are kept on save but ignored by bookings",
        )
    } else {
        CheckResult::ok(NAME, &message)
    }
}

/// Check calendar credentials when the calendar is enabled.
fn check_calendar(settings: &Settings) -> Vec<CheckResult> {
    if !settings.calendar.enabled {
        return vec![CheckResult::ok(
            "Calendar",
            "disabled (set calendar.enabled = true to use it)",
        )];
    }

    let mut results = vec![CheckResult::ok(
        "Calendar",
        &format!(
            "{} calendar '{}' in {}",
            settings.calendar.provider, settings.calendar.calendar_id, settings.calendar.timezone
        ),
    )];

    let credentials_path = settings.credentials_path();
    results.push(match ClientSecrets::load(&credentials_path) {
        Ok(_) => CheckResult::ok("Client secrets", &format!("{}", credentials_path.display())),
        Err(_) if !credentials_path.exists() => CheckResult::warning(
            "Client secrets",
            &format!("{} (missing)", credentials_path.display()),
            "Needed only for: gymbot calendar auth",
        ),
        Err(e) => CheckResult::error(
            "Client secrets",
            &format!("invalid: {}", e),
            "Download an OAuth desktop client JSON from the Google Cloud console",
        ),
    });

    let token_path = settings.token_path();
    results.push(match AuthorizedUser::load(&token_path) {
        Ok(user) if user.refresh_token.is_some() => {
            CheckResult::ok("Token", &format!("{} (refreshable)", token_path.display()))
        }
        Ok(_) => CheckResult::warning(
            "Token",
            "no refresh token; access will stop when it expires",
            "Re-authorize with: gymbot calendar auth",
        ),
        Err(_) if !token_path.exists() => CheckResult::error(
            "Token",
            &format!("{} (missing)", token_path.display()),
            "Authorize with: gymbot calendar auth",
        ),
        Err(e) => CheckResult::error(
            "Token",
            &format!("invalid: {}", e),
            "Re-authorize with: gymbot calendar auth",
        ),
    });

    results
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_bookings_file_checks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.json");

        assert_eq!(check_bookings_file(&path).status, CheckStatus::Warning);

        std::fs::write(&path, r#"[{"class_name": "Yoga", "day": "Monday", "time": "10:00", "slots": 2, "booked_by": []}]"#).unwrap();
        let result = check_bookings_file(&path);
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.message.contains("1 classes"));

        std::fs::write(&path, r#"[{"class_name": "Yoga"}]"#).unwrap();
        let result = check_bookings_file(&path);
        assert_eq!(result.status, CheckStatus::Warning);
        assert!(result.message.contains("1 malformed"));

        std::fs::write(&path, "{oops").unwrap();
        assert_eq!(check_bookings_file(&path).status, CheckStatus::Error);
    }

    #[test]
    fn test_calendar_disabled_is_ok() {
        let results = check_calendar(&Settings::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Ok);
    }
}
