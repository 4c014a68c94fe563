//! CLI output formatting utilities.

use crate::booking::ClassRecord;
use crate::tools::ToolSpec;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a tool result, coloured by whether it reports an error.
    pub fn tool_result(msg: &str) {
        if msg.starts_with("Error") {
            Self::error(msg);
        } else {
            Self::success(msg);
        }
    }

    /// Print a class with its schedule and free slots.
    pub fn class_info(class: &ClassRecord) {
        let left = class.slots_left();
        let slots = if left == 0 {
            style("full".to_string()).red()
        } else {
            style(format!("{}/{} free", left, class.slots)).green()
        };
        println!(
            "  {} {} ({} {}, {})",
            style("*").cyan(),
            style(&class.class_name).bold(),
            class.day,
            class.time,
            slots
        );
    }

    /// Print a tool's name and description.
    pub fn tool_info(spec: &ToolSpec) {
        println!(
            "  {} {} {}",
            style("*").cyan(),
            style(spec.name).bold(),
            style(format!("- {}", first_line(spec.description))).dim()
        );
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// First line of a multi-line description.
fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Book a class.\n\nArgs: ..."), "Book a class.");
        assert_eq!(first_line(""), "");
    }
}
