//! Interactive chat command with tool calling support.

use super::tool_context;
use crate::agent::{Agent, ToolCallRecord};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'gymbot doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let tools = tool_context(&settings);
    let calendar_enabled = tools.calendar_enabled();
    let mut agent = Agent::from_settings(tools, model, &settings)?;

    println!("\n{}", style("gymbot chat").bold().cyan());
    println!(
        "{}",
        style(format!(
            "Model {}{}",
            agent.model(),
            if calendar_enabled { ", calendar tools on" } else { "" }
        ))
        .dim()
    );
    println!(
        "{}\n",
        style("Ask about classes or bookings, or 'exit' to quit. Use 'clear' to reset conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            agent.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        match agent.send_with(input, print_tool_call).await {
            Ok(response) => {
                println!("\n{} {}\n", style("gymbot:").cyan().bold(), response.content);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

fn print_tool_call(call: &ToolCallRecord) {
    let mark = if call.is_error() {
        style("✗").red()
    } else {
        style("✓").green()
    };
    println!("{} {}", style(format!("  [{}]", call.name)).dim(), mark);
}
