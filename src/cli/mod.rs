//! CLI module for gymbot.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// gymbot - Gym class booking assistant
///
/// Book, list and cancel gym classes by chatting with an agent, from the
/// command line, over MCP, or through a small HTTP API.
#[derive(Parser, Debug)]
#[command(name = "gymbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the bookings document path
    #[arg(long, global = true, env = "GYMBOT_BOOKINGS")]
    pub bookings: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration and optionally seed the bookings file
    Init {
        /// Write the sample class list if no bookings file exists
        #[arg(long)]
        seed: bool,
    },

    /// Check configuration, credentials and the bookings file
    Doctor,

    /// Start an interactive chat session with the booking agent
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single message to the agent and print the reply
    Ask {
        /// The message for the agent (e.g., "Book me into yoga, I'm Ana")
        message: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List all classes with their free slots
    Classes,

    /// Book a class for a user
    Book {
        /// Class name (case-insensitive)
        class: String,
        /// User name
        user: String,
    },

    /// Cancel a user's booking
    Cancel {
        /// Class name (case-insensitive)
        class: String,
        /// User name
        user: String,
    },

    /// Show the classes a user is booked into
    Bookings {
        /// User name
        user: String,
    },

    /// Work with the configured calendar
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },

    /// Start HTTP API server exposing the tools
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Start MCP server for AI assistant integration (Claude, etc.)
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CalendarAction {
    /// List upcoming events
    List {
        /// Maximum number of events to show
        #[arg(short, long)]
        max: Option<u32>,
    },

    /// Create an event on the next occurrence of a weekday
    Create {
        /// Event title
        title: String,
        /// Weekday name in English or Spanish (e.g., "Monday", "miércoles")
        day: String,
        /// Start time as HH:MM
        time: String,

        /// Duration in hours
        #[arg(short, long, default_value = "1.0")]
        duration: f64,

        /// Event description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Delete the first upcoming event whose title contains the text
    Delete {
        /// Text to look for in event titles (case-insensitive)
        title: String,
    },

    /// Authorize gymbot with Google Calendar and save the token
    Auth,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
