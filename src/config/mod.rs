//! Configuration module for gymbot.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts};
pub use settings::{
    AgentSettings, BookingSettings, CalendarProviderKind, CalendarSettings, GeneralSettings,
    PromptSettings, Settings,
};
