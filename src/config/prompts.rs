//! Prompt templates for gymbot.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the gym assistant agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    /// Extra instructions appended when calendar tools are available.
    pub calendar: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful Gym Assistant.
Use the supplied tools to help users check class schedules, book classes, and cancel bookings.
Always check the output of tools before responding to the user.
If a tool returns an error, explain it to the user.
Ask for the user's name before booking or cancelling if you don't know it.
Today is {{today}}."#
                .to_string(),

            calendar: r#"You can also manage the user's calendar.
- Use 'list_calendar_events' to show what is coming up
- After a successful booking, offer to add the class to the calendar with 'create_calendar_event'
- After a cancellation, offer to remove the matching event with 'delete_calendar_event'"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the agent system prompt.
    pub fn agent_system(&self, today: &str, calendar_enabled: bool) -> String {
        let mut vars = HashMap::new();
        vars.insert("today".to_string(), today.to_string());

        let mut prompt = self.render_with_custom(&self.agent.system, &vars);
        if calendar_enabled && !self.agent.calendar.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.render_with_custom(&self.agent.calendar, &vars));
        }
        prompt
    }
}
