//! Agent runner with tool calling loop.

use crate::config::{Prompts, Settings};
use crate::error::{GymError, Result};
use crate::openai::create_client;
use crate::tools::{openai_tools, ToolContext};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::{debug, info};

/// Conversational agent that books classes through tools.
///
/// Keeps the conversation between calls to [`send`](Self::send), so a
/// chat session is just one `Agent` fed line after line.
pub struct Agent {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    tools: ToolContext,
    max_iterations: usize,
    max_history: usize,
    messages: Vec<ChatCompletionRequestMessage>,
}

impl Agent {
    /// Create a new agent with the given tool context, model and system prompt.
    pub fn new(tools: ToolContext, model: &str, system_prompt: &str) -> Result<Self> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| GymError::Agent(e.to_string()))?;

        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            tools,
            max_iterations: 10,
            max_history: 30,
            messages: vec![system.into()],
        })
    }

    /// Create an agent from settings, rendering the configured prompts.
    pub fn from_settings(tools: ToolContext, model: Option<String>, settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let today = chrono::Local::now().format("%A %d %B %Y, %H:%M").to_string();
        let system_prompt = prompts.agent_system(&today, tools.calendar_enabled());
        let model = model.unwrap_or_else(|| settings.agent.model.clone());

        Ok(Self::new(tools, &model, &system_prompt)?
            .with_max_iterations(settings.agent.max_iterations)
            .with_max_history(settings.agent.max_history))
    }

    /// Set maximum model calls per user message.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set how many messages of history are kept after each turn.
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = max.max(2);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Clear conversation history (keeps system prompt).
    pub fn clear_history(&mut self) {
        self.messages.truncate(1);
    }

    /// Send a user message and return the final reply.
    pub async fn send(&mut self, input: &str) -> Result<AgentResponse> {
        self.send_with(input, |_| {}).await
    }

    /// Send a user message, reporting each tool call as it completes.
    pub async fn send_with(
        &mut self,
        input: &str,
        mut on_tool: impl FnMut(&ToolCallRecord),
    ) -> Result<AgentResponse> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(input)
            .build()
            .map_err(|e| GymError::Agent(e.to_string()))?;
        self.messages.push(user_message.into());

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(GymError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}, {} messages", iterations, self.messages.len());

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(self.messages.clone())
                .tools(openai_tools(self.tools.calendar_enabled()))
                .build()
                .map_err(|e| GymError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| GymError::OpenAI(format!("Chat API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| GymError::Agent("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls.clone(),
                _ => {
                    let content = choice.message.content.clone().unwrap_or_default();
                    self.push_assistant_text(&content)?;
                    self.messages = trim_history(std::mem::take(&mut self.messages), self.max_history);
                    return Ok(AgentResponse {
                        content,
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };

            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| GymError::Agent(e.to_string()))?;
            self.messages.push(assistant_msg.into());

            for tool_call in &tool_calls {
                let record = self.execute_tool_call(tool_call).await;
                on_tool(&record);

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| GymError::Agent(e.to_string()))?;
                self.messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);
        let result = self.tools.execute_named(name, arguments).await;
        info!("Tool {} returned: {}", name, result);

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }

    fn push_assistant_text(&mut self, content: &str) -> Result<()> {
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| GymError::Agent(e.to_string()))?;
        self.messages.push(msg.into());
        Ok(())
    }
}

/// Keep the system prompt and at most the last `max_messages - 1` messages.
///
/// The kept tail always starts at a user message so that tool results
/// are never separated from the assistant turn that requested them.
/// When a single turn is longer than the window, the tail starts at that
/// turn's user message and may exceed `max_messages`.
fn trim_history(
    messages: Vec<ChatCompletionRequestMessage>,
    max_messages: usize,
) -> Vec<ChatCompletionRequestMessage> {
    if messages.len() <= max_messages {
        return messages;
    }

    let is_user =
        |m: &ChatCompletionRequestMessage| matches!(m, ChatCompletionRequestMessage::User(_));
    let window_start = messages.len() - (max_messages - 1);
    let start = match messages[window_start..].iter().position(is_user) {
        Some(offset) => window_start + offset,
        None => messages[1..]
            .iter()
            .rposition(is_user)
            .map_or(messages.len(), |i| i + 1),
    };

    let mut iter = messages.into_iter();
    let mut trimmed: Vec<_> = iter.next().into_iter().collect();
    trimmed.extend(iter.skip(start - 1));
    trimmed
}

/// Response from one user turn.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during the turn.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl ToolCallRecord {
    /// Whether the tool reported an error.
    pub fn is_error(&self) -> bool {
        self.result.starts_with("Error")
    }
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::{
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestUserMessageContent,
    };

    fn system(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestSystemMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn user(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestUserMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn assistant(text: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestAssistantMessageArgs::default()
            .content(text)
            .build()
            .unwrap()
            .into()
    }

    fn tool(id: &str) -> ChatCompletionRequestMessage {
        ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(id)
            .content("ok")
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "book_class".to_string(),
            arguments: r#"{"class_name": "Yoga"}"#.to_string(),
            result: "Error: User name cannot be empty.".to_string(),
        };
        assert_eq!(format!("{}", record), r#"book_class({"class_name": "Yoga"})"#);
        assert!(record.is_error());
    }

    #[test]
    fn test_trim_history_short_is_untouched() {
        let messages = vec![system("s"), user("hi"), assistant("hello")];
        assert_eq!(trim_history(messages, 10).len(), 3);
    }

    #[test]
    fn test_trim_history_keeps_system_and_tail() {
        let messages = vec![
            system("s"),
            user("1"),
            assistant("a1"),
            user("2"),
            assistant("a2"),
            user("3"),
            assistant("a3"),
        ];
        let trimmed = trim_history(messages, 5);
        assert_eq!(trimmed.len(), 5);
        assert!(matches!(trimmed[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(trimmed[1], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_trim_history_never_starts_with_tool_result() {
        let messages = vec![
            system("s"),
            user("1"),
            assistant("calls"),
            tool("t1"),
            tool("t2"),
            assistant("done"),
            user("2"),
            assistant("a2"),
        ];
        let trimmed = trim_history(messages, 5);
        assert!(matches!(trimmed[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(trimmed[1], ChatCompletionRequestMessage::User(_)));
        assert_eq!(trimmed.len(), 3);
    }

    #[test]
    fn test_trim_history_keeps_long_tool_turn() {
        let mut messages = vec![system("s"), user("old"), assistant("a0"), user("book everything")];
        for i in 0..6 {
            messages.push(assistant("calls"));
            messages.push(tool(&format!("t{}", i)));
        }
        messages.push(assistant("all booked"));

        let trimmed = trim_history(messages, 5);
        assert!(matches!(trimmed[0], ChatCompletionRequestMessage::System(_)));
        match &trimmed[1] {
            ChatCompletionRequestMessage::User(m) => assert!(matches!(
                &m.content,
                ChatCompletionRequestUserMessageContent::Text(t) if t == "book everything"
            )),
            _ => panic!("expected the turn's user message after the system prompt"),
        }
        assert_eq!(trimmed.len(), 15);
        match trimmed.last().unwrap() {
            ChatCompletionRequestMessage::Assistant(m) => assert!(matches!(
                &m.content,
                Some(ChatCompletionRequestAssistantMessageContent::Text(t)) if t == "all booked"
            )),
            _ => panic!("expected the final reply to be kept"),
        }
    }
}
