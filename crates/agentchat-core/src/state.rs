//! UI-agnostic conversation state
//!
//! Messages are created once and never mutated. The [`ChatSession`] owns the
//! ordered log and the busy flag that keeps at most one request in flight.

use serde::{Deserialize, Serialize};

/// Content shown when the transport fails.
pub const TRANSPORT_FAILURE_TEXT: &str = "Error contacting backend.";

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<ToolStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            trace: None,
            sources: None,
        }
    }

    pub fn agent(
        content: impl Into<String>,
        trace: Option<Vec<ToolStep>>,
        sources: Option<Vec<String>>,
    ) -> Self {
        Self {
            role: ChatRole::Agent,
            content: content.into(),
            trace,
            sources,
        }
    }

    /// Synthetic agent message substituted for a failed request.
    pub fn transport_failure() -> Self {
        Self::agent(TRANSPORT_FAILURE_TEXT, None, None)
    }

    pub fn is_agent(&self) -> bool {
        self.role == ChatRole::Agent
    }

    /// Sources, only for agent messages and only when non-empty.
    pub fn agent_sources(&self) -> Option<&[String]> {
        match (&self.role, &self.sources) {
            (ChatRole::Agent, Some(sources)) if !sources.is_empty() => Some(sources),
            _ => None,
        }
    }

    /// Trace steps, only for agent messages and only when non-empty.
    pub fn agent_trace(&self) -> Option<&[ToolStep]> {
        match (&self.role, &self.trace) {
            (ChatRole::Agent, Some(trace)) if !trace.is_empty() => Some(trace),
            _ => None,
        }
    }
}

/// One recorded tool invocation relayed by the agent backend.
///
/// Every field defaults so that a partially formed step is still displayed
/// instead of failing the whole reply.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolStep {
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub input: TraceValue,
    #[serde(default)]
    pub output: TraceValue,
}

/// Payload of a tool step.
///
/// Variant order matters for untagged decoding: a string array is a `List`,
/// every other non-string value falls through to `Structured`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceValue {
    Text(String),
    List(Vec<String>),
    Structured(serde_json::Value),
}

impl Default for TraceValue {
    fn default() -> Self {
        TraceValue::Structured(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for TraceValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => TraceValue::Text(text),
            serde_json::Value::Array(items) if items.iter().all(|item| item.is_string()) => {
                TraceValue::List(
                    items
                        .into_iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect(),
                )
            }
            other => TraceValue::Structured(other),
        }
    }
}

impl ToolStep {
    /// Build a step from whatever the backend sent in its place.
    ///
    /// An object contributes its `tool`, `input` and `output` keys. Anything
    /// else becomes a step with an empty tool name and the raw value as input.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(mut fields) => {
                let tool = match fields.remove("tool") {
                    Some(serde_json::Value::String(name)) => name,
                    Some(serde_json::Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                Self {
                    tool,
                    input: fields.remove("input").map(TraceValue::from).unwrap_or_default(),
                    output: fields.remove("output").map(TraceValue::from).unwrap_or_default(),
                }
            }
            raw => Self {
                tool: String::new(),
                input: TraceValue::from(raw),
                output: TraceValue::default(),
            },
        }
    }
}

impl TraceValue {
    /// JSON text of the value, as a tool input is displayed.
    pub fn to_json_text(&self) -> String {
        let result = match self {
            TraceValue::Text(text) => serde_json::to_string(text),
            TraceValue::List(items) => serde_json::to_string(items),
            TraceValue::Structured(value) => serde_json::to_string(value),
        };
        result.unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Display text for a tool output: string lists are joined with `, `.
    pub fn to_output_text(&self) -> String {
        match self {
            TraceValue::List(items) => items.join(", "),
            other => other.to_json_text(),
        }
    }
}

/// Append-only conversation log plus the busy flag of the single outstanding request.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    busy: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a submission.
    ///
    /// Returns the text to send, or `None` when a request is already in flight
    /// or the input is blank. On success the user message is appended as typed.
    pub fn begin_submit(&mut self, input: &str) -> Option<String> {
        if self.busy || input.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(input));
        self.busy = true;
        Some(input.to_string())
    }

    /// Record the outcome of the in-flight request.
    pub fn complete(&mut self, reply: ChatMessage) {
        self.messages.push(reply);
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
