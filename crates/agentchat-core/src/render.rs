//! Presentation decisions for a single chat message
//!
//! A [`MessageView`] says *what* to show for a message; the UI decides how it
//! looks. Building a view is total: missing or empty blocks are simply absent.

use crate::format::{display_url, parse_summary_to_list};
use crate::state::{ChatMessage, ToolStep};

/// Heading shown above an agent summary rendered as a list.
pub const LIST_HEADING: &str = "Today's News Highlights";
/// Label in front of the source links.
pub const SOURCES_LABEL: &str = "Top sources:";
/// Hint printed under the source links.
pub const SOURCES_HINT: &str = "For more news, visit the sources above.";
/// Title of the collapsible trace block.
pub const TRACE_TITLE: &str = "Tool Trace";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Bullet list under a fixed heading.
    List { heading: &'static str, items: Vec<String> },
    /// The content verbatim.
    Plain(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    /// Shortened text for display.
    pub text: String,
    /// The original, unmodified URL.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcesBlock {
    pub links: Vec<SourceLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub tool: String,
    pub input: String,
    pub output: String,
}

/// Tool trace, collapsed until the user expands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceBlock {
    pub steps: Vec<TraceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub body: Body,
    pub sources: Option<SourcesBlock>,
    pub trace: Option<TraceBlock>,
}

impl MessageView {
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            body: Self::body_for(message),
            sources: message.agent_sources().map(SourcesBlock::from_urls),
            trace: message.agent_trace().map(TraceBlock::from_steps),
        }
    }

    fn body_for(message: &ChatMessage) -> Body {
        if message.is_agent() {
            let items = parse_summary_to_list(&message.content);
            if items.len() > 1 {
                return Body::List { heading: LIST_HEADING, items };
            }
        }
        Body::Plain(message.content.clone())
    }

    pub fn is_list(&self) -> bool {
        matches!(self.body, Body::List { .. })
    }
}

impl SourcesBlock {
    fn from_urls(urls: &[String]) -> Self {
        let links = urls
            .iter()
            .map(|url| SourceLink {
                text: display_url(url).to_string(),
                target: url.clone(),
            })
            .collect();
        Self { links }
    }
}

impl TraceBlock {
    fn from_steps(steps: &[ToolStep]) -> Self {
        let steps = steps
            .iter()
            .map(|step| TraceEntry {
                tool: step.tool.clone(),
                input: step.input.to_json_text(),
                output: step.output.to_output_text(),
            })
            .collect();
        Self { steps }
    }
}
