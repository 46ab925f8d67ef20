mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::state::{ChatMessage, ToolStep};

/// Content used when the backend answered with neither a response nor an error.
pub const EMPTY_REPLY_TEXT: &str = "No response";

/// Failures of a single request to the agent backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, ...
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body is not JSON or not shaped like a reply.
    #[error("invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Request body posted to the backend.
#[derive(Debug, Serialize)]
pub struct AgentRequest<'a> {
    pub message: &'a str,
}

/// Structured reply of the backend.
///
/// `trace` and `sources` are decoded leniently: an odd element is coerced or
/// dropped and a field of the wrong type is treated as absent, so the
/// response text always survives.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_trace")]
    pub trace: Option<Vec<ToolStep>>,
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources: Option<Vec<String>>,
}

fn lenient_trace<'de, D>(deserializer: D) -> Result<Option<Vec<ToolStep>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(steps) => Some(steps.into_iter().map(ToolStep::from_json).collect()),
        _ => None,
    })
}

fn lenient_sources<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(urls) => Some(
            urls.into_iter()
                .filter_map(|url| match url {
                    Value::String(url) => Some(url),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

impl AgentReply {
    /// Agent message for this reply: the response, else the error, else a placeholder.
    pub fn into_message(self) -> ChatMessage {
        let content = [self.response, self.error]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY_TEXT.to_string());
        ChatMessage::agent(content, self.trace, self.sources)
    }
}

/// Sends one user message to the agent backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str) -> Result<AgentReply, TransportError>;
}

/// Run one request and turn its outcome into the agent message to append.
///
/// Transport failures never escape: they become the fixed fallback message.
pub async fn exchange<T>(transport: &T, message: &str) -> ChatMessage
where
    T: ChatTransport + ?Sized,
{
    match transport.send(message).await {
        Ok(reply) => {
            let message = reply.into_message();
            tracing::debug!(
                sources = message.sources.as_ref().map_or(0, Vec::len),
                trace_steps = message.trace.as_ref().map_or(0, Vec::len),
                "received agent reply"
            );
            message
        }
        Err(e) => {
            tracing::warn!("request to agent backend failed: {}", e);
            ChatMessage::transport_failure()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatSession;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for FailingTransport {
        async fn send(&self, _message: &str) -> Result<AgentReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let err = serde_json::from_str::<AgentReply>("<html>").unwrap_err();
            Err(TransportError::InvalidBody(err))
        }
    }

    struct FixedTransport(AgentReply);

    #[async_trait]
    impl ChatTransport for FixedTransport {
        async fn send(&self, _message: &str) -> Result<AgentReply, TransportError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_reply_prefers_response() {
        let reply = AgentReply {
            response: Some("hello".into()),
            error: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(reply.into_message().content, "hello");
    }

    #[test]
    fn test_reply_falls_back_to_error_then_placeholder() {
        let reply = AgentReply {
            response: Some(String::new()),
            error: Some("POST request required".into()),
            ..Default::default()
        };
        assert_eq!(reply.into_message().content, "POST request required");
        assert_eq!(AgentReply::default().into_message().content, "No response");
    }

    #[test]
    fn test_reply_decodes_backend_payload() {
        let body = r#"{
            "response": "- a\n- b",
            "trace": [{"tool": "get_top_news_sites", "input": "france", "output": ["https://lemonde.fr"]}],
            "sources": ["https://lemonde.fr"]
        }"#;
        let reply: AgentReply = serde_json::from_str(body).unwrap();
        let message = reply.into_message();
        assert!(message.is_agent());
        assert_eq!(message.trace.unwrap()[0].tool, "get_top_news_sites");
        assert_eq!(message.sources.unwrap(), vec!["https://lemonde.fr".to_string()]);
    }

    #[test]
    fn test_reply_keeps_response_with_bare_trace_steps() {
        let body = r#"{"response": "hello", "trace": ["get_top_news_sites"]}"#;
        let message = serde_json::from_str::<AgentReply>(body).unwrap().into_message();
        assert_eq!(message.content, "hello");
        let trace = message.agent_trace().unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].tool, "");
        assert_eq!(trace[0].input.to_json_text(), "\"get_top_news_sites\"");
    }

    #[test]
    fn test_reply_drops_non_string_sources() {
        let body = r#"{"response": "hello", "sources": ["https://a.fr", null, 3]}"#;
        let message = serde_json::from_str::<AgentReply>(body).unwrap().into_message();
        assert_eq!(message.content, "hello");
        assert_eq!(message.sources.unwrap(), vec!["https://a.fr".to_string()]);
    }

    #[test]
    fn test_reply_ignores_mistyped_trace_and_sources() {
        let body = r#"{"response": "hello", "trace": "none", "sources": {"a": 1}}"#;
        let message = serde_json::from_str::<AgentReply>(body).unwrap().into_message();
        assert_eq!(message.content, "hello");
        assert!(message.trace.is_none());
        assert!(message.sources.is_none());

        let body = r#"{"response": "hello", "trace": null, "sources": null}"#;
        let reply: AgentReply = serde_json::from_str(body).unwrap();
        assert!(reply.trace.is_none());
        assert!(reply.sources.is_none());
    }

    #[tokio::test]
    async fn test_exchange_failure_appends_single_fallback() {
        let transport = FailingTransport { calls: AtomicUsize::new(0) };
        let mut session = ChatSession::new();

        let text = session.begin_submit("news in france").unwrap();
        let reply = exchange(&transport, &text).await;
        session.complete(reply);

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.len(), 2);
        let last = &session.messages()[1];
        assert!(last.is_agent());
        assert_eq!(last.content, "Error contacting backend.");
        assert!(last.trace.is_none());
        assert!(last.sources.is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_exchange_through_trait_object() {
        let transport: Box<dyn ChatTransport> = Box::new(FixedTransport(AgentReply {
            response: Some("hi".into()),
            sources: Some(vec!["https://example.com/".into()]),
            ..Default::default()
        }));
        let message = exchange(transport.as_ref(), "hello").await;
        assert_eq!(message.content, "hi");
        assert_eq!(message.agent_sources().unwrap().len(), 1);
    }
}
