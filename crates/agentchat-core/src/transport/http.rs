use async_trait::async_trait;
use reqwest::Client;

use super::{AgentReply, AgentRequest, ChatTransport, TransportError};

/// Posts messages to the agent backend as JSON.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<AgentReply, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, chars = message.chars().count(), "posting message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AgentRequest { message })
            .send()
            .await?;

        // Error statuses still carry a JSON body (`{"error": ...}`) worth showing.
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("agent backend answered with status {}", status);
        }

        let body = response.bytes().await?;
        let reply: AgentReply = serde_json::from_slice(&body)?;
        Ok(reply)
    }
}
