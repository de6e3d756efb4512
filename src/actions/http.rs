use async_trait::async_trait;
use serde::Serialize;
use crate::actions::Backend;
use crate::dsl::WorkflowGraph;
use crate::error::DispatchError;
use reqwest::Client;
use tracing::{debug, warn};

/// Wire body of a queue request.
#[derive(Debug, Serialize)]
pub struct PromptPayload<'a> {
    pub prompt: &'a WorkflowGraph,
}

#[derive(Debug)]
pub struct HttpBackend {
    client: Client,
    url: String,
}

impl HttpBackend {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn queue_prompt(&self, graph: &WorkflowGraph) -> Result<(), DispatchError> {
        let response = self.client
            .post(&self.url)
            .json(&PromptPayload { prompt: graph })
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            // Without the body the user has nothing to act on
            let body = response.text().await?;
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match response.text().await {
            Ok(body) => debug!(url = %self.url, status = status.as_u16(), %body, "Prompt queued"),
            Err(e) => warn!(url = %self.url, status = status.as_u16(), error = %e, "Prompt queued, reply unreadable"),
        }
        Ok(())
    }
}
