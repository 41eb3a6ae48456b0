use crate::core::pipeline::NotifyTransport;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors from the outbound message transport. The pipeline converts these
/// to a `DispatchOutcome`; they never surface to the caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail gateway returned HTTP {status}")]
    Gateway { status: u16 },

    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// HTTP client for the outbound mail gateway
///
/// Best-effort only: one bounded attempt per message, no retries. Failed
/// sends are the pipeline's problem to log, not to propagate.
pub struct MailGateway {
    base_url: String,
    api_key: String,
    sender: String,
    client: Client,
}

impl MailGateway {
    pub fn new(base_url: String, api_key: String, sender: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            sender,
            client,
        }
    }
}

#[async_trait]
impl NotifyTransport for MailGateway {
    async fn send(&self, address: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        if address.trim().is_empty() || !address.contains('@') {
            return Err(DispatchError::InvalidAddress(address.to_string()));
        }

        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));

        let payload = serde_json::json!({
            "from": self.sender,
            "to": address,
            "subject": subject,
            "body": body,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DispatchError::Gateway {
                status: response.status().as_u16(),
            });
        }

        tracing::debug!("Dispatched notification to {}", address);

        Ok(())
    }
}
