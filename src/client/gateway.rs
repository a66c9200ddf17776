//! HTTP client for the inference gateway.

use crate::config::ConnectionSettings;
use crate::error::GatewayError;
use crate::protocol::{PromptRequest, PromptResponse};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

/// Anything that can turn a prompt into generated text.
#[async_trait]
pub trait PromptSender: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Gateway client holding a configured reqwest client.
pub struct GatewayClient {
    url: Url,
    client: Client,
}

impl GatewayClient {
    /// Create a new client from resolved connection settings.
    pub fn new(settings: &ConnectionSettings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(GatewayError::Build)?;

        Ok(Self {
            url: settings.url.clone(),
            client,
        })
    }

    /// The gateway endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send a prompt and return the generated text.
    pub async fn ask(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!(url = %self.url, chars = prompt.len(), "Sending prompt to gateway");

        let response = self
            .client
            .post(self.url.clone())
            .json(&PromptRequest::new(prompt))
            .send()
            .await
            .map_err(GatewayError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status,
                body: body.trim().to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(GatewayError::Request)?;
        let parsed: PromptResponse = serde_json::from_slice(&bytes).map_err(GatewayError::Decode)?;
        debug!(%status, "Received gateway response");

        parsed.into_text()
    }
}

#[async_trait]
impl PromptSender for GatewayClient {
    async fn send(&self, prompt: &str) -> Result<String, GatewayError> {
        self.ask(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UrlSource;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn settings_for(url: &str) -> ConnectionSettings {
        ConnectionSettings {
            url: Url::parse(url).unwrap(),
            source: UrlSource::Flag,
            verify_tls: true,
            timeout: Duration::from_secs(5),
        }
    }

    async fn create_server_and_client() -> (mockito::ServerGuard, GatewayClient) {
        let server = Server::new_async().await;
        let client = GatewayClient::new(&settings_for(&format!("{}/gemini", server.url()))).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn test_successful_prompt() {
        let (mut server, client) = create_server_and_client().await;

        let mock = server
            .mock("POST", "/gemini")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "prompt": "hello" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "response": "Hi there" }).to_string())
            .create_async()
            .await;

        let text = client.ask("hello").await.unwrap();
        assert_eq!(text, "Hi there");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (mut server, client) = create_server_and_client().await;

        let mock = server
            .mock("POST", "/gemini")
            .with_status(500)
            .with_body("upstream failed\n")
            .create_async()
            .await;

        match client.ask("hello").await {
            Err(GatewayError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "upstream failed");
            }
            other => panic!("Expected status error, got {:?}", other),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bad_request_status() {
        let (mut server, client) = create_server_and_client().await;

        let mock = server
            .mock("POST", "/gemini")
            .with_status(400)
            .create_async()
            .await;

        let err = client.ask("hello").await.unwrap_err();
        assert!(err.to_string().contains("400"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let (mut server, client) = create_server_and_client().await;

        let mock = server
            .mock("POST", "/gemini")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        assert!(matches!(
            client.ask("hello").await,
            Err(GatewayError::Decode(_))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_response_field() {
        let (mut server, client) = create_server_and_client().await;

        let mock = server
            .mock("POST", "/gemini")
            .with_status(200)
            .with_body(json!({ "error": "nope" }).to_string())
            .create_async()
            .await;

        assert!(matches!(
            client.ask("hello").await,
            Err(GatewayError::MissingResponse)
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = GatewayClient::new(&settings_for("http://127.0.0.1:1/gemini")).unwrap();
        assert!(matches!(
            client.ask("hello").await,
            Err(GatewayError::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_insecure_client_builds() {
        let mut settings = settings_for("https://gateway.example/gemini");
        settings.verify_tls = false;
        let client = GatewayClient::new(&settings).unwrap();
        assert_eq!(client.url().scheme(), "https");
    }
}
