//! Wire format for the gateway exchange.
//!
//! The gateway accepts a single JSON object per request and answers with a
//! single JSON object. There is no framing beyond one HTTP body each way.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// Request body sent to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    /// The text typed by the user.
    pub prompt: String,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Response body returned by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptResponse {
    /// The generated text. Absent when the gateway misbehaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl PromptResponse {
    /// Extract the generated text.
    pub fn into_text(self) -> Result<String, GatewayError> {
        self.response.ok_or(GatewayError::MissingResponse)
    }
}
