//! Error types for gateway calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    /// Connection, TLS or timeout failure.
    #[error("request to gateway failed")]
    Request(#[source] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body was not the expected JSON.
    #[error("invalid response body")]
    Decode(#[source] serde_json::Error),

    /// The JSON body had no `response` field.
    #[error("gateway response has no 'response' field")]
    MissingResponse,
}
