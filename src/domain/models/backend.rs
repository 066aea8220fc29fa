#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use super::Message;

/// A snapshot of the full conversation taken at submission time. The backend
/// serializes every turn into the request body, the whole history is the
/// context.
pub struct BackendPrompt {
    pub turns: Vec<Message>,
}

impl BackendPrompt {
    pub fn new(turns: Vec<Message>) -> BackendPrompt {
        return BackendPrompt { turns };
    }
}

/// Failures from a completion request, classified so the session can build a
/// user-facing diagnostic. A well-formed response with no usable text is NOT
/// one of these, that case resolves to a normal reply string.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, DNS, or timeout level failure from the HTTP layer.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status. The message is the endpoint's own error text when it
    /// sent one, otherwise a generic status-coded message.
    #[error("{message}")]
    Endpoint { status: u16, message: String },

    /// The response body was not the JSON shape we expect.
    #[error("Failed to decode the response body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify all configurations are available to work
    /// with the backend.
    async fn health_check(&self) -> Result<()>;

    /// Provides all available models for the backend, used to warn when the
    /// configured model does not exist.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Sends the full conversation to the backend and resolves to the reply
    /// text. Exactly one request per call, no retries, no streaming.
    async fn get_completion(&self, prompt: BackendPrompt) -> Result<String, BackendError>;
}

pub type BackendArc = Arc<dyn Backend + Send + Sync>;
