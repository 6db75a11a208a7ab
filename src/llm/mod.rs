pub mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;
use thiserror::Error;

/// Any failure reaching or receiving from the model service.
///
/// The variants only refine the message; callers treat every one of them as
/// the same terminal failure for the request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("model service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("generation task failed: {0}")]
    Task(String),
}

/// Sends a prompt to a text-generation model and returns its text
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Human readable name of the backing model (shown in the status line)
    fn model(&self) -> &str;
}
