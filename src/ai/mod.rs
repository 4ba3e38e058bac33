mod client;
pub mod inference;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Verdict;

pub use client::OpenAiClient;

#[derive(Debug, Error)]
pub enum RemoteClassificationError {
    #[error("OPENAI_API_KEY must be configured for remote link classification")]
    MissingApiKey,
    #[error("request to the classification service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classification service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("classification response did not contain any message content")]
    EmptyResponse,
}

/// Asks an external text-generation service whether a link looks safe.
#[async_trait]
pub trait LinkAssessor: Send + Sync {
    /// Returns the model's trimmed free-text answer.
    async fn assess(&self, link: &str) -> Result<String, RemoteClassificationError>;
}

/// Escalation step of the pipeline. Never fails: any error is logged and
/// degrades to [`Verdict::Unknown`].
pub async fn classify_remote(assessor: &dyn LinkAssessor, link: &str) -> Verdict {
    match assessor.assess(link).await {
        Ok(text) => {
            tracing::info!(target: "classifier", link, answer = %text, "remote verdict received");
            Verdict::Model(text)
        }
        Err(err) => {
            tracing::error!(target: "classifier", link, error = %err, "remote classification failed");
            Verdict::Unknown
        }
    }
}
