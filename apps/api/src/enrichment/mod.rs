// AI Enrichment Gateway
// Typed, schema-validated operations over the generative-AI provider.
// All provider calls go through llm_client; no direct HTTP calls here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::{Content, LlmError};

pub mod audio;
pub mod gateway;
pub mod handlers;
pub mod limiter;
pub mod operations;
pub mod prompts;
pub mod suitability;

#[cfg(test)]
pub mod testing;

pub use gateway::GenAiGateway;
pub use limiter::CallLimiter;

/// Terminal failure of one gateway call. The gateway never retries these;
/// callers pick a fallback.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("{operation}: provider call failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("{operation}: response failed schema validation: {message}")]
    Schema {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: invalid input: {message}")]
    InvalidInput {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: model returned an empty result")]
    Empty { operation: &'static str },

    #[error("{operation}: timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("enrichment gateway is shut down")]
    Closed,
}

impl EnrichmentError {
    pub fn from_llm(operation: &'static str, err: LlmError) -> Self {
        match err {
            LlmError::Parse(e) => EnrichmentError::Schema {
                operation,
                message: e.to_string(),
            },
            LlmError::EmptyContent => EnrichmentError::Empty { operation },
            source => EnrichmentError::Provider { operation, source },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn to_content(&self) -> Content {
        match self.role {
            ChatRole::User => Content::user_text(&self.content),
            ChatRole::Assistant => Content::model_text(&self.content),
        }
    }
}

/// A post offered to the model as a possible related read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCandidate {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
}

/// The enrichment contract the pipeline depends on.
///
/// Carried in `AppState` as `Arc<dyn EnrichmentGateway>` so tests can inject
/// a scripted implementation.
#[async_trait]
pub trait EnrichmentGateway: Send + Sync {
    /// ~50-word engagement-oriented summary.
    async fn summarize(&self, content: &str) -> Result<String, EnrichmentError>;

    /// 3-5 tags.
    async fn extract_tags(&self, content: &str) -> Result<Vec<String>, EnrichmentError>;

    /// Long-form markdown body for a title.
    async fn generate_content(&self, title: &str, tags: &[String])
        -> Result<String, EnrichmentError>;

    /// Image as a data URI or hosted URL.
    async fn generate_image(&self, topic: &str) -> Result<String, EnrichmentError>;

    /// Speech as a `data:audio/wav;base64,` URI.
    async fn text_to_speech(&self, text: &str) -> Result<String, EnrichmentError>;

    /// 2-3 slugs drawn from `candidates` (only the first 15 are submitted).
    async fn find_related_posts(
        &self,
        current_title: &str,
        current_content: &str,
        candidates: &[RelatedCandidate],
    ) -> Result<Vec<String>, EnrichmentError>;

    /// Tool-augmented chat about the portfolio owner.
    async fn converse(&self, question: &str, history: &[ChatTurn])
        -> Result<String, EnrichmentError>;
}
