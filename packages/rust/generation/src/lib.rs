//! Hosted text generation.
//!
//! Each pipeline step sends one prompt and stores the returned text verbatim.
//! [`ChatCompletionsClient`] talks to any OpenAI-compatible endpoint (Groq by
//! default); tests substitute their own [`TextGenerator`].

mod chat;

use async_trait::async_trait;
use meetingprep_shared::Result;
use serde::{Deserialize, Serialize};

pub use chat::{ChatCompletionsClient, ChatOptions};

/// One completed generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub latency_ms: u64,
}

/// A hosted text generation model. Temperature and timeout are fixed per
/// instance.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the generated text.
    async fn generate(&self, prompt: &str) -> Result<Generation>;

    /// Model identifier for tracing and usage accounting.
    fn model(&self) -> &str;
}
