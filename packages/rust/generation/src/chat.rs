//! OpenAI-compatible chat completions client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use meetingprep_shared::{GenerationConfig, MeetingPrepError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{Generation, TextGenerator};

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("MeetingPrep/", env!("CARGO_PKG_VERSION"));

/// Connection and sampling settings for [`ChatCompletionsClient`].
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
}

impl From<&GenerationConfig> for ChatOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat completions client; every prompt is sent as a single user message.
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    options: ChatOptions,
}

impl ChatCompletionsClient {
    /// Build a client. Fails only if the HTTP stack cannot be initialised.
    pub fn new(api_key: impl Into<String>, options: ChatOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| {
                MeetingPrepError::Network(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            options,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.options.base_url.trim_end_matches('/')
        )
    }

    fn map_transport_error(&self, e: reqwest::Error) -> MeetingPrepError {
        if e.is_timeout() {
            MeetingPrepError::Timeout {
                service: "generation",
                secs: self.options.timeout_secs,
            }
        } else {
            MeetingPrepError::Network(format!("generation request failed: {e}"))
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    #[instrument(skip_all, fields(model = %self.options.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let start = Instant::now();
        let request = ChatCompletionRequest {
            model: &self.options.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(200).collect();
            return Err(MeetingPrepError::Generation(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_transport_error(e)
            } else {
                MeetingPrepError::Generation(format!("invalid completion response: {e}"))
            }
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                MeetingPrepError::Generation("completion response contained no content".into())
            })?;

        let (tokens_in, tokens_out) = parsed
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        let latency_ms = start.elapsed().as_millis() as u64;

        debug!(tokens_in, tokens_out, latency_ms, "generation complete");

        Ok(Generation {
            text,
            model: parsed.model.unwrap_or_else(|| self.options.model.clone()),
            tokens_in,
            tokens_out,
            latency_ms,
        })
    }

    fn model(&self) -> &str {
        &self.options.model
    }
}
