/// LLM Client: the single point of entry for all generative model calls in the tailoring service.
///
/// ARCHITECTURAL RULE: No other module may call the model API directly.
/// Components depend on the `TextGenerator` trait and receive an
/// `Option<Arc<dyn TextGenerator>>` at construction; `None` means no credential
/// is configured and every caller must take its degraded path.
///
/// Model: claude-sonnet-4-5 (fixed, not configurable)
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all generative calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Sampling knobs forwarded to the model. `None` leaves the provider default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

/// Text returned by a successful call. `text` may be empty; callers decide
/// whether an empty reply is fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: String,
    pub finish_reason: Option<String>,
}

/// A PNG (or other raster) payload sent alongside an instruction.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// The seam every pipeline component talks to.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        options: &GenerationOptions,
    ) -> Result<Generation, LlmError>;

    async fn generate_from_image(
        &self,
        instruction: &str,
        image: &ImageInput,
        options: &GenerationOptions,
    ) -> Result<Generation, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    messages: Vec<AnthropicMessage<'a>>,
}

impl<'a> AnthropicRequest<'a> {
    /// The model accepts only one of `temperature` and `top_p`; when both are
    /// set, `temperature` wins.
    fn new(content: Vec<RequestBlock<'a>>, options: &GenerationOptions) -> Self {
        Self {
            model: MODEL,
            max_tokens: options.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: options.temperature,
            top_p: options.top_p.filter(|_| options.temperature.is_none()),
            top_k: options.top_k,
            messages: vec![AnthropicMessage {
                role: "user",
                content,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    fn into_generation(self) -> Generation {
        Generation {
            text: self.text().unwrap_or_default().to_string(),
            finish_reason: self.stop_reason,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// HTTP-backed generator. Wraps the Messages API with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
        })
    }

    /// Builds the optional backend from an optional credential.
    pub fn from_key(api_key: Option<String>) -> Result<Option<Arc<dyn TextGenerator>>, LlmError> {
        match api_key {
            Some(key) => Ok(Some(Arc::new(Self::new(key)?))),
            None => Ok(None),
        }
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call(
        &self,
        content: Vec<RequestBlock<'_>>,
        options: &GenerationOptions,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest::new(content, options);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}, stop_reason={:?}",
                llm_response.usage.input_tokens,
                llm_response.usage.output_tokens,
                llm_response.stop_reason
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(
        &self,
        instruction: &str,
        options: &GenerationOptions,
    ) -> Result<Generation, LlmError> {
        let response = self
            .call(vec![RequestBlock::Text { text: instruction }], options)
            .await?;
        Ok(response.into_generation())
    }

    async fn generate_from_image(
        &self,
        instruction: &str,
        image: &ImageInput,
        options: &GenerationOptions,
    ) -> Result<Generation, LlmError> {
        let content = vec![
            RequestBlock::Image {
                source: ImageSource {
                    kind: "base64",
                    media_type: &image.media_type,
                    data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                },
            },
            RequestBlock::Text { text: instruction },
        ];
        let response = self.call(content, options).await?;
        Ok(response.into_generation())
    }
}

/// In-memory generator for tests: replays a fixed script and records every prompt.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{Generation, GenerationOptions, ImageInput, LlmError, TextGenerator};

    pub enum Reply {
        Text(&'static str),
        Owned(String),
        Fail,
    }

    #[derive(Default)]
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<Reply>>,
        fallback: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        /// Answers every call with the same text.
        pub fn always(text: &str) -> Self {
            Self {
                fallback: Some(text.to_string()),
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self::new(vec![])
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        fn next(&self, instruction: &str) -> Result<Generation, LlmError> {
            self.prompts.lock().unwrap().push(instruction.to_string());
            let reply = self.replies.lock().unwrap().pop_front();
            let text = match reply {
                Some(Reply::Text(t)) => t.to_string(),
                Some(Reply::Owned(t)) => t,
                Some(Reply::Fail) => return Err(scripted_failure()),
                None => match &self.fallback {
                    Some(t) => t.clone(),
                    None => return Err(scripted_failure()),
                },
            };
            Ok(Generation {
                text,
                finish_reason: Some("end_turn".to_string()),
            })
        }
    }

    fn scripted_failure() -> LlmError {
        LlmError::Api {
            status: 503,
            message: "scripted failure".to_string(),
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            instruction: &str,
            _options: &GenerationOptions,
        ) -> Result<Generation, LlmError> {
            self.next(instruction)
        }

        async fn generate_from_image(
            &self,
            instruction: &str,
            _image: &ImageInput,
            _options: &GenerationOptions,
        ) -> Result<Generation, LlmError> {
            self.next(instruction)
        }
    }

    pub fn backend(generator: &Arc<ScriptedGenerator>) -> Option<Arc<dyn TextGenerator>> {
        Some(generator.clone() as Arc<dyn TextGenerator>)
    }
}
