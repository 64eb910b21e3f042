//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends single-prompt requests to `/v1beta/models/{model}:generateContent`
//! with the caller's safety settings and output token cap. Moderation
//! rejections (blocked prompt, or a candidate stopped for safety) are
//! reported as [`LlmError::ContentBlocked`].
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use draugas_core::llm::provider::LlmProvider;
use draugas_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use super::types::{
    GeminiContent, GeminiErrorEnvelope, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig,
};

/// Finish reasons that mean the candidate was withheld by moderation.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Finish reasons under which a candidate may legitimately carry text.
const COMPLETED_FINISH_REASONS: &[&str] = &["STOP", "MAX_TOKENS"];

/// Google Gemini LLM provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl GeminiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    /// Create a new Gemini provider for `model` whose HTTP requests give up
    /// after `timeout_secs`.
    pub fn new(api_key: SecretString, model: String, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model,
            timeout_secs,
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let generation_config = (request.max_tokens.is_some() || request.temperature.is_some())
            .then(|| GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            });

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
            safety_settings: request.safety_settings.clone(),
            generation_config,
        }
    }

    /// Turn a parsed response into text, or the moderation signal.
    fn into_completion(resp: GeminiResponse, fallback_model: &str) -> Result<CompletionResponse, LlmError> {
        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::ContentBlocked { reason });
        }

        let candidate = resp.candidates.into_iter().next().ok_or_else(|| LlmError::Provider {
            message: "response contained no candidates".to_string(),
        })?;

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
        {
            return Err(LlmError::ContentBlocked {
                reason: reason.to_string(),
            });
        }

        let content = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        // A withheld candidate must not pass for an empty reply.
        let finish_reason = candidate.finish_reason.as_deref().unwrap_or("none");
        if content.is_empty() && !COMPLETED_FINISH_REASONS.contains(&finish_reason) {
            return Err(LlmError::Provider {
                message: format!("candidate returned no text (finish reason {finish_reason})"),
            });
        }

        let usage = resp.usage_metadata.unwrap_or_default();
        Ok(CompletionResponse {
            content,
            model: resp.model_version.unwrap_or_else(|| fallback_model.to_string()),
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let body = Self::to_gemini_request(request);

        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Provider {
                        message: format!("HTTP request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&error_body)
                .map(|env| match env.error.status {
                    Some(code) => format!("{code}: {}", env.error.message),
                    None => env.error.message,
                })
                .unwrap_or(error_body);
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited {
                    retry_after_ms: None,
                },
                400 => LlmError::InvalidRequest(message),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {message}"),
                },
            });
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Self::into_completion(gemini_resp, model)
    }
}
