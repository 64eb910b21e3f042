//! Reply generation with moderation retry and fallback.
//!
//! A moderation rejection is expected and transient: the orchestrator picks
//! a fresh template and tries again, strictly sequentially and without
//! backoff, up to `max_attempts` calls in total. When every attempt is
//! blocked the caller gets `FALLBACK_REPLY` instead of an error. Any other
//! provider failure is returned immediately.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use draugas_types::chat::Mood;
use draugas_types::config::GenerationConfig;
use draugas_types::llm::{CompletionRequest, LlmError, SafetySetting};
use draugas_types::memory::RelevantMemories;
use draugas_types::user::ShortTermWindow;

use super::prompt::{PromptBuilder, templates_for};
use super::slang::SlangDictionary;
use crate::llm::provider::LlmProvider;

/// Reply used once every attempt was rejected by moderation.
pub const FALLBACK_REPLY: &str = "Atsiprašau, šįkart negaliu atsakyti. Pabandykime kitaip!";

/// Chooses which template of a set to use.
pub trait TemplatePicker: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Uniform random selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl TemplatePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Drives the generation service for replies and greetings.
pub struct GenerationOrchestrator<P: LlmProvider> {
    provider: P,
    slang: Arc<SlangDictionary>,
    picker: Box<dyn TemplatePicker>,
    config: GenerationConfig,
}

impl<P: LlmProvider> GenerationOrchestrator<P> {
    pub fn new(provider: P, slang: Arc<SlangDictionary>, config: GenerationConfig) -> Self {
        Self {
            provider,
            slang,
            picker: Box::new(RandomPicker),
            config,
        }
    }

    /// Replace the template picker (deterministic selection in tests).
    pub fn with_picker(mut self, picker: impl TemplatePicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a reply to `message`, then run the slang pass over it.
    ///
    /// The fallback reply is returned verbatim, without the slang pass.
    #[tracing::instrument(skip_all, fields(provider = self.provider.name(), %mood))]
    pub async fn generate_reply(
        &self,
        username: &str,
        message: &str,
        mood: Mood,
        relevant: &RelevantMemories,
        window: &ShortTermWindow,
    ) -> Result<String, LlmError> {
        let templates = templates_for(mood);
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let template = templates[self.picker.pick(templates.len())];
            let personalized = PromptBuilder::personalize(template, username, message);
            let prompt = PromptBuilder::reply(relevant, window, &personalized);

            let mut request = self.request(prompt);
            request.safety_settings = SafetySetting::relaxed();

            match self.call(&request).await {
                Ok(text) => {
                    debug!(attempt, "Reply generated");
                    return Ok(self.slang.apply(&text));
                }
                Err(err) if err.is_moderation_block() => {
                    warn!(attempt, max_attempts, error = %err, "Reply blocked by moderation");
                }
                Err(err) => return Err(err),
            }
        }

        info!(max_attempts, "Moderation retries exhausted, using fallback reply");
        Ok(FALLBACK_REPLY.to_string())
    }

    /// Generate the opening message for a conversation.
    ///
    /// Single attempt with a token cap; errors, moderation included, are
    /// returned to the caller.
    #[tracing::instrument(skip_all, fields(provider = self.provider.name(), %mood))]
    pub async fn generate_greeting(&self, username: &str, mood: Mood) -> Result<String, LlmError> {
        let mut request = self.request(PromptBuilder::greeting(mood, username));
        request.max_tokens = Some(self.config.greeting_max_tokens);
        self.call(&request).await
    }

    fn request(&self, prompt: String) -> CompletionRequest {
        let mut request = CompletionRequest::new(prompt);
        request.model = self.config.model.clone();
        request
    }

    /// One provider call bounded by the configured timeout.
    async fn call(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let limit = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(limit, self.provider.complete(request)).await {
            Ok(result) => result.map(|response| response.content),
            Err(_) => Err(LlmError::Timeout(self.config.timeout_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::prompt::{ROAST_TEMPLATES, STANDARD_TEMPLATES};
    use crate::testing::{ScriptedProvider, SequencePicker, blocked};
    use draugas_types::llm::HarmThreshold;

    fn orchestrator(provider: ScriptedProvider) -> GenerationOrchestrator<ScriptedProvider> {
        let slang = SlangDictionary::from_json(r#"[{"slang": "jo", "canonical": "taip"}]"#).unwrap();
        GenerationOrchestrator::new(provider, Arc::new(slang), GenerationConfig::default())
            .with_picker(SequencePicker::default())
    }

    async fn reply(orchestrator: &GenerationOrchestrator<ScriptedProvider>) -> Result<String, LlmError> {
        orchestrator
            .generate_reply(
                "Ona",
                "kaip sekasi?",
                Mood::Normal,
                &RelevantMemories::default(),
                &ShortTermWindow::new(),
            )
            .await
    }

    #[tokio::test]
    async fn test_succeeds_after_two_moderation_blocks() {
        let provider = ScriptedProvider::new(vec![blocked(), blocked(), Ok("Viskas gerai, taip!".to_string())]);
        let orchestrator = orchestrator(provider);

        let text = reply(&orchestrator).await.unwrap();

        assert_eq!(text, "Viskas gerai, jo!");
        let requests = orchestrator.provider().requests();
        assert_eq!(requests.len(), 3);
        // Each retry reselects the template.
        assert!(requests[0].prompt.starts_with("Speak Lithuanian"));
        assert!(requests[0].prompt.ends_with(&PromptBuilder::personalize(
            STANDARD_TEMPLATES[0],
            "Ona",
            "kaip sekasi?"
        )));
        assert_ne!(requests[0].prompt, requests[1].prompt);
    }

    #[tokio::test]
    async fn test_three_blocks_yield_fallback_verbatim() {
        let provider = ScriptedProvider::new(vec![blocked(), blocked(), blocked()]);
        let orchestrator = orchestrator(provider);

        let text = reply(&orchestrator).await.unwrap();

        assert_eq!(text, FALLBACK_REPLY);
        assert_eq!(orchestrator.provider().requests().len(), 3);
    }

    #[tokio::test]
    async fn test_moderation_detected_from_error_text() {
        let provider = ScriptedProvider::new(vec![
            Err(LlmError::Provider {
                message: "Candidate was blocked due to SAFETY".to_string(),
            }),
            Ok("Labas".to_string()),
        ]);
        let orchestrator = orchestrator(provider);

        assert_eq!(reply(&orchestrator).await.unwrap(), "Labas");
        assert_eq!(orchestrator.provider().requests().len(), 2);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::AuthenticationFailed), Ok("never".to_string())]);
        let orchestrator = orchestrator(provider);

        let err = reply(&orchestrator).await.unwrap_err();

        assert!(matches!(err, LlmError::AuthenticationFailed));
        assert_eq!(orchestrator.provider().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_requests_use_relaxed_safety() {
        let provider = ScriptedProvider::new(vec![Ok("Labas".to_string())]);
        let orchestrator = orchestrator(provider);

        reply(&orchestrator).await.unwrap();

        let request = &orchestrator.provider().requests()[0];
        assert_eq!(request.safety_settings.len(), 4);
        assert!(
            request
                .safety_settings
                .iter()
                .all(|s| s.threshold == HarmThreshold::BlockOnlyHigh)
        );
        assert_eq!(request.model, "gemini-1.5-flash");
        assert_eq!(request.max_tokens, None);
    }

    #[tokio::test]
    async fn test_roast_mood_uses_roast_templates() {
        let provider = ScriptedProvider::new(vec![Ok("Ha".to_string())]);
        let orchestrator = orchestrator(provider);

        orchestrator
            .generate_reply("Ona", "ką veiki?", Mood::Roast, &RelevantMemories::default(), &ShortTermWindow::new())
            .await
            .unwrap();

        let prompt = &orchestrator.provider().requests()[0].prompt;
        let expected = PromptBuilder::personalize(ROAST_TEMPLATES[0], "Ona", "ką veiki?");
        assert!(prompt.ends_with(&expected));
    }

    #[tokio::test]
    async fn test_greeting_has_token_cap_and_no_retry() {
        let provider = ScriptedProvider::new(vec![blocked(), Ok("unused".to_string())]);
        let orchestrator = orchestrator(provider);

        let err = orchestrator.generate_greeting("Ona", Mood::Happy).await.unwrap_err();
        assert!(err.is_moderation_block());

        let requests = orchestrator.provider().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, Some(50));
        assert!(requests[0].prompt.contains("Ona is feeling really good today"));
    }

    #[tokio::test]
    async fn test_greeting_skips_slang_pass() {
        let provider = ScriptedProvider::new(vec![Ok("Labas, taip!".to_string())]);
        let orchestrator = orchestrator(provider);

        let text = orchestrator.generate_greeting("Ona", Mood::Normal).await.unwrap();
        assert_eq!(text, "Labas, taip!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_generation_error() {
        let provider = ScriptedProvider::new(vec![Ok("late".to_string())]).with_delay(Duration::from_secs(120));
        let orchestrator = orchestrator(provider);

        let err = reply(&orchestrator).await.unwrap_err();

        assert!(matches!(err, LlmError::Timeout(60)));
        assert!(!err.is_moderation_block());
    }
}
