//! LlmProvider trait definition.
//!
//! This is the core abstraction that every generation backend implements.

use draugas_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for text generation backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Wrap an
/// implementation in `BoxLlmProvider` when the backend is chosen at runtime.
///
/// Implementations live in draugas-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// Moderation rejections should be reported as
    /// `LlmError::ContentBlocked` so callers can retry them.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
