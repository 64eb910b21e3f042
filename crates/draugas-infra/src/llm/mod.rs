//! LLM provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined
//! in `draugas-core`, plus a factory ([`create_provider`]) that builds the
//! configured provider.
//!
//! [`LlmProvider`]: draugas_core::llm::provider::LlmProvider

pub mod gemini;

use secrecy::SecretString;

use draugas_core::llm::box_provider::BoxLlmProvider;
use draugas_types::config::GenerationConfig;
use draugas_types::llm::{LlmError, ProviderType};

use self::gemini::GeminiProvider;

/// Create a [`BoxLlmProvider`] from the generation settings.
///
/// # Errors
///
/// Returns `AuthenticationFailed` when no API key is available.
pub fn create_provider(
    config: &GenerationConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    match config.provider {
        ProviderType::Gemini => {
            let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
            let mut provider = GeminiProvider::new(key, config.model.clone(), config.timeout_secs)?;
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_gemini() {
        let provider =
            create_provider(&GenerationConfig::default(), Some(SecretString::from("key".to_string()))).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_create_provider_missing_key() {
        match create_provider(&GenerationConfig::default(), None) {
            Err(LlmError::AuthenticationFailed) => {}
            Err(other) => panic!("Expected AuthenticationFailed, got: {other}"),
            Ok(_) => panic!("Expected error but got Ok"),
        }
    }
}
