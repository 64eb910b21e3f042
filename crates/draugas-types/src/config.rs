//! Global configuration types for Draugas.
//!
//! `AppConfig` represents the top-level `config.toml` in the data directory.
//! Every field has a default, so an empty or missing file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// Optional JSON file replacing the built-in slang dictionary.
    #[serde(default)]
    pub slang_path: Option<PathBuf>,
}

/// Which long-term memory lifecycle runs around each merge.
///
/// Exactly one policy is active; they are not combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum LifecyclePolicy {
    /// Upgrade legacy bare-string entries in place; never delete.
    Migrate,
    /// Drop items older than the retention window; no migration.
    Expire {
        #[serde(default = "default_retention_days")]
        retention_days: u32,
    },
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        LifecyclePolicy::Migrate
    }
}

fn default_retention_days() -> u32 {
    30
}

/// Memory engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Short-term window bound applied on the chat path.
    #[serde(default = "default_window_bound")]
    pub window_bound: usize,

    /// Short-term window bound applied when a greeting is recorded.
    #[serde(default = "default_greeting_window_bound")]
    pub greeting_window_bound: usize,

    /// Record the user's own utterance in the window alongside the reply.
    #[serde(default = "default_true")]
    pub record_user_turns: bool,

    #[serde(default)]
    pub lifecycle: LifecyclePolicy,
}

fn default_window_bound() -> usize {
    5
}

fn default_greeting_window_bound() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            window_bound: default_window_bound(),
            greeting_window_bound: default_greeting_window_bound(),
            record_user_turns: true,
            lifecycle: LifecyclePolicy::default(),
        }
    }
}

/// Generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderType,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override the provider endpoint (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Total attempts on moderation rejection, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_greeting_max_tokens")]
    pub greeting_max_tokens: u32,

    /// Upper bound for a single provider call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> ProviderType {
    ProviderType::Gemini
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_greeting_max_tokens() -> u32 {
    50
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key_env: default_api_key_env(),
            max_attempts: default_max_attempts(),
            greeting_max_tokens: default_greeting_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
