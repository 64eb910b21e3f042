//! Configuration loading for Draugas.
//!
//! Reads `config.toml` from the data directory (`~/.draugas/` in production)
//! and deserializes it into [`AppConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use draugas_types::config::AppConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DRAUGAS_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `DRAUGAS_DATA_DIR` environment variable
/// 2. `~/.draugas`
/// 3. `.draugas` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".draugas");
    }

    PathBuf::from(".draugas")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`AppConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Read the API key from the named environment variable.
///
/// Empty and non-Unicode values count as absent.
pub fn api_key_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use draugas_types::config::LifecyclePolicy;
    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.memory.window_bound, 5);
        assert_eq!(config.generation.max_attempts, 3);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
slang_path = "/etc/draugas/slang.json"

[memory.lifecycle]
policy = "expire"
retention_days = 7

[generation]
max_attempts = 5
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.memory.lifecycle, LifecyclePolicy::Expire { retention_days: 7 });
        assert_eq!(config.generation.max_attempts, 5);
        assert_eq!(config.slang_path, Some(PathBuf::from("/etc/draugas/slang.json")));
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.memory.lifecycle, LifecyclePolicy::Migrate);
    }

    #[test]
    fn test_resolve_data_dir_and_api_key_from_env() {
        // SAFETY: These variables are only touched by this test.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-draugas");
            std::env::set_var("DRAUGAS_TEST_KEY", "secret-value");
            std::env::set_var("DRAUGAS_TEST_EMPTY", "  ");
        }
        assert_eq!(resolve_data_dir(), PathBuf::from("/tmp/test-draugas"));
        assert_eq!(
            api_key_from_env("DRAUGAS_TEST_KEY").unwrap().expose_secret(),
            "secret-value"
        );
        assert!(api_key_from_env("DRAUGAS_TEST_EMPTY").is_none());
        assert!(api_key_from_env("DRAUGAS_TEST_MISSING").is_none());
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
            std::env::remove_var("DRAUGAS_TEST_KEY");
            std::env::remove_var("DRAUGAS_TEST_EMPTY");
        }
    }
}
