//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! `ChatService` is generic over the repository and provider traits; AppState
//! pins it to the SQLite repository and the boxed provider from draugas-infra.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use draugas_core::chat::orchestrator::GenerationOrchestrator;
use draugas_core::chat::service::ChatService;
use draugas_core::chat::slang::SlangDictionary;
use draugas_core::llm::box_provider::BoxLlmProvider;
use draugas_infra::config::{api_key_from_env, load_config, resolve_data_dir};
use draugas_infra::llm::create_provider;
use draugas_infra::sqlite::pool::DatabasePool;
use draugas_infra::sqlite::user::SqliteUserRepository;
use draugas_types::config::AppConfig;

/// Concrete type alias for the chat service pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteUserRepository, BoxLlmProvider>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::open(&data_dir).await?;

        // User and debug commands work without a key; generation calls then
        // fail with an authentication error from the provider.
        let api_key = api_key_from_env(&config.generation.api_key_env).unwrap_or_else(|| {
            tracing::warn!(
                var = %config.generation.api_key_env,
                "API key not set, generation requests will fail"
            );
            SecretString::from(String::new())
        });
        let provider = create_provider(&config.generation, Some(api_key))?;
        let slang = SlangDictionary::load(config.slang_path.as_deref())?;

        Ok(Self::from_parts(config, data_dir, db_pool, provider, slang))
    }

    /// Wire the services from already-constructed parts.
    pub fn from_parts(
        config: AppConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        provider: BoxLlmProvider,
        slang: SlangDictionary,
    ) -> Self {
        let orchestrator =
            GenerationOrchestrator::new(provider, Arc::new(slang), config.generation.clone());
        let chat_service = ChatService::new(
            SqliteUserRepository::new(db_pool.clone()),
            orchestrator,
            config.memory.clone(),
        );

        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
