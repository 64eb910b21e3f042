//! Chat service: the request-level memory pipeline.
//!
//! `send_message` runs extraction, lifecycle, merge, retrieval, generation
//! and the window update in that order, then saves the user document once.
//! Nothing is written when an earlier step fails, so an aborted request
//! leaves the stored user untouched (and loses that turn's memories).

use chrono::Utc;
use tracing::{info, warn};

use draugas_types::chat::{ConversationStart, Mood, SendMessageOutcome};
use draugas_types::config::MemoryConfig;
use draugas_types::error::{ChatError, RepositoryError};
use draugas_types::user::{Turn, User, UserId};

use super::orchestrator::GenerationOrchestrator;
use crate::llm::provider::LlmProvider;
use crate::memory::extractor::PatternExtractor;
use crate::memory::lifecycle::MemoryLifecycle;
use crate::memory::merge::merge_into;
use crate::memory::retrieval::retrieve;
use crate::repository::user::UserRepository;

/// Orchestrates user lookup, the memory engine and reply generation.
///
/// Generic over `UserRepository` and `LlmProvider` so draugas-core never
/// depends on draugas-infra.
pub struct ChatService<R: UserRepository, P: LlmProvider> {
    repo: R,
    extractor: PatternExtractor,
    lifecycle: MemoryLifecycle,
    orchestrator: GenerationOrchestrator<P>,
    config: MemoryConfig,
}

impl<R: UserRepository, P: LlmProvider> ChatService<R, P> {
    pub fn new(repo: R, orchestrator: GenerationOrchestrator<P>, config: MemoryConfig) -> Self {
        Self {
            repo,
            extractor: PatternExtractor::new(),
            lifecycle: MemoryLifecycle::new(config.lifecycle.clone()),
            orchestrator,
            config,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator<P> {
        &self.orchestrator
    }

    pub fn extractor(&self) -> &PatternExtractor {
        &self.extractor
    }

    /// Handle one user utterance and produce the agent's reply.
    ///
    /// `mood` defaults to `normal` when absent.
    #[tracing::instrument(skip_all, fields(username = username.unwrap_or_default(), mood = ?mood))]
    pub async fn send_message(
        &self,
        username: Option<&str>,
        message: Option<&str>,
        mood: Option<&str>,
    ) -> Result<SendMessageOutcome, ChatError> {
        let username = required("username", username)?;
        let message = required("message", message)?;
        let mood = match mood.map(str::trim).filter(|m| !m.is_empty()) {
            Some(raw) => parse_mood(raw)?,
            None => Mood::Normal,
        };

        let mut user = self.load_by_username(username).await?;
        let now = Utc::now();

        let extracted = self.extractor.extract(message, now);
        let memory = &mut user.long_term_memory;
        self.lifecycle.before_merge(memory, now);
        let added = merge_into(memory, &extracted);
        self.lifecycle.after_merge(memory, now);
        let relevant = retrieve(memory, message);

        let response = self
            .orchestrator
            .generate_reply(&user.username, message, mood, &relevant, &user.short_term_memory)
            .await?;

        let bound = self.config.window_bound;
        if self.config.record_user_turns {
            user.short_term_memory.push(Turn::user(message), bound);
        }
        user.short_term_memory.push(Turn::agent(response.clone()), bound);

        self.repo.save(&user).await?;
        info!(
            added,
            relevant = relevant.len(),
            window = user.short_term_memory.len(),
            "Message handled"
        );

        Ok(SendMessageOutcome {
            response,
            extracted_memories: extracted,
            relevant_memories: relevant,
        })
    }

    /// Generate a mood-specific greeting and record it in the window.
    #[tracing::instrument(skip_all, fields(username = username.unwrap_or_default(), mood = ?mood))]
    pub async fn start_conversation(
        &self,
        username: Option<&str>,
        mood: Option<&str>,
    ) -> Result<ConversationStart, ChatError> {
        let username = required("username", username)?;
        let mood = parse_mood(required("mood", mood)?)?;

        let user = self.load_by_username(username).await?;
        let initial_message = self
            .orchestrator
            .generate_greeting(&user.username, mood)
            .await?;

        self.record_agent_turn(
            &user.id.to_string(),
            &initial_message,
            self.config.greeting_window_bound,
        )
        .await?;

        Ok(ConversationStart { initial_message })
    }

    /// Append an agent turn to a user's window by id, applying `bound`.
    pub async fn record_agent_turn(
        &self,
        user_id: &str,
        text: &str,
        bound: usize,
    ) -> Result<(), ChatError> {
        let id: UserId = user_id
            .trim()
            .parse()
            .map_err(|_| ChatError::InvalidId(user_id.to_string()))?;

        let mut user = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ChatError::UserNotFound(user_id.to_string()))?;

        user.short_term_memory.push(Turn::agent(text), bound);
        self.repo.save(&user).await?;
        Ok(())
    }

    /// Create an account with empty memory.
    #[tracing::instrument(skip(self, email))]
    pub async fn register_user(&self, username: &str, email: &str) -> Result<User, ChatError> {
        let username = required("username", Some(username))?;
        let email = required("email", Some(email))?;

        match self.repo.create(&User::new(username, email)).await {
            Ok(user) => {
                info!(user_id = %user.id, "User registered");
                Ok(user)
            }
            Err(RepositoryError::Conflict(reason)) => {
                warn!(%reason, "User registration conflict");
                Err(ChatError::UserConflict(username.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<User, ChatError> {
        let username = required("username", Some(username))?;
        self.load_by_username(username).await
    }

    async fn load_by_username(&self, username: &str) -> Result<User, ChatError> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| ChatError::UserNotFound(username.to_string()))
    }
}

/// Reject absent or blank input.
fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ChatError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ChatError::MissingField(field)),
    }
}

fn parse_mood(raw: &str) -> Result<Mood, ChatError> {
    raw.parse().map_err(|_| ChatError::InvalidMood(raw.to_string()))
}
