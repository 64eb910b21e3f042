//! Test doubles shared by the core unit tests.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use draugas_types::error::RepositoryError;
use draugas_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use draugas_types::user::{User, UserId};

use crate::chat::orchestrator::TemplatePicker;
use crate::llm::provider::LlmProvider;
use crate::repository::user::UserRepository;

/// A moderation rejection as the provider reports it.
pub fn blocked() -> Result<String, LlmError> {
    Err(LlmError::ContentBlocked {
        reason: "HARM_CATEGORY_HARASSMENT".to_string(),
    })
}

/// Replays a fixed sequence of results and records every request.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(LlmError::Provider {
                message: "script exhausted".to_string(),
            })
        });
        let delay = self.delay;
        let model = request.model.clone();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            next.map(|content| CompletionResponse {
                content,
                model,
                usage: Usage::default(),
            })
        }
    }
}

/// Picks templates 0, 1, 2, ... in turn.
#[derive(Default)]
pub struct SequencePicker {
    next: AtomicUsize,
}

impl TemplatePicker for SequencePicker {
    fn pick(&self, len: usize) -> usize {
        self.next.fetch_add(1, Ordering::SeqCst) % len
    }
}

/// In-memory user store with the same revision check as the SQLite one.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepositoryError::Conflict(format!(
                "user '{}' already exists",
                user.username
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.get(username))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn save(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let stored = users.get_mut(&user.id).ok_or(RepositoryError::NotFound)?;
        if stored.revision != user.revision {
            return Err(RepositoryError::Conflict(format!(
                "stale revision {} for user {}",
                user.revision, user.id
            )));
        }
        let mut saved = user.clone();
        saved.revision += 1;
        *stored = saved.clone();
        Ok(saved)
    }
}
