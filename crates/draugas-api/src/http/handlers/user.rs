//! User endpoints.
//!
//! POST /api/users                       - register a user with empty memory
//! GET  /api/users/{username}/memory     - inspect both memory tiers

use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use draugas_types::memory::LongTermMemory;
use draugas_types::user::{ShortTermWindow, User};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /api/users`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Public view of an account, without its memory.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Both memory tiers of a user.
#[derive(Debug, Serialize)]
pub struct MemoryView {
    pub username: String,
    pub revision: i64,
    pub short_term_memory: ShortTermWindow,
    pub long_term_memory: LongTermMemory,
}

/// POST /api/users - Register a new user.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let start = Instant::now();
    let Json(body) = body?;

    let user = state
        .chat_service
        .register_user(
            body.username.as_deref().unwrap_or_default(),
            body.email.as_deref().unwrap_or_default(),
        )
        .await?;

    let memory_link = format!("/api/users/{}/memory", user.username);
    Ok(Json(
        ApiResponse::timed(UserProfile::from(&user), start).with_link("memory", &memory_link),
    ))
}

/// GET /api/users/{username}/memory - Short-term window and long-term memory.
pub async fn get_memory(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<MemoryView>>, AppError> {
    let start = Instant::now();

    let user = state.chat_service.get_user(&username).await?;

    let view = MemoryView {
        username: user.username,
        revision: user.revision,
        short_term_memory: user.short_term_memory,
        long_term_memory: user.long_term_memory,
    };
    Ok(Json(ApiResponse::timed(view, start)))
}
