//! Chat endpoints.
//!
//! POST /api/chat                        - handle one user message
//! POST /api/chat/start-conversation     - generate a mood greeting
//!
//! Body fields are optional at the type level so that absent values reach
//! the service and come back as `MISSING_FIELD` rather than a decode error.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use draugas_types::chat::{ConversationStart, SendMessageOutcome};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /api/chat`.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    pub username: Option<String>,
    pub message: Option<String>,
    pub mood: Option<String>,
}

/// Request body for `POST /api/chat/start-conversation`.
#[derive(Debug, Default, Deserialize)]
pub struct StartConversationRequest {
    pub username: Option<String>,
    pub mood: Option<String>,
}

/// POST /api/chat - Extract memories, generate a reply and update the window.
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SendMessageOutcome>>, AppError> {
    let start = Instant::now();
    let Json(body) = body?;

    let outcome = state
        .chat_service
        .send_message(
            body.username.as_deref(),
            body.message.as_deref(),
            body.mood.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::timed(outcome, start)))
}

/// POST /api/chat/start-conversation - Greeting for the chosen mood.
pub async fn start_conversation(
    State(state): State<AppState>,
    body: Result<Json<StartConversationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ConversationStart>>, AppError> {
    let start = Instant::now();
    let Json(body) = body?;

    let greeting = state
        .chat_service
        .start_conversation(body.username.as_deref(), body.mood.as_deref())
        .await?;

    Ok(Json(ApiResponse::timed(greeting, start)))
}
