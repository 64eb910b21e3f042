//! HTTP/REST API layer for Draugas.
//!
//! Axum-based REST API at `/api/` with envelope response format and CORS
//! support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
