//! Shared domain types for Draugas.
//!
//! This crate contains the core domain types used across the workspace:
//! users and their short-term window, long-term memory items, LLM
//! request/response shapes, configuration, and the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod user;
