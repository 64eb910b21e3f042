//! Infrastructure layer for Draugas.
//!
//! Contains implementations of the ports defined in `draugas-core`: SQLite
//! user storage, the Gemini generation provider, and configuration loading.

pub mod config;
pub mod llm;
pub mod sqlite;
