//! Conversation handling for Draugas.
//!
//! `ChatService` runs the per-request pipeline; `GenerationOrchestrator`
//! owns prompt assembly, moderation retry and the slang pass.

pub mod orchestrator;
pub mod prompt;
pub mod service;
pub mod slang;
