//! Business logic and repository trait definitions for Draugas.
//!
//! This crate holds the memory engine (extraction, merge, lifecycle,
//! retrieval), reply generation, and the "ports" (repository and provider
//! traits) that the infrastructure layer implements. It depends only on
//! `draugas-types` -- never on `draugas-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod memory;
pub mod repository;

#[cfg(test)]
mod testing;
