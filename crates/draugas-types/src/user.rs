//! User aggregate: identity plus both memory tiers.
//!
//! One `User` document per account. The core mutates it in memory during a
//! request and the repository persists it in a single save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::memory::LongTermMemory;

/// Unique identifier for a user, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Who authored a turn in the short-term window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    /// Stored as `"AI"` to match existing documents.
    #[serde(rename = "AI", alias = "agent")]
    Agent,
}

/// One entry of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded FIFO of recent turns, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortTermWindow {
    turns: Vec<Turn>,
}

impl ShortTermWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, then evict from the front until at most `bound` remain.
    pub fn push(&mut self, turn: Turn, bound: usize) {
        self.turns.push(turn);
        if self.turns.len() > bound {
            let excess = self.turns.len() - bound;
            self.turns.drain(..excess);
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// A user account with its memory aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Free-form personality note carried over from older documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    /// Optimistic concurrency token, bumped by every successful save.
    #[serde(default)]
    pub revision: i64,
    #[serde(default)]
    pub short_term_memory: ShortTermWindow,
    #[serde(default)]
    pub long_term_memory: LongTermMemory,
}

impl User {
    /// Create a fresh user with empty memory.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            created_at: Utc::now(),
            personality: None,
            revision: 0,
            short_term_memory: ShortTermWindow::new(),
            long_term_memory: LongTermMemory::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_last_n_in_order() {
        let mut window = ShortTermWindow::new();
        for i in 0..6 {
            window.push(Turn::agent(format!("turn {i}")), 5);
        }

        let texts: Vec<&str> = window.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["turn 1", "turn 2", "turn 3", "turn 4", "turn 5"]);
    }

    #[test]
    fn test_window_smaller_bound_trims_existing() {
        let mut window = ShortTermWindow::new();
        for i in 0..5 {
            window.push(Turn::agent(format!("turn {i}")), 5);
        }
        window.push(Turn::agent("greeting"), 3);

        assert_eq!(window.len(), 3);
        assert_eq!(window.turns()[0].text, "turn 3");
        assert_eq!(window.turns()[2].text, "greeting");
    }

    #[test]
    fn test_sender_serializes_agent_as_ai() {
        let json = serde_json::to_string(&Sender::Agent).unwrap();
        assert_eq!(json, "\"AI\"");
        let parsed: Sender = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(parsed, Sender::Agent);
    }

    #[test]
    fn test_user_id_parse_rejects_garbage() {
        assert!("not-an-id".parse::<UserId>().is_err());
        let id = UserId::new();
        assert_eq!(id.to_string().parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn test_user_document_defaults_missing_memory() {
        let id = UserId::new();
        let json = format!(
            r#"{{"id":"{id}","username":"jonas","email":"j@example.com","created_at":"2024-01-01T00:00:00Z"}}"#
        );
        let user: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user.revision, 0);
        assert!(user.short_term_memory.is_empty());
        assert!(user.long_term_memory.is_empty());
    }
}
