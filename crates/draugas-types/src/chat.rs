//! Chat operation types: mood selection and operation outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::memory::{ExtractedMemories, RelevantMemories};

/// Caller-selected tone for greetings and reply templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Normal,
    Roast,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mood::Happy => write!(f, "happy"),
            Mood::Sad => write!(f, "sad"),
            Mood::Normal => write!(f, "normal"),
            Mood::Roast => write!(f, "roast"),
        }
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "sad" => Ok(Mood::Sad),
            "normal" => Ok(Mood::Normal),
            "roast" => Ok(Mood::Roast),
            other => Err(format!("invalid mood: '{other}'")),
        }
    }
}

/// Result of `send_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageOutcome {
    pub response: String,
    pub extracted_memories: ExtractedMemories,
    pub relevant_memories: RelevantMemories,
}

/// Result of `start_conversation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStart {
    pub initial_message: String,
}
