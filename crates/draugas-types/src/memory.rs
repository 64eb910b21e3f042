//! Long-term memory types for Draugas.
//!
//! These types model what the agent remembers about a user between
//! conversations: preferences (with polarity), facts, and relationships,
//! each tagged with the context of the utterance they came from.
//!
//! Field names serialize in camelCase so documents written by older
//! deployments (`isPositive`, `messageLength`, `timeOfDay`) load unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Category of a long-term memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    Preferences,
    Facts,
    Relationships,
}

impl MemoryCategory {
    /// All categories in their canonical evaluation order.
    pub const ALL: [MemoryCategory; 3] = [
        MemoryCategory::Preferences,
        MemoryCategory::Facts,
        MemoryCategory::Relationships,
    ];
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryCategory::Preferences => write!(f, "preferences"),
            MemoryCategory::Facts => write!(f, "facts"),
            MemoryCategory::Relationships => write!(f, "relationships"),
        }
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preferences" => Ok(MemoryCategory::Preferences),
            "facts" => Ok(MemoryCategory::Facts),
            "relationships" => Ok(MemoryCategory::Relationships),
            other => Err(format!("invalid memory category: '{other}'")),
        }
    }
}

/// Coarse bucket of the hour at which an utterance was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// Bucket an hour of the day: [0,12) morning, [12,18) afternoon, [18,24) evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Morning => write!(f, "morning"),
            TimeOfDay::Afternoon => write!(f, "afternoon"),
            TimeOfDay::Evening => write!(f, "evening"),
        }
    }
}

/// Where and when a memory item was extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryContext {
    pub timestamp: DateTime<Utc>,
    /// Whitespace-delimited word count of the source utterance.
    pub message_length: u32,
    pub time_of_day: TimeOfDay,
}

/// A single structured long-term memory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryItem {
    pub content: String,
    /// Liked vs. disliked. Only populated for `preferences`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_positive: Option<bool>,
    pub context: MemoryContext,
}

/// A stored long-term entry: either a pre-migration bare string or a
/// structured item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    Legacy(String),
    Structured(MemoryItem),
}

impl StoredEntry {
    /// The remembered text, regardless of representation.
    pub fn content(&self) -> &str {
        match self {
            StoredEntry::Legacy(content) => content,
            StoredEntry::Structured(item) => &item.content,
        }
    }

    /// The structured item, if this entry has been migrated.
    pub fn as_item(&self) -> Option<&MemoryItem> {
        match self {
            StoredEntry::Legacy(_) => None,
            StoredEntry::Structured(item) => Some(item),
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredEntry::Legacy(_))
    }
}

impl From<MemoryItem> for StoredEntry {
    fn from(item: MemoryItem) -> Self {
        StoredEntry::Structured(item)
    }
}

/// One ordered sequence per memory category.
///
/// Serializes as `{"preferences": [...], "facts": [...], "relationships": [...]}`.
/// Missing keys deserialize as empty sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap<T> {
    #[serde(default = "Vec::new")]
    pub preferences: Vec<T>,
    #[serde(default = "Vec::new")]
    pub facts: Vec<T>,
    #[serde(default = "Vec::new")]
    pub relationships: Vec<T>,
}

impl<T> Default for CategoryMap<T> {
    fn default() -> Self {
        Self {
            preferences: Vec::new(),
            facts: Vec::new(),
            relationships: Vec::new(),
        }
    }
}

impl<T> CategoryMap<T> {
    pub fn get(&self, category: MemoryCategory) -> &Vec<T> {
        match category {
            MemoryCategory::Preferences => &self.preferences,
            MemoryCategory::Facts => &self.facts,
            MemoryCategory::Relationships => &self.relationships,
        }
    }

    pub fn get_mut(&mut self, category: MemoryCategory) -> &mut Vec<T> {
        match category {
            MemoryCategory::Preferences => &mut self.preferences,
            MemoryCategory::Facts => &mut self.facts,
            MemoryCategory::Relationships => &mut self.relationships,
        }
    }

    /// Iterate categories in canonical order with their entries.
    pub fn iter(&self) -> impl Iterator<Item = (MemoryCategory, &Vec<T>)> {
        MemoryCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        self.preferences.len() + self.facts.len() + self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A user's persistent long-term memory.
pub type LongTermMemory = CategoryMap<StoredEntry>;

/// Candidates produced by extraction for a single utterance.
pub type ExtractedMemories = CategoryMap<MemoryItem>;

/// Stored items judged relevant to the current utterance.
pub type RelevantMemories = CategoryMap<MemoryItem>;

/// Diagnostic record of one extraction rule firing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub category: MemoryCategory,
    pub pattern: String,
    pub matched: String,
    pub captured: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str) -> MemoryItem {
        MemoryItem {
            content: content.to_string(),
            is_positive: Some(true),
            context: MemoryContext {
                timestamp: Utc::now(),
                message_length: 3,
                time_of_day: TimeOfDay::Morning,
            },
        }
    }

    #[test]
    fn test_memory_category_roundtrip() {
        for cat in MemoryCategory::ALL {
            let parsed: MemoryCategory = cat.to_string().parse().unwrap();
            assert_eq!(cat, parsed);
        }
    }

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Evening);
    }

    #[test]
    fn test_memory_item_uses_camel_case() {
        let json = serde_json::to_string(&item("kava")).unwrap();
        assert!(json.contains("\"isPositive\":true"));
        assert!(json.contains("\"messageLength\":3"));
        assert!(json.contains("\"timeOfDay\":\"morning\""));
    }

    #[test]
    fn test_stored_entry_accepts_legacy_strings() {
        let json = r#"{"preferences": ["kava", {"content": "arbata", "isPositive": false,
            "context": {"timestamp": "2024-01-01T10:00:00Z", "messageLength": 2, "timeOfDay": "morning"}}]}"#;
        let memory: LongTermMemory = serde_json::from_str(json).unwrap();

        assert_eq!(memory.preferences.len(), 2);
        assert_eq!(memory.preferences[0], StoredEntry::Legacy("kava".to_string()));
        assert_eq!(memory.preferences[1].content(), "arbata");
        assert_eq!(memory.preferences[1].as_item().unwrap().is_positive, Some(false));
        assert!(memory.facts.is_empty());
        assert!(memory.relationships.is_empty());
    }

    #[test]
    fn test_category_map_accessors() {
        let mut map: ExtractedMemories = CategoryMap::default();
        map.get_mut(MemoryCategory::Facts).push(item("Vilniaus"));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(MemoryCategory::Facts)[0].content, "Vilniaus");
        let order: Vec<MemoryCategory> = map.iter().map(|(c, _)| c).collect();
        assert_eq!(order, MemoryCategory::ALL.to_vec());
    }
}
