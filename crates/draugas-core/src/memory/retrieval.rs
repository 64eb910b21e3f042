//! Relevance retrieval over a user's long-term memory.
//!
//! An item is relevant when its lowercased content appears as a substring of
//! the lowercased utterance. No tokenization or fuzzy matching; per-user
//! memory is small enough that a linear scan per request is fine.

use draugas_types::memory::{LongTermMemory, MemoryCategory, RelevantMemories};

/// Select the stored items relevant to `utterance`, most recent first.
///
/// Ties keep their stored order. Legacy (unmigrated) entries have no
/// timestamp and are never returned.
pub fn retrieve(memory: &LongTermMemory, utterance: &str) -> RelevantMemories {
    let haystack = utterance.to_lowercase();
    let mut relevant = RelevantMemories::default();

    for category in MemoryCategory::ALL {
        let mut matches: Vec<_> = memory
            .get(category)
            .iter()
            .filter_map(|entry| entry.as_item())
            .filter(|item| haystack.contains(&item.content.to_lowercase()))
            .cloned()
            .collect();
        // sort_by is stable, so equal timestamps keep insertion order.
        matches.sort_by(|a, b| b.context.timestamp.cmp(&a.context.timestamp));
        *relevant.get_mut(category) = matches;
    }

    relevant
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use draugas_types::memory::{MemoryContext, MemoryItem, StoredEntry, TimeOfDay};

    fn entry(content: &str, age_hours: i64) -> StoredEntry {
        StoredEntry::Structured(MemoryItem {
            content: content.to_string(),
            is_positive: Some(true),
            context: MemoryContext {
                timestamp: Utc::now() - Duration::hours(age_hours),
                message_length: 1,
                time_of_day: TimeOfDay::Morning,
            },
        })
    }

    #[test]
    fn test_orders_matches_most_recent_first() {
        let mut memory = LongTermMemory::default();
        memory.preferences = vec![entry("kava", 48), entry("pienas", 1), entry("cukrus", 12)];

        let relevant = retrieve(&memory, "Kava su pienas ir cukrus");

        let contents: Vec<&str> = relevant.preferences.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["pienas", "cukrus", "kava"]);
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let mut memory = LongTermMemory::default();
        memory.facts = vec![entry("Vilniuje", 1), entry("Kaune", 1)];

        let relevant = retrieve(&memory, "ar šiandien VILNIUJE lyja?");

        assert_eq!(relevant.facts.len(), 1);
        assert_eq!(relevant.facts[0].content, "Vilniuje");
    }

    #[test]
    fn test_no_matches_gives_empty_categories() {
        let mut memory = LongTermMemory::default();
        memory.relationships = vec![entry("Tomas", 1)];

        let relevant = retrieve(&memory, "labas");

        assert!(relevant.is_empty());
    }

    #[test]
    fn test_legacy_entries_are_skipped() {
        let mut memory = LongTermMemory::default();
        memory.relationships = vec![StoredEntry::Legacy("Tomas".to_string())];

        assert!(retrieve(&memory, "Tomas atvažiuoja").relationships.is_empty());
    }

    #[test]
    fn test_equal_timestamps_keep_stored_order() {
        let shared = entry("a", 5);
        let StoredEntry::Structured(first) = shared.clone() else { unreachable!() };
        let mut second = first.clone();
        second.content = "b".to_string();

        let mut memory = LongTermMemory::default();
        memory.facts = vec![StoredEntry::Structured(first), StoredEntry::Structured(second)];

        let relevant = retrieve(&memory, "a b");
        let contents: Vec<&str> = relevant.facts.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn test_retrieval_is_idempotent() {
        let mut memory = LongTermMemory::default();
        memory.preferences = vec![entry("kava", 3), entry("arbata", 2)];

        let first = retrieve(&memory, "kava ar arbata?");
        let second = retrieve(&memory, "kava ar arbata?");

        assert_eq!(first, second);
    }
}
