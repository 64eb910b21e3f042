//! Merge extracted candidates into a user's long-term memory.
//!
//! Entries are concatenated (existing first, then incoming) and deduplicated
//! by exact `content`, keeping the first occurrence. An existing entry
//! therefore always wins over an incoming duplicate.

use std::collections::HashSet;

use draugas_types::memory::{ExtractedMemories, LongTermMemory, MemoryCategory, MemoryItem, StoredEntry};

/// Merge one category's incoming candidates into its existing entries.
pub fn merge(existing: &[StoredEntry], incoming: &[MemoryItem]) -> Vec<StoredEntry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + incoming.len());

    existing
        .iter()
        .cloned()
        .chain(incoming.iter().cloned().map(StoredEntry::from))
        .filter(|entry| seen.insert(entry.content().to_string()))
        .collect()
}

/// Merge every category of `extracted` into `memory` in place.
///
/// Categories without incoming candidates are left untouched. Returns the
/// number of entries actually added.
pub fn merge_into(memory: &mut LongTermMemory, extracted: &ExtractedMemories) -> usize {
    let mut added = 0;
    for category in MemoryCategory::ALL {
        let incoming = extracted.get(category);
        if incoming.is_empty() {
            continue;
        }
        let entries = memory.get_mut(category);
        let before = entries.len();
        *entries = merge(entries, incoming);
        added += entries.len().saturating_sub(before);
    }
    added
}
