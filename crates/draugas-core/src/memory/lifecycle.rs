//! Long-term memory lifecycle policies.
//!
//! Exactly one policy is active per deployment (see `LifecyclePolicy`):
//! - `Migrate` upgrades legacy bare-string entries before every merge.
//! - `Expire` drops items past the retention window after every merge.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use draugas_types::config::LifecyclePolicy;
use draugas_types::memory::{LongTermMemory, MemoryCategory, MemoryItem, StoredEntry};

use super::extractor::context_for;

/// Categories whose legacy entries are upgraded by migration.
pub const MIGRATED_CATEGORIES: [MemoryCategory; 2] =
    [MemoryCategory::Preferences, MemoryCategory::Facts];

/// Upgrade legacy entries in place. Returns how many were migrated.
///
/// A migrated entry becomes a positive structured item whose context is
/// derived at migration time. Structured entries and their order are left
/// untouched, so a second pass is a no-op.
pub fn migrate(memory: &mut LongTermMemory, now: DateTime<Utc>) -> usize {
    let mut migrated = 0;
    for category in MIGRATED_CATEGORIES {
        for entry in memory.get_mut(category).iter_mut() {
            if let StoredEntry::Legacy(content) = entry {
                let context = context_for(content, now);
                *entry = StoredEntry::Structured(MemoryItem {
                    content: std::mem::take(content),
                    is_positive: Some(true),
                    context,
                });
                migrated += 1;
            }
        }
    }
    migrated
}

/// Drop structured items older than `retention`. Returns how many were removed.
///
/// Legacy entries carry no timestamp and are kept.
pub fn expire(memory: &mut LongTermMemory, now: DateTime<Utc>, retention: Duration) -> usize {
    let cutoff = now - retention;
    let mut removed = 0;
    for category in MemoryCategory::ALL {
        let entries = memory.get_mut(category);
        let before = entries.len();
        entries.retain(|entry| match entry {
            StoredEntry::Legacy(_) => true,
            StoredEntry::Structured(item) => item.context.timestamp >= cutoff,
        });
        removed += before - entries.len();
    }
    removed
}

/// Applies the configured policy around a merge.
#[derive(Debug, Clone)]
pub struct MemoryLifecycle {
    policy: LifecyclePolicy,
}

impl MemoryLifecycle {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    /// Runs before candidates are merged.
    pub fn before_merge(&self, memory: &mut LongTermMemory, now: DateTime<Utc>) {
        if let LifecyclePolicy::Migrate = self.policy {
            let migrated = migrate(memory, now);
            if migrated > 0 {
                debug!(migrated, "Migrated legacy memory entries");
            }
        }
    }

    /// Runs after candidates are merged.
    pub fn after_merge(&self, memory: &mut LongTermMemory, now: DateTime<Utc>) {
        if let LifecyclePolicy::Expire { retention_days } = self.policy {
            let removed = expire(memory, now, Duration::days(i64::from(retention_days)));
            if removed > 0 {
                debug!(removed, retention_days, "Expired long-term memory entries");
            }
        }
    }
}
