//! Long-term memory engine for Draugas.
//!
//! - `extractor`: rule-table extraction of preferences, facts and relationships
//! - `merge`: content-deduplicating merge of candidates into stored entries
//! - `lifecycle`: legacy-entry migration or age-based expiry
//! - `retrieval`: substring relevance with recency ordering

pub mod extractor;
pub mod lifecycle;
pub mod merge;
pub mod retrieval;
