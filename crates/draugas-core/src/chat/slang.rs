//! Slang substitution over generated replies.
//!
//! The dictionary maps an informal word to its canonical form. The pass runs
//! the other way: any token whose core equals a canonical value is replaced
//! by the informal word listed first for it. Loaded once at startup and
//! shared read-only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;
use thiserror::Error;

const BUILTIN_DICTIONARY: &str = include_str!("../../assets/slang.json");

/// Characters stripped from both token ends before lookup.
const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')'];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").expect("token pattern must compile"));

#[derive(Debug, Error)]
pub enum SlangError {
    #[error("failed to read slang dictionary: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid slang dictionary: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SlangEntry {
    slang: String,
    canonical: String,
}

/// Canonical word -> informal replacement.
#[derive(Debug, Clone, Default)]
pub struct SlangDictionary {
    replacements: HashMap<String, String>,
}

impl SlangDictionary {
    /// The dictionary compiled into the binary.
    pub fn builtin() -> Self {
        // Covered by tests; a malformed asset cannot ship.
        Self::from_json(BUILTIN_DICTIONARY).expect("built-in slang dictionary must parse")
    }

    /// Parse a `[{"slang": ..., "canonical": ...}]` document.
    ///
    /// When several entries share a canonical value the first one wins.
    pub fn from_json(json: &str) -> Result<Self, SlangError> {
        let entries: Vec<SlangEntry> = serde_json::from_str(json)?;
        let mut replacements = HashMap::with_capacity(entries.len());
        for entry in entries {
            replacements.entry(entry.canonical).or_insert(entry.slang);
        }
        Ok(Self { replacements })
    }

    pub fn from_path(path: &Path) -> Result<Self, SlangError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the override at `path` if given, otherwise the built-in dictionary.
    pub fn load(path: Option<&Path>) -> Result<Self, SlangError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Informal replacement for an exact canonical word.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.replacements.get(word).map(String::as_str)
    }

    /// Rewrite `text`, keeping all whitespace and each token's surrounding
    /// punctuation as emitted.
    pub fn apply(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        TOKEN
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                let core = token.trim_matches(PUNCTUATION);
                match self.lookup(core) {
                    Some(slang) if !core.is_empty() => {
                        let start = token.len() - token.trim_start_matches(PUNCTUATION).len();
                        let end = start + core.len();
                        format!("{}{slang}{}", &token[..start], &token[end..])
                    }
                    _ => token.to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> SlangDictionary {
        SlangDictionary::from_json(
            r#"[
                {"slang": "jo", "canonical": "taip"},
                {"slang": "dzin", "canonical": "nesvarbu"},
                {"slang": "pofig", "canonical": "nesvarbu"},
                {"slang": "faina", "canonical": "puiku"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_builtin_dictionary_parses() {
        let dictionary = SlangDictionary::builtin();
        assert!(!dictionary.is_empty());
        assert_eq!(dictionary.lookup("taip"), Some("jo"));
    }

    #[test]
    fn test_first_key_wins_for_shared_canonical() {
        assert_eq!(dictionary().lookup("nesvarbu"), Some("dzin"));
        assert_eq!(dictionary().len(), 3);
    }

    #[test]
    fn test_apply_keeps_punctuation_and_whitespace() {
        let out = dictionary().apply("Taip, taip!  Tai (puiku).\nnesvarbu");
        assert_eq!(out, "Taip, jo!  Tai (faina).\ndzin");
    }

    #[test]
    fn test_apply_matches_exactly() {
        // Case and inflection differences are not matched.
        assert_eq!(dictionary().apply("Puiku puikus"), "Puiku puikus");
    }

    #[test]
    fn test_apply_ignores_punctuation_only_tokens() {
        assert_eq!(dictionary().apply("... ?! taip"), "... ?! jo");
    }

    #[test]
    fn test_empty_dictionary_is_identity() {
        let text = "  labas,   taip ";
        assert_eq!(SlangDictionary::default().apply(text), text);
    }

    #[test]
    fn test_from_path_and_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slang.json");
        std::fs::write(&path, r#"[{"slang": "ok", "canonical": "gerai"}]"#).unwrap();
        let loaded = SlangDictionary::load(Some(&path)).unwrap();
        assert_eq!(loaded.apply("gerai."), "ok.");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(SlangDictionary::from_path(&path), Err(SlangError::Parse(_))));
    }
}
