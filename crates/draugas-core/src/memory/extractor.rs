//! Rule-based memory extraction from a single user utterance.
//!
//! `PatternExtractor` evaluates a fixed, ordered rule table against the
//! utterance. Every rule that matches contributes one candidate built from
//! its first capture group; there is no early exit, so one utterance can fill
//! several categories and several items per category.
//!
//! Preference polarity is utterance-scoped: if any negation marker appears
//! anywhere in the utterance, every preference extracted from it is negative.

use std::sync::LazyLock;

use chrono::{DateTime, Local, Timelike, Utc};
use regex::Regex;

use draugas_types::memory::{
    ExtractedMemories, MemoryCategory, MemoryContext, MemoryItem, PatternMatch, TimeOfDay,
};

/// One row of the extraction table.
#[derive(Debug)]
pub struct ExtractionRule {
    pub category: MemoryCategory,
    pub pattern: Regex,
    /// Whether candidates from this rule carry a polarity.
    pub has_sentiment: bool,
}

impl ExtractionRule {
    fn new(category: MemoryCategory, pattern: &str) -> Self {
        Self {
            category,
            // The table is static and covered by tests; a bad pattern is a build defect.
            pattern: Regex::new(pattern).expect("extraction rule must compile"),
            has_sentiment: category == MemoryCategory::Preferences,
        }
    }
}

const PREFERENCE_PATTERNS: &[&str] = &[
    r"(?i)(?:mano favoritas|aš teikiu pirmenybę|mano pasirinkimas yra) (.+)",
    r"(?i)(?:man )?(?:labai )?(?:patinka|mėgstu|dievinu|esu didelis gerbėjas|esate nuostabūs|esate puikus|esate mano favoritas) (.+)",
    r"(?i)aš (?:absoliučiai )?(?:myliu|dievinau|nekenčiu|nemėgstu|niekada nemėgčiau) (.+)",
    r"(?i)man (?:visiškai )?nepatinka (.+)",
    r"(?i)negalėčiau įsivaizduoti gyvenimo be (.+)",
    r"(?i)mano mėgstamiausias dalykas yra (.+)",
    r"(?i)negaliu pakęsti (.+)",
    r"(?i)aš norėčiau daugiau (.+)",
];

const FACT_PATTERNS: &[&str] = &[
    r"(?i)Aš (?:esu iš|gyvenu|šiuo metu esu) (.+)",
    r"(?i)Mano (?:amžius|vardas|gimtadienis) (?:yra)? (.+)",
    r"(?i)Aš dirbu (?:kaip|pagal profesiją) (.+)",
    r"(?i)Aš turiu (.+)",
    r"(?i)Mano mėgstamiausia spalva (?:yra)? (.+)",
    r"(?i)Man patinka (.+)",
    r"(?i)Mano hobis (?:yra|yra hobis) (.+)",
    r"(?i)Aš užsiimu (.+)",
];

const RELATIONSHIP_PATTERNS: &[&str] = &[
    r"(?i)Mano (?:brolis|sesuo|mama|tėtis|partneris|draugas|kolegė|žmona|vyras) (?:yra|buvo)? ?(.+)",
    r"(?i)Mano (?:brolis|sesuo|mama|tėtis|partneris|draugas|kolega|šeimos narys) (?:vardu)? (.+)",
    r"(?i)(?:Turiu|Yra) (?:brolį|seserį|mamą|tėtį|partnerį|draugą|kolegos) (?:vardu )?(.+)",
    r"(?i)mano artimas žmogus (?:yra|vardu) (.+)",
    r"(?i)mano draugas (?:yra|vardu)? (.+)",
    r"(?i)mano komandos narys (?:yra)? (.+)",
];

/// Substrings that flip every preference in the utterance to negative.
pub const NEGATION_MARKERS: &[&str] = &["ne", "niekada", "nenoriu", "nemėgstu", "nekenčiu", "nepatinka"];

static DEFAULT_RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    let table = [
        (MemoryCategory::Preferences, PREFERENCE_PATTERNS),
        (MemoryCategory::Facts, FACT_PATTERNS),
        (MemoryCategory::Relationships, RELATIONSHIP_PATTERNS),
    ];
    table
        .into_iter()
        .flat_map(|(category, patterns)| {
            patterns
                .iter()
                .map(move |pattern| ExtractionRule::new(category, pattern))
        })
        .collect()
});

/// Build the extraction context for an utterance received at `now`.
///
/// The time-of-day bucket uses the server's local hour.
pub fn context_for(utterance: &str, now: DateTime<Utc>) -> MemoryContext {
    MemoryContext {
        timestamp: now,
        message_length: utterance.split_whitespace().count() as u32,
        time_of_day: TimeOfDay::from_hour(now.with_timezone(&Local).hour()),
    }
}

/// Applies the extraction rule table to utterances.
pub struct PatternExtractor {
    rules: &'static [ExtractionRule],
    negation_markers: &'static [&'static str],
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.as_slice(),
            negation_markers: NEGATION_MARKERS,
        }
    }
}

impl PatternExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule table in evaluation order.
    pub fn rules(&self) -> &[ExtractionRule] {
        self.rules
    }

    /// Whether the utterance contains any negation marker.
    pub fn is_negative(&self, utterance: &str) -> bool {
        let lowered = utterance.to_lowercase();
        self.negation_markers
            .iter()
            .any(|marker| lowered.contains(marker))
    }

    /// Extract candidate memory items from one utterance.
    ///
    /// Captured text is trimmed but otherwise kept verbatim (no case or
    /// punctuation normalization). Captures that are empty after trimming
    /// are ignored.
    #[tracing::instrument(name = "extract_memories", skip_all, fields(utterance_len = utterance.len()))]
    pub fn extract(&self, utterance: &str, now: DateTime<Utc>) -> ExtractedMemories {
        let context = context_for(utterance, now);
        let negative = self.is_negative(utterance);
        let mut extracted = ExtractedMemories::default();

        for rule in self.rules {
            let Some(content) = capture(rule, utterance) else {
                continue;
            };
            let is_positive = rule.has_sentiment.then_some(!negative);
            tracing::debug!(category = %rule.category, %content, ?is_positive, "Extraction rule matched");
            extracted.get_mut(rule.category).push(MemoryItem {
                content,
                is_positive,
                context: context.clone(),
            });
        }

        extracted
    }

    /// Report every rule that fires on the utterance, for debugging the table.
    pub fn explain(&self, utterance: &str) -> Vec<PatternMatch> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let caps = rule.pattern.captures(utterance)?;
                Some(PatternMatch {
                    category: rule.category,
                    pattern: rule.pattern.as_str().to_string(),
                    matched: caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default(),
                    captured: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                })
            })
            .collect()
    }
}

fn capture(rule: &ExtractionRule, utterance: &str) -> Option<String> {
    let caps = rule.pattern.captures(utterance)?;
    let content = caps.get(1)?.as_str().trim();
    (!content.is_empty()).then(|| content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_compiles_in_order() {
        let extractor = PatternExtractor::new();
        let rules = extractor.rules();
        assert_eq!(
            rules.len(),
            PREFERENCE_PATTERNS.len() + FACT_PATTERNS.len() + RELATIONSHIP_PATTERNS.len()
        );
        assert_eq!(rules[0].category, MemoryCategory::Preferences);
        assert!(rules[0].has_sentiment);
        assert_eq!(rules.last().unwrap().category, MemoryCategory::Relationships);
        assert!(!rules.last().unwrap().has_sentiment);
    }

    #[test]
    fn test_positive_preference() {
        let extractor = PatternExtractor::new();
        let extracted = extractor.extract("Man labai patinka kava", Utc::now());

        assert_eq!(extracted.preferences.len(), 1);
        assert_eq!(extracted.preferences[0].content, "kava");
        assert_eq!(extracted.preferences[0].is_positive, Some(true));
        assert!(extracted.facts.is_empty());
        assert!(extracted.relationships.is_empty());
    }

    #[test]
    fn test_negation_marker_flips_every_preference() {
        let extractor = PatternExtractor::new();
        let extracted = extractor.extract(
            "Man patinka kava, bet niekada negeriu arbatos. Negaliu pakęsti triukšmo",
            Utc::now(),
        );

        assert!(extracted.preferences.len() >= 2);
        assert!(
            extracted
                .preferences
                .iter()
                .all(|item| item.is_positive == Some(false))
        );
    }

    #[test]
    fn test_multiple_categories_from_one_utterance() {
        let extractor = PatternExtractor::new();
        let extracted = extractor.extract("Man patinka futbolas", Utc::now());

        // Matches both the preference rule and the fact rule.
        assert_eq!(extracted.preferences[0].content, "futbolas");
        assert_eq!(extracted.facts[0].content, "futbolas");
        assert_eq!(extracted.facts[0].is_positive, None);
    }

    #[test]
    fn test_relationship_capture_is_trimmed() {
        let extractor = PatternExtractor::new();
        let extracted = extractor.extract("Turiu brolį vardu Tomas   ", Utc::now());

        assert_eq!(extracted.relationships.len(), 1);
        assert_eq!(extracted.relationships[0].content, "Tomas");
    }

    #[test]
    fn test_fact_patterns_are_case_insensitive() {
        let extractor = PatternExtractor::new();
        let extracted = extractor.extract("aš gyvenu Kaune", Utc::now());
        assert_eq!(extracted.facts[0].content, "Kaune");
    }

    #[test]
    fn test_no_match_yields_empty_categories() {
        let extractor = PatternExtractor::new();
        let extracted = extractor.extract("Labas, kaip sekasi?", Utc::now());
        assert!(extracted.is_empty());
    }

    #[test]
    fn test_context_shared_by_all_candidates() {
        let extractor = PatternExtractor::new();
        let now = Utc::now();
        let extracted = extractor.extract("Man patinka kava", now);

        let expected = context_for("Man patinka kava", now);
        assert_eq!(expected.message_length, 3);
        assert_eq!(extracted.preferences[0].context, expected);
        assert_eq!(extracted.facts[0].context, expected);
    }

    #[test]
    fn test_context_word_count_ignores_repeated_whitespace() {
        let context = context_for("  Man   labai\tpatinka kava ", Utc::now());
        assert_eq!(context.message_length, 4);
    }

    #[test]
    fn test_whitespace_only_capture_is_skipped() {
        let extractor = PatternExtractor::new();
        let utterance = "Aš turiu  \nkatę";

        let extracted = extractor.extract(utterance, Utc::now());
        assert!(extracted.preferences.is_empty());
        assert!(extracted.facts.is_empty());
        assert!(extracted.relationships.is_empty());

        // The rule still fires; only its blank capture is dropped.
        let matches = extractor.explain(utterance);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category, MemoryCategory::Facts);
        assert_eq!(matches[0].captured.trim(), "");
    }

    #[test]
    fn test_explain_reports_fired_rules() {
        let extractor = PatternExtractor::new();
        let matches = extractor.explain("Man patinka kava");

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].category, MemoryCategory::Preferences);
        assert_eq!(matches[0].captured, "kava");
        assert_eq!(matches[1].category, MemoryCategory::Facts);
        assert_eq!(matches[1].matched, "Man patinka kava");
    }
}
