//! Word and phrase matching against declared product text.
//!
//! Each vocabulary entry (stop-word or key-word) carries a [`MatchType`]
//! deciding how its word is searched for in a parcel's text fields. The
//! matcher is a pure predicate: it never mutates anything and never
//! fails. A morphology-requiring match type whose word the dictionary
//! cannot expand simply does not match.

use serde::{Deserialize, Serialize};

use crate::morphology::{MorphologyGate, SupportLevel};

/// How a vocabulary entry's word is matched against target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Case-insensitive substring of the literal character sequence,
    /// with no token-boundary requirement.
    ExactSymbols,
    /// The word appears as a whole token.
    ExactWord,
    /// Every token of the (space-separated) entry appears as a whole
    /// token, in order, contiguously.
    Phrase,
    /// Any inflected form of the entry word appears as a whole token.
    WeakMorphology,
    /// Any token sharing the entry word's stem family appears.
    StrongMorphology,
}

impl MatchType {
    /// Stable numeric id persisted in the database.
    pub fn id(&self) -> i16 {
        match self {
            Self::ExactSymbols => 1,
            Self::ExactWord => 2,
            Self::Phrase => 3,
            Self::WeakMorphology => 4,
            Self::StrongMorphology => 5,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::ExactSymbols),
            2 => Some(Self::ExactWord),
            3 => Some(Self::Phrase),
            4 => Some(Self::WeakMorphology),
            5 => Some(Self::StrongMorphology),
            _ => None,
        }
    }

    /// The minimum morphology support level this match type requires,
    /// or `None` for the literal match types.
    pub fn required_support(&self) -> Option<SupportLevel> {
        match self {
            Self::ExactSymbols | Self::ExactWord | Self::Phrase => None,
            Self::WeakMorphology => Some(SupportLevel::FormsSupport),
            Self::StrongMorphology => Some(SupportLevel::FullSupport),
        }
    }
}

/// Split text into lowercase tokens. Token boundaries are any
/// non-alphanumeric characters or the string edges; Unicode letters and
/// digits (Cyrillic included) count as token characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Decide whether `entry_word` with the given match type matches
/// anywhere in `target_text`.
pub fn matches(
    target_text: &str,
    entry_word: &str,
    match_type: MatchType,
    gate: &dyn MorphologyGate,
) -> bool {
    let entry_word = entry_word.trim();
    if entry_word.is_empty() || target_text.is_empty() {
        return false;
    }

    match match_type {
        MatchType::ExactSymbols => target_text
            .to_lowercase()
            .contains(&entry_word.to_lowercase()),

        MatchType::ExactWord => {
            let folded = entry_word.to_lowercase();
            tokenize(target_text).iter().any(|t| *t == folded)
        }

        MatchType::Phrase => {
            let phrase = tokenize(entry_word);
            if phrase.is_empty() {
                return false;
            }
            let tokens = tokenize(target_text);
            tokens.windows(phrase.len()).any(|w| w == phrase.as_slice())
        }

        MatchType::WeakMorphology => {
            let forms = gate.inflected_forms(entry_word);
            if forms.is_empty() {
                // The dictionary cannot service this word; the
                // creation-time gate is the authoritative guard.
                return false;
            }
            tokenize(target_text).iter().any(|t| forms.contains(t))
        }

        MatchType::StrongMorphology => {
            let family = gate.stem_family(entry_word);
            if family.is_empty() {
                return false;
            }
            tokenize(target_text).iter().any(|t| family.contains(t))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Gate with a fixed forms list and stem family.
    struct StubGate {
        forms: Vec<String>,
        family: Vec<String>,
    }

    impl StubGate {
        fn new(forms: &[&str], family: &[&str]) -> Self {
            Self {
                forms: forms.iter().map(|s| s.to_string()).collect(),
                family: family.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn unsupported() -> Self {
            Self::new(&[], &[])
        }
    }

    impl MorphologyGate for StubGate {
        fn support_level(&self, _word: &str) -> SupportLevel {
            if !self.family.is_empty() {
                SupportLevel::FullSupport
            } else if !self.forms.is_empty() {
                SupportLevel::FormsSupport
            } else {
                SupportLevel::NoSupport
            }
        }
        fn inflected_forms(&self, _word: &str) -> Vec<String> {
            self.forms.clone()
        }
        fn stem_family(&self, _word: &str) -> Vec<String> {
            self.family.clone()
        }
    }

    /// Panics on any call; literal match types must never reach the gate.
    struct PanickingGate;

    impl MorphologyGate for PanickingGate {
        fn support_level(&self, _word: &str) -> SupportLevel {
            panic!("gate must not be consulted");
        }
        fn inflected_forms(&self, _word: &str) -> Vec<String> {
            panic!("gate must not be consulted");
        }
        fn stem_family(&self, _word: &str) -> Vec<String> {
            panic!("gate must not be consulted");
        }
    }

    // -- tokenize --

    #[test]
    fn test_tokenize_splits_on_non_alphanumeric() {
        assert_eq!(
            tokenize("Кольцо, золотое (585 проба)"),
            vec!["кольцо", "золотое", "585", "проба"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("-- , . !").is_empty());
    }

    // -- exact symbols --

    #[test]
    fn test_exact_symbols_matches_inside_a_word() {
        assert!(matches("противогаз", "газ", MatchType::ExactSymbols, &PanickingGate));
    }

    #[test]
    fn test_exact_symbols_is_case_insensitive() {
        assert!(matches("Детский ПРОТИВОГАЗ", "противогаз", MatchType::ExactSymbols, &PanickingGate));
    }

    #[test]
    fn test_exact_symbols_spans_spaces() {
        assert!(matches("дрон камера", "дрон камера", MatchType::ExactSymbols, &PanickingGate));
        assert!(!matches("дрон, камера", "дрон камера", MatchType::ExactSymbols, &PanickingGate));
    }

    // -- exact word --

    #[test]
    fn test_exact_word_requires_token_boundaries() {
        assert!(matches("игрушка контрафакт детская", "контрафакт", MatchType::ExactWord, &PanickingGate));
        assert!(!matches("неконтрафактный товар", "контрафакт", MatchType::ExactWord, &PanickingGate));
    }

    #[test]
    fn test_exact_word_is_case_insensitive() {
        assert!(matches("КОНТРАФАКТ", "контрафакт", MatchType::ExactWord, &PanickingGate));
    }

    #[test]
    fn test_exact_word_boundary_is_any_non_alphanumeric() {
        assert!(matches("товар(контрафакт)", "контрафакт", MatchType::ExactWord, &PanickingGate));
    }

    // -- phrase --

    #[test]
    fn test_phrase_matches_contiguous_tokens_in_order() {
        assert!(matches(
            "подарочный набор золотое кольцо с камнем",
            "золотое кольцо",
            MatchType::Phrase,
            &PanickingGate,
        ));
    }

    #[test]
    fn test_phrase_rejects_wrong_order() {
        assert!(!matches("кольцо золотое", "золотое кольцо", MatchType::Phrase, &PanickingGate));
    }

    #[test]
    fn test_phrase_rejects_gap_between_tokens() {
        assert!(!matches(
            "золотое массивное кольцо",
            "золотое кольцо",
            MatchType::Phrase,
            &PanickingGate,
        ));
    }

    #[test]
    fn test_phrase_ignores_punctuation_between_tokens() {
        assert!(matches("золотое - кольцо", "золотое кольцо", MatchType::Phrase, &PanickingGate));
    }

    #[test]
    fn test_single_word_phrase_behaves_like_exact_word() {
        assert!(matches("золотое кольцо", "кольцо", MatchType::Phrase, &PanickingGate));
    }

    // -- weak morphology --

    #[test]
    fn test_weak_morphology_matches_inflected_form() {
        let gate = StubGate::new(&["золото", "золота", "золоту"], &[]);
        assert!(matches("слиток золота", "золото", MatchType::WeakMorphology, &gate));
    }

    #[test]
    fn test_weak_morphology_requires_whole_token() {
        let gate = StubGate::new(&["золото", "золота"], &[]);
        assert!(!matches("золотой слиток", "золото", MatchType::WeakMorphology, &gate));
    }

    #[test]
    fn test_weak_morphology_without_support_is_no_match() {
        let gate = StubGate::unsupported();
        assert!(!matches("слиток золота", "золото", MatchType::WeakMorphology, &gate));
    }

    // -- strong morphology --

    #[test]
    fn test_strong_morphology_matches_stem_family_member() {
        let gate = StubGate::new(
            &["золото", "золота"],
            &["золото", "золота", "золотой", "золотая", "золотые"],
        );
        assert!(matches("золотая цепочка", "золото", MatchType::StrongMorphology, &gate));
    }

    #[test]
    fn test_strong_morphology_without_family_is_no_match() {
        let gate = StubGate::new(&["золото", "золота"], &[]);
        assert!(!matches("золотая цепочка", "золото", MatchType::StrongMorphology, &gate));
    }

    // -- edge cases --

    #[test]
    fn test_empty_entry_word_never_matches() {
        assert!(!matches("что угодно", "", MatchType::ExactSymbols, &PanickingGate));
        assert!(!matches("что угодно", "   ", MatchType::ExactWord, &PanickingGate));
    }

    #[test]
    fn test_empty_target_never_matches() {
        assert!(!matches("", "слово", MatchType::ExactSymbols, &PanickingGate));
    }

    // -- ids --

    #[test]
    fn test_match_type_ids_round_trip() {
        for mt in [
            MatchType::ExactSymbols,
            MatchType::ExactWord,
            MatchType::Phrase,
            MatchType::WeakMorphology,
            MatchType::StrongMorphology,
        ] {
            assert_eq!(MatchType::from_id(mt.id()), Some(mt));
        }
        assert_eq!(MatchType::from_id(0), None);
    }
}
