//! Morphology support gate for vocabulary entries.
//!
//! Morphological match types (weak/strong) only work for words a
//! dictionary can expand into inflected forms or a stem family. The
//! [`MorphologyGate`] trait is the seam to that dictionary; the
//! [`LexiconGate`] implementation is backed by a JSON lexicon file
//! loaded once at startup.
//!
//! The gate is consulted in two places:
//! - at vocabulary-entry creation/update time, via
//!   [`ensure_match_type_supported`] (the authoritative guard), and
//! - at match-evaluation time, where an unsupported word simply yields
//!   no match.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::word_match::MatchType;

/// How far a dictionary can expand a given word.
///
/// Ordered: `NoSupport < FormsSupport < FullSupport`, so a required
/// level can be compared against the available one directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    /// The word is not in the dictionary at all.
    NoSupport,
    /// Inflected forms are available, but no stem family.
    FormsSupport,
    /// Both inflected forms and a stem family are available.
    FullSupport,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSupport => "no_support",
            Self::FormsSupport => "forms_support",
            Self::FullSupport => "full_support",
        }
    }
}

impl std::fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External dictionary capability used by the word matcher and the
/// vocabulary-entry validation gate.
pub trait MorphologyGate: Send + Sync {
    /// Report how far the dictionary can expand `word`.
    fn support_level(&self, word: &str) -> SupportLevel;

    /// All inflected forms of `word`, including the word itself.
    /// Empty when the word is unknown.
    fn inflected_forms(&self, word: &str) -> Vec<String>;

    /// All words (and their forms) sharing `word`'s root. Empty when the
    /// word has no stem family in the dictionary.
    fn stem_family(&self, word: &str) -> Vec<String>;
}

/// Check that `word` can satisfy the morphology support its match type
/// requires.
///
/// Match types without a morphology requirement pass without consulting
/// the gate at all. Failures carry the available level via
/// [`CoreError::InsufficientMorphology`].
pub fn ensure_match_type_supported(
    gate: &dyn MorphologyGate,
    word: &str,
    match_type: MatchType,
) -> Result<(), CoreError> {
    let Some(required) = match_type.required_support() else {
        return Ok(());
    };

    let available = gate.support_level(word);
    if available >= required {
        Ok(())
    } else {
        Err(CoreError::InsufficientMorphology {
            word: word.to_string(),
            available,
        })
    }
}

// ---------------------------------------------------------------------------
// Lexicon-backed implementation
// ---------------------------------------------------------------------------

/// One word entry in the lexicon file.
#[derive(Debug, Deserialize)]
struct LexiconWord {
    word: String,
    #[serde(default)]
    forms: Vec<String>,
    /// Words sharing a `stem_group` value belong to one stem family.
    #[serde(default)]
    stem_group: Option<String>,
}

/// On-disk lexicon file format: `{ "words": [ ... ] }`.
#[derive(Debug, Deserialize)]
struct LexiconFile {
    words: Vec<LexiconWord>,
}

#[derive(Debug, Clone)]
struct LexiconEntry {
    forms: Vec<String>,
    stem_group: Option<String>,
}

/// In-memory dictionary implementing [`MorphologyGate`].
///
/// Lookups are case-folded. A word present without a stem group reports
/// [`SupportLevel::FormsSupport`]; with a stem group,
/// [`SupportLevel::FullSupport`].
#[derive(Debug, Default)]
pub struct LexiconGate {
    entries: HashMap<String, LexiconEntry>,
    /// stem group id -> member words (folded).
    groups: HashMap<String, Vec<String>>,
}

impl LexiconGate {
    /// An empty lexicon: every word reports `NoSupport`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a lexicon from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Internal(format!("Failed to read lexicon file {}: {e}", path.display()))
        })?;
        let file: LexiconFile = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Internal(format!("Invalid lexicon file {}: {e}", path.display()))
        })?;
        Ok(Self::from_words(file.words))
    }

    fn from_words(words: Vec<LexiconWord>) -> Self {
        let mut entries = HashMap::new();
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();

        for word in words {
            let key = word.word.to_lowercase();
            if let Some(group) = &word.stem_group {
                groups.entry(group.clone()).or_default().push(key.clone());
            }
            entries.insert(
                key,
                LexiconEntry {
                    forms: word.forms.iter().map(|f| f.to_lowercase()).collect(),
                    stem_group: word.stem_group,
                },
            );
        }

        Self { entries, groups }
    }

    /// Number of words in the lexicon.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MorphologyGate for LexiconGate {
    fn support_level(&self, word: &str) -> SupportLevel {
        match self.entries.get(&word.to_lowercase()) {
            None => SupportLevel::NoSupport,
            Some(entry) if entry.stem_group.is_some() => SupportLevel::FullSupport,
            Some(_) => SupportLevel::FormsSupport,
        }
    }

    fn inflected_forms(&self, word: &str) -> Vec<String> {
        let key = word.to_lowercase();
        match self.entries.get(&key) {
            None => Vec::new(),
            Some(entry) => {
                let mut forms = entry.forms.clone();
                if !forms.contains(&key) {
                    forms.push(key);
                }
                forms
            }
        }
    }

    fn stem_family(&self, word: &str) -> Vec<String> {
        let key = word.to_lowercase();
        let Some(group) = self
            .entries
            .get(&key)
            .and_then(|entry| entry.stem_group.as_ref())
        else {
            return Vec::new();
        };

        // Family = every member word of the group plus all their forms.
        let mut family = Vec::new();
        for member in self.groups.get(group).map(Vec::as_slice).unwrap_or(&[]) {
            family.extend(self.inflected_forms(member));
        }
        family.sort();
        family.dedup();
        family
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
