//! Parcel check statuses and the classification decision table.
//!
//! The decision table fuses the tariff-code outcome and the stop-word
//! outcome into one status. Numeric status ids are private to storage;
//! the API serializes the symbolic names.

use serde::{Deserialize, Serialize};

use crate::feacn::FeacnMatches;
use crate::types::DbId;

/// Result of the tariff-code checks for one parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TariffOutcome {
    /// Well-formed, known to the catalog, no prefix rule matched.
    Ok,
    /// Not exactly 10 digits.
    Malformed,
    /// Well-formed but absent from the catalog (or outside its validity
    /// window).
    Unknown,
    /// At least one enabled prefix rule matched.
    ProhibitedByPrefix,
}

/// Result of the catalog existence query, before prefix rules are
/// taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLookupOutcome {
    Known,
    Unknown,
    Malformed,
}

/// Fuse the catalog lookup with the prefix-rule matches. A prefix-rule
/// match takes precedence over format and existence problems.
pub fn tariff_outcome(lookup: CodeLookupOutcome, matches: &FeacnMatches) -> TariffOutcome {
    if matches.is_prohibited() {
        return TariffOutcome::ProhibitedByPrefix;
    }
    match lookup {
        CodeLookupOutcome::Known => TariffOutcome::Ok,
        CodeLookupOutcome::Unknown => TariffOutcome::Unknown,
        CodeLookupOutcome::Malformed => TariffOutcome::Malformed,
    }
}

/// Result of the vocabulary scan for one parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOutcome {
    NoMatch,
    StopWordMatch,
}

/// One parcel's check status.
///
/// The first block is produced by [`CheckStatus::resolve`]; `Approved`
/// and `PartnerFlagged` are asserted by a human reviewer and are never
/// produced (or overwritten) by automatic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Initial status of a freshly imported parcel.
    NotChecked,
    /// Tariff code ok, no stop-word match.
    Clean,
    /// Stop-word match on an otherwise clean parcel.
    StopWord,
    MalformedFeacn,
    MalformedFeacnStopWord,
    UnknownFeacn,
    UnknownFeacnStopWord,
    ProhibitedFeacn,
    ProhibitedFeacnStopWord,
    /// Human-asserted: reviewed and released.
    Approved,
    /// Human-asserted: flagged for the logistics partner.
    PartnerFlagged,
}

impl CheckStatus {
    /// Stable numeric id persisted in the database. The numbering is an
    /// implementation detail; nothing outside storage depends on it.
    pub fn id(&self) -> i16 {
        match self {
            Self::NotChecked => 1,
            Self::Clean => 101,
            Self::StopWord => 102,
            Self::MalformedFeacn => 110,
            Self::MalformedFeacnStopWord => 111,
            Self::UnknownFeacn => 120,
            Self::UnknownFeacnStopWord => 121,
            Self::ProhibitedFeacn => 130,
            Self::ProhibitedFeacnStopWord => 131,
            Self::Approved => 200,
            Self::PartnerFlagged => 201,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::NotChecked),
            101 => Some(Self::Clean),
            102 => Some(Self::StopWord),
            110 => Some(Self::MalformedFeacn),
            111 => Some(Self::MalformedFeacnStopWord),
            120 => Some(Self::UnknownFeacn),
            121 => Some(Self::UnknownFeacnStopWord),
            130 => Some(Self::ProhibitedFeacn),
            131 => Some(Self::ProhibitedFeacnStopWord),
            200 => Some(Self::Approved),
            201 => Some(Self::PartnerFlagged),
            _ => None,
        }
    }

    /// The decision table. Total over both inputs; every pair maps to a
    /// distinct status so "word-only", "tariff-only", and "both" cases
    /// stay distinguishable.
    pub fn resolve(tariff: TariffOutcome, word: WordOutcome) -> Self {
        match (tariff, word) {
            (TariffOutcome::Ok, WordOutcome::NoMatch) => Self::Clean,
            (TariffOutcome::Ok, WordOutcome::StopWordMatch) => Self::StopWord,
            (TariffOutcome::Malformed, WordOutcome::NoMatch) => Self::MalformedFeacn,
            (TariffOutcome::Malformed, WordOutcome::StopWordMatch) => Self::MalformedFeacnStopWord,
            (TariffOutcome::Unknown, WordOutcome::NoMatch) => Self::UnknownFeacn,
            (TariffOutcome::Unknown, WordOutcome::StopWordMatch) => Self::UnknownFeacnStopWord,
            (TariffOutcome::ProhibitedByPrefix, WordOutcome::NoMatch) => Self::ProhibitedFeacn,
            (TariffOutcome::ProhibitedByPrefix, WordOutcome::StopWordMatch) => {
                Self::ProhibitedFeacnStopWord
            }
        }
    }

    /// Statuses asserted by a human reviewer. Automatic
    /// re-classification must never overwrite these.
    pub fn is_human_asserted(&self) -> bool {
        matches!(self, Self::Approved | Self::PartnerFlagged)
    }
}

/// Outcome of one classification pass over a parcel: matched rule
/// references plus the resulting status. Persisted wholesale, replacing
/// the previous pass's links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub stop_word_ids: Vec<DbId>,
    pub key_word_ids: Vec<DbId>,
    pub feacn_order_ids: Vec<DbId>,
    pub feacn_prefix_ids: Vec<DbId>,
    pub status: CheckStatus,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TARIFF: [TariffOutcome; 4] = [
        TariffOutcome::Ok,
        TariffOutcome::Malformed,
        TariffOutcome::Unknown,
        TariffOutcome::ProhibitedByPrefix,
    ];

    const ALL_WORD: [WordOutcome; 2] = [WordOutcome::NoMatch, WordOutcome::StopWordMatch];

    #[test]
    fn test_every_outcome_pair_maps_to_a_distinct_status() {
        let mut seen = Vec::new();
        for tariff in ALL_TARIFF {
            for word in ALL_WORD {
                let status = CheckStatus::resolve(tariff, word);
                assert!(
                    !seen.contains(&status),
                    "status {status:?} produced by more than one outcome pair"
                );
                seen.push(status);
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for tariff in ALL_TARIFF {
            for word in ALL_WORD {
                assert_eq!(
                    CheckStatus::resolve(tariff, word),
                    CheckStatus::resolve(tariff, word)
                );
            }
        }
    }

    #[test]
    fn test_resolved_statuses_are_never_human_asserted() {
        for tariff in ALL_TARIFF {
            for word in ALL_WORD {
                assert!(!CheckStatus::resolve(tariff, word).is_human_asserted());
            }
        }
    }

    #[test]
    fn test_human_asserted_statuses() {
        assert!(CheckStatus::Approved.is_human_asserted());
        assert!(CheckStatus::PartnerFlagged.is_human_asserted());
        assert!(!CheckStatus::NotChecked.is_human_asserted());
        assert!(!CheckStatus::ProhibitedFeacnStopWord.is_human_asserted());
    }

    #[test]
    fn test_malformed_unknown_and_ok_are_distinct() {
        let malformed = CheckStatus::resolve(TariffOutcome::Malformed, WordOutcome::NoMatch);
        let unknown = CheckStatus::resolve(TariffOutcome::Unknown, WordOutcome::NoMatch);
        let ok = CheckStatus::resolve(TariffOutcome::Ok, WordOutcome::NoMatch);
        assert_ne!(malformed, unknown);
        assert_ne!(malformed, ok);
        assert_ne!(unknown, ok);
    }

    #[test]
    fn test_status_ids_round_trip() {
        for status in [
            CheckStatus::NotChecked,
            CheckStatus::Clean,
            CheckStatus::StopWord,
            CheckStatus::MalformedFeacn,
            CheckStatus::MalformedFeacnStopWord,
            CheckStatus::UnknownFeacn,
            CheckStatus::UnknownFeacnStopWord,
            CheckStatus::ProhibitedFeacn,
            CheckStatus::ProhibitedFeacnStopWord,
            CheckStatus::Approved,
            CheckStatus::PartnerFlagged,
        ] {
            assert_eq!(CheckStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(CheckStatus::from_id(0), None);
    }

    // -- tariff_outcome fusion --

    #[test]
    fn test_prefix_match_takes_precedence_over_lookup_problems() {
        let matches = FeacnMatches {
            order_ids: vec![1],
            prefix_ids: vec![],
        };
        for lookup in [
            CodeLookupOutcome::Known,
            CodeLookupOutcome::Unknown,
            CodeLookupOutcome::Malformed,
        ] {
            assert_eq!(
                tariff_outcome(lookup, &matches),
                TariffOutcome::ProhibitedByPrefix
            );
        }
    }

    #[test]
    fn test_lookup_outcome_passes_through_without_prefix_match() {
        let none = FeacnMatches::default();
        assert_eq!(tariff_outcome(CodeLookupOutcome::Known, &none), TariffOutcome::Ok);
        assert_eq!(
            tariff_outcome(CodeLookupOutcome::Unknown, &none),
            TariffOutcome::Unknown
        );
        assert_eq!(
            tariff_outcome(CodeLookupOutcome::Malformed, &none),
            TariffOutcome::Malformed
        );
    }
}
