//! FEACN (customs tariff) code checks.
//!
//! Two independent checks feed the classification decision table:
//!
//! - **Prefix-rule matching**: configured prefix rules prohibit or flag
//!   any code starting with a given fragment, minus per-rule exception
//!   fragments. Rules are evaluated independently; a code may match
//!   several at once.
//! - **Format/currency**: whether the declared code is exactly 10
//!   digits, and whether the catalog knows it (done with a set-based
//!   existence query in the repository layer, not here).

use serde::Serialize;

use crate::types::DbId;

/// Length of a well-formed FEACN code.
pub const FEACN_CODE_LEN: usize = 10;

/// Maximum length of a prefix-rule fragment.
pub const MAX_PREFIX_LEN: usize = 10;

/// Snapshot of one enabled prefix rule, loaded once per classification
/// pass. Rules whose owning order is disabled are never loaded.
#[derive(Debug, Clone)]
pub struct PrefixRule {
    pub id: DbId,
    /// Code fragment the declared code must start with (1..=10 chars).
    pub prefix: String,
    /// Owning legal-basis order, or `None` for a standalone rule.
    pub order_id: Option<DbId>,
    /// Exception fragments carving sub-ranges out of the prefix.
    pub exceptions: Vec<String>,
}

/// Prefix-rule matches for one code, partitioned by rule kind:
/// order-backed rules report their order id, standalone rules their own
/// prefix id. Both lists are sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeacnMatches {
    pub order_ids: Vec<DbId>,
    pub prefix_ids: Vec<DbId>,
}

impl FeacnMatches {
    pub fn is_prohibited(&self) -> bool {
        !self.order_ids.is_empty() || !self.prefix_ids.is_empty()
    }
}

/// Whether a single rule applies to `code`: the code starts with the
/// rule's prefix and with none of its exception fragments.
pub fn rule_matches(code: &str, rule: &PrefixRule) -> bool {
    code.starts_with(rule.prefix.as_str())
        && !rule.exceptions.iter().any(|exc| code.starts_with(exc.as_str()))
}

/// Evaluate every rule independently against `code` and partition the
/// matches. There is no longest-prefix tie-break: overlapping rules all
/// report.
pub fn classify(code: &str, rules: &[PrefixRule]) -> FeacnMatches {
    let mut matches = FeacnMatches::default();

    for rule in rules {
        if !rule_matches(code, rule) {
            continue;
        }
        match rule.order_id {
            Some(order_id) => matches.order_ids.push(order_id),
            None => matches.prefix_ids.push(rule.id),
        }
    }

    matches.order_ids.sort_unstable();
    matches.order_ids.dedup();
    matches.prefix_ids.sort_unstable();
    matches.prefix_ids.dedup();
    matches
}

/// Strip surrounding whitespace from a declared code. Codes are free
/// text on the wire; everything downstream works on the trimmed form.
pub fn normalize_code(raw: &str) -> &str {
    raw.trim()
}

/// A code is well-formed iff it is exactly [`FEACN_CODE_LEN`] ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == FEACN_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a prefix-rule fragment: 1..=10 digits.
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("Prefix must not be empty".to_string());
    }
    if prefix.len() > MAX_PREFIX_LEN {
        return Err(format!("Prefix must be at most {MAX_PREFIX_LEN} characters"));
    }
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Prefix must contain only digits".to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: DbId, prefix: &str, order_id: Option<DbId>, exceptions: &[&str]) -> PrefixRule {
        PrefixRule {
            id,
            prefix: prefix.to_string(),
            order_id,
            exceptions: exceptions.iter().map(|s| s.to_string()).collect(),
        }
    }

    // -- rule_matches --

    #[test]
    fn test_code_matches_its_prefix() {
        assert!(rule_matches("8517120000", &rule(1, "8517", None, &[])));
    }

    #[test]
    fn test_code_does_not_match_other_prefix() {
        assert!(!rule_matches("8471300000", &rule(1, "8517", None, &[])));
    }

    #[test]
    fn test_exception_carves_out_sub_range() {
        let r = rule(1, "8517", None, &["851712"]);
        assert!(!rule_matches("8517120000", &r));
        assert!(rule_matches("8517610000", &r));
    }

    #[test]
    fn test_any_exception_suppresses_the_match() {
        let r = rule(1, "85", None, &["8516", "8517"]);
        assert!(!rule_matches("8517120000", &r));
        assert!(!rule_matches("8516100000", &r));
        assert!(rule_matches("8518900000", &r));
    }

    // -- classify --

    #[test]
    fn test_overlapping_rules_all_match_independently() {
        let rules = vec![
            rule(1, "85", Some(10), &[]),
            rule(2, "8517", None, &[]),
            rule(3, "9999", None, &[]),
        ];
        let matches = classify("8517120000", &rules);
        assert_eq!(matches.order_ids, vec![10]);
        assert_eq!(matches.prefix_ids, vec![2]);
        assert!(matches.is_prohibited());
    }

    #[test]
    fn test_no_rules_match_clean_code() {
        let rules = vec![rule(1, "85", Some(10), &[]), rule(2, "71", None, &[])];
        let matches = classify("0101210000", &rules);
        assert_eq!(matches, FeacnMatches::default());
        assert!(!matches.is_prohibited());
    }

    #[test]
    fn test_duplicate_order_ids_are_deduplicated() {
        // Two rules of the same order both matching the code.
        let rules = vec![rule(1, "85", Some(10), &[]), rule(2, "8517", Some(10), &[])];
        let matches = classify("8517120000", &rules);
        assert_eq!(matches.order_ids, vec![10]);
        assert!(matches.prefix_ids.is_empty());
    }

    #[test]
    fn test_removing_a_rule_does_not_affect_others() {
        // Monotonicity: dropping a disabled order's rules from the
        // snapshot removes only its matches.
        let all = vec![rule(1, "85", Some(10), &[]), rule(2, "8517", None, &[])];
        let without_order = vec![rule(2, "8517", None, &[])];

        let full = classify("8517120000", &all);
        let reduced = classify("8517120000", &without_order);

        assert_eq!(full.prefix_ids, reduced.prefix_ids);
        assert!(reduced.order_ids.is_empty());
    }

    // -- well-formedness --

    #[test]
    fn test_ten_digit_code_is_well_formed() {
        assert!(is_well_formed("1234567890"));
    }

    #[test]
    fn test_short_code_is_malformed() {
        assert!(!is_well_formed("123"));
    }

    #[test]
    fn test_long_code_is_malformed() {
        assert!(!is_well_formed("12345678901"));
    }

    #[test]
    fn test_non_digit_code_is_malformed() {
        assert!(!is_well_formed("12345abc90"));
        assert!(!is_well_formed("1234 67890"));
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(normalize_code("  1234567890 "), "1234567890");
    }

    // -- validate_prefix --

    #[test]
    fn test_valid_prefixes() {
        assert!(validate_prefix("8").is_ok());
        assert!(validate_prefix("8517120000").is_ok());
    }

    #[test]
    fn test_invalid_prefixes() {
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("85171200001").is_err());
        assert!(validate_prefix("85a7").is_err());
    }
}
