//! Per-parcel classification.
//!
//! A classification pass works on a snapshot of the enabled
//! vocabularies and prefix rules ([`ClassificationContext`]), loaded
//! once per pass; only the catalog existence check touches the
//! database per parcel.

use cargoscreen_core::check_status::{
    tariff_outcome, CheckStatus, ClassificationResult, CodeLookupOutcome, WordOutcome,
};
use cargoscreen_core::feacn::{self, normalize_code};
use cargoscreen_core::morphology::MorphologyGate;
use cargoscreen_core::types::DbId;
use cargoscreen_core::word_match;
use cargoscreen_db::models::key_word::KeyWordWithCodes;
use cargoscreen_db::models::parcel::Parcel;
use cargoscreen_db::models::stop_word::StopWord;
use cargoscreen_db::repositories::{FeacnRepo, KeyWordRepo, ParcelRepo, StopWordRepo};
use sqlx::PgPool;

/// Snapshot of everything a classification pass needs besides the
/// parcels themselves.
pub struct ClassificationContext {
    pub stop_words: Vec<StopWord>,
    pub key_words: Vec<KeyWordWithCodes>,
    pub rules: Vec<feacn::PrefixRule>,
}

impl ClassificationContext {
    /// Load the enabled stop words, key words, and active prefix rules.
    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            stop_words: StopWordRepo::list_enabled(pool).await?,
            key_words: KeyWordRepo::list_enabled(pool).await?,
            rules: FeacnRepo::load_active_rules(pool).await?,
        })
    }
}

/// Evaluate one parcel against the snapshot. Pure: the catalog lookup
/// outcome is an input.
pub fn evaluate_parcel(
    ctx: &ClassificationContext,
    gate: &dyn MorphologyGate,
    lookup: CodeLookupOutcome,
    tariff_code: &str,
    text_fields: &[&str],
) -> ClassificationResult {
    let matches = feacn::classify(tariff_code, &ctx.rules);

    let field_matches = |word: &str, match_type| {
        text_fields
            .iter()
            .any(|field| word_match::matches(field, word, match_type, gate))
    };

    let stop_word_ids: Vec<_> = ctx
        .stop_words
        .iter()
        .filter(|sw| field_matches(&sw.word, sw.match_type()))
        .map(|sw| sw.id)
        .collect();

    let key_word_ids: Vec<_> = ctx
        .key_words
        .iter()
        .filter(|kw| field_matches(&kw.key_word.word, kw.key_word.match_type()))
        .map(|kw| kw.key_word.id)
        .collect();

    let word_outcome = if stop_word_ids.is_empty() {
        WordOutcome::NoMatch
    } else {
        WordOutcome::StopWordMatch
    };
    let status = CheckStatus::resolve(tariff_outcome(lookup, &matches), word_outcome);

    ClassificationResult {
        stop_word_ids,
        key_word_ids,
        feacn_order_ids: matches.order_ids,
        feacn_prefix_ids: matches.prefix_ids,
        status,
    }
}

/// Classify one parcel: catalog existence query plus the pure
/// evaluation above.
pub async fn classify_parcel(
    pool: &PgPool,
    ctx: &ClassificationContext,
    gate: &dyn MorphologyGate,
    parcel: &Parcel,
) -> Result<ClassificationResult, sqlx::Error> {
    let code = normalize_code(&parcel.tariff_code);

    let lookup = if !feacn::is_well_formed(code) {
        CodeLookupOutcome::Malformed
    } else if FeacnRepo::code_is_current(pool, code).await? {
        CodeLookupOutcome::Known
    } else {
        CodeLookupOutcome::Unknown
    };

    let text_fields: Vec<&str> = [parcel.product_name.as_deref(), parcel.description.as_deref()]
        .into_iter()
        .flatten()
        .collect();

    Ok(evaluate_parcel(ctx, gate, lookup, code, &text_fields))
}

/// Classify a parcel by id and persist the result. Parcels whose
/// status was asserted by a human reviewer are left untouched, as are
/// parcels deleted concurrently.
pub async fn classify_and_persist(
    pool: &PgPool,
    ctx: &ClassificationContext,
    gate: &dyn MorphologyGate,
    parcel_id: DbId,
) -> Result<(), sqlx::Error> {
    let Some(parcel) = ParcelRepo::find_by_id(pool, parcel_id).await? else {
        return Ok(());
    };
    if parcel.check_status().is_human_asserted() {
        return Ok(());
    }

    let result = classify_parcel(pool, ctx, gate, &parcel).await?;
    ParcelRepo::apply_classification(pool, parcel_id, &result).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cargoscreen_core::feacn::PrefixRule;
    use cargoscreen_core::morphology::LexiconGate;
    use cargoscreen_core::types::{DbId, Timestamp};
    use cargoscreen_core::word_match::MatchType;
    use cargoscreen_db::models::key_word::KeyWord;

    fn now() -> Timestamp {
        chrono::Utc::now()
    }

    fn stop_word(id: DbId, word: &str, match_type: MatchType) -> StopWord {
        StopWord {
            id,
            word: word.to_string(),
            match_type_id: match_type.id(),
            enabled: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn key_word(id: DbId, word: &str, codes: &[&str]) -> KeyWordWithCodes {
        KeyWordWithCodes {
            key_word: KeyWord {
                id,
                word: word.to_string(),
                match_type_id: MatchType::ExactWord.id(),
                enabled: true,
                insert_before: None,
                insert_after: None,
                created_at: now(),
                updated_at: now(),
            },
            feacn_codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn rule(id: DbId, prefix: &str, order_id: Option<DbId>) -> PrefixRule {
        PrefixRule {
            id,
            prefix: prefix.to_string(),
            order_id,
            exceptions: Vec::new(),
        }
    }

    fn ctx(
        stop_words: Vec<StopWord>,
        key_words: Vec<KeyWordWithCodes>,
        rules: Vec<PrefixRule>,
    ) -> ClassificationContext {
        ClassificationContext {
            stop_words,
            key_words,
            rules,
        }
    }

    #[test]
    fn test_stop_word_match_on_clean_code_yields_stop_word_status() {
        let ctx = ctx(
            vec![stop_word(7, "контрафакт", MatchType::ExactWord)],
            vec![],
            vec![],
        );
        let result = evaluate_parcel(
            &ctx,
            &LexiconGate::empty(),
            CodeLookupOutcome::Known,
            "1234567890",
            &["игрушка контрафакт"],
        );

        assert_eq!(result.status, CheckStatus::StopWord);
        assert_eq!(result.stop_word_ids, vec![7]);
        assert!(result.feacn_order_ids.is_empty());
        assert!(result.feacn_prefix_ids.is_empty());
    }

    #[test]
    fn test_clean_parcel_is_clean() {
        let ctx = ctx(
            vec![stop_word(7, "контрафакт", MatchType::ExactWord)],
            vec![],
            vec![rule(1, "9999", None)],
        );
        let result = evaluate_parcel(
            &ctx,
            &LexiconGate::empty(),
            CodeLookupOutcome::Known,
            "1234567890",
            &["детская игрушка"],
        );

        assert_eq!(result.status, CheckStatus::Clean);
        assert!(result.stop_word_ids.is_empty());
    }

    #[test]
    fn test_prohibited_prefix_and_stop_word_produce_compound_status() {
        let ctx = ctx(
            vec![stop_word(7, "дрон", MatchType::ExactWord)],
            vec![],
            vec![rule(3, "85", Some(40))],
        );
        let result = evaluate_parcel(
            &ctx,
            &LexiconGate::empty(),
            CodeLookupOutcome::Known,
            "8517120000",
            &["дрон с камерой"],
        );

        assert_eq!(result.status, CheckStatus::ProhibitedFeacnStopWord);
        assert_eq!(result.feacn_order_ids, vec![40]);
        assert_eq!(result.stop_word_ids, vec![7]);
    }

    #[test]
    fn test_malformed_code_is_distinct_from_unknown() {
        let ctx = ctx(vec![], vec![], vec![]);
        let gate = LexiconGate::empty();

        let malformed =
            evaluate_parcel(&ctx, &gate, CodeLookupOutcome::Malformed, "123", &["товар"]);
        let unknown = evaluate_parcel(
            &ctx,
            &gate,
            CodeLookupOutcome::Unknown,
            "1234567890",
            &["товар"],
        );

        assert_eq!(malformed.status, CheckStatus::MalformedFeacn);
        assert_eq!(unknown.status, CheckStatus::UnknownFeacn);
    }

    #[test]
    fn test_key_word_matches_are_recorded_but_do_not_affect_status() {
        let ctx = ctx(vec![], vec![key_word(5, "золото", &["7108"])], vec![]);
        let result = evaluate_parcel(
            &ctx,
            &LexiconGate::empty(),
            CodeLookupOutcome::Known,
            "1234567890",
            &["золото 585"],
        );

        assert_eq!(result.status, CheckStatus::Clean);
        assert_eq!(result.key_word_ids, vec![5]);
    }

    #[test]
    fn test_any_text_field_can_carry_the_match() {
        let ctx = ctx(
            vec![stop_word(7, "контрафакт", MatchType::ExactWord)],
            vec![],
            vec![],
        );
        let result = evaluate_parcel(
            &ctx,
            &LexiconGate::empty(),
            CodeLookupOutcome::Known,
            "1234567890",
            &["игрушка", "возможен контрафакт"],
        );

        assert_eq!(result.status, CheckStatus::StopWord);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let ctx = ctx(
            vec![stop_word(7, "дрон", MatchType::ExactWord)],
            vec![key_word(5, "золото", &[])],
            vec![rule(3, "85", Some(40))],
        );
        let gate = LexiconGate::empty();

        let first = evaluate_parcel(
            &ctx,
            &gate,
            CodeLookupOutcome::Known,
            "8517120000",
            &["дрон и золото"],
        );
        let second = evaluate_parcel(
            &ctx,
            &gate,
            CodeLookupOutcome::Known,
            "8517120000",
            &["дрон и золото"],
        );

        assert_eq!(first, second);
    }
}
