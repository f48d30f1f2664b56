use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::store::ContractStore;

const EPSILON: f64 = 1e-6;

/// RoundNumber criterion: conspicuously round contract values. Genuine
/// quotes almost never land on an exact multiple of 100k; negotiated or
/// invented ones often do. Only the largest matching tier scores, plus a
/// small bump for large values with no cents at all.
pub fn score<S: ContractStore>(
    store: &S,
    _config: &ScoringConfig,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let contract = fetch_contract(store, contract_id)?;
    Ok(evaluate(&contract))
}

fn is_multiple_of(value: f64, base: f64) -> bool {
    let rem = value % base;
    rem.abs() < EPSILON || (base - rem).abs() < EPSILON
}

fn has_no_cents(value: f64) -> bool {
    is_multiple_of(value, 1.0)
}

fn evaluate(contract: &Contract) -> CriterionResult {
    let value = contract.value;
    let mut flags: Vec<String> = Vec::new();
    let mut raw = 0.0;

    if value <= 0.0 {
        return CriterionResult::clear(
            Criterion::RoundNumber,
            "non-positive value; roundness not assessed",
            None,
        );
    }

    // Top tier only: a 100k multiple is also a 10k and 1k multiple but
    // scores once at its highest tier.
    let multiple_of_1k = is_multiple_of(value, 1_000.0);
    if is_multiple_of(value, 100_000.0) {
        raw += 15.0;
        flags.push(format!("value {value:.2} is an exact multiple of 100,000"));
    } else if is_multiple_of(value, 10_000.0) {
        raw += 10.0;
        flags.push(format!("value {value:.2} is an exact multiple of 10,000"));
    } else if multiple_of_1k {
        raw += 5.0;
        flags.push(format!("value {value:.2} is an exact multiple of 1,000"));
    }

    if value > 100_000.0 && has_no_cents(value) && !multiple_of_1k {
        raw += 5.0;
        flags.push(format!("value {value:.2} above 100,000 with no cents"));
    }

    if raw > 0.0 {
        CriterionResult::flagged(Criterion::RoundNumber, raw, flags.join("; "), None)
    } else {
        CriterionResult::clear(
            Criterion::RoundNumber,
            format!("value {value:.2} is not conspicuously round"),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    fn contract(value: f64) -> Contract {
        let signed = NaiveDate::from_ymd_opt(2023, 4, 3).unwrap();
        Contract {
            id: "c-1".to_string(),
            category: Category::Goods,
            value,
            signed_at: signed,
            starts_at: signed,
            ends_at: signed + chrono::Duration::days(180),
            published_at: None,
            description: "supplies".to_string(),
            supplier_id: "s-1".to_string(),
            agency_id: "a-1".to_string(),
            amendments: vec![],
        }
    }

    #[test]
    fn test_100k_multiple_scores_top_tier() {
        let result = evaluate(&contract(200_000.0));
        assert_eq!(result.score, 15);
        assert!(result.is_anomaly);
        assert!(result.reason.contains("100,000"));
    }

    #[test]
    fn test_10k_multiple_scores_middle_tier() {
        let result = evaluate(&contract(210_000.0));
        assert_eq!(result.score, 10);
        assert!(result.reason.contains("10,000"));
    }

    #[test]
    fn test_1k_multiple_scores_bottom_tier() {
        let result = evaluate(&contract(47_000.0));
        assert_eq!(result.score, 5);
        assert!(result.reason.contains("1,000"));
    }

    #[test]
    fn test_tiers_are_exclusive() {
        // A 100k multiple is also a 10k and 1k multiple but must score 15,
        // not 30, and must not take the no-cents bump.
        let result = evaluate(&contract(500_000.0));
        assert_eq!(result.score, 15);
    }

    #[test]
    fn test_large_whole_value_gets_bump() {
        let result = evaluate(&contract(123_456.0));
        assert_eq!(result.score, 5);
        assert!(result.reason.contains("no cents"));
    }

    #[test]
    fn test_value_with_cents_is_clear() {
        let result = evaluate(&contract(123_456.78));
        assert_eq!(result.score, 0);
        assert!(!result.is_anomaly);
    }

    #[test]
    fn test_small_whole_value_is_clear() {
        // No cents but below 100k and not a 1k multiple: nothing to flag.
        let result = evaluate(&contract(4_321.0));
        assert_eq!(result.score, 0);
    }
}
