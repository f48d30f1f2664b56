use chrono::{Datelike, Weekday};

use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::store::ContractStore;

/// Timing criterion: signatures rushed through at budget-deadline time
/// (December, worse in its last week), on weekends, or suspiciously soon
/// after the tender was published. Flags are additive; no peer statistics
/// involved.
pub fn score<S: ContractStore>(
    store: &S,
    config: &ScoringConfig,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let contract = fetch_contract(store, contract_id)?;
    Ok(evaluate(&contract, config))
}

fn evaluate(contract: &Contract, config: &ScoringConfig) -> CriterionResult {
    let mut flags: Vec<String> = Vec::new();
    let mut raw = 0.0;

    let signed = contract.signed_at;

    if signed.month() == 12 {
        raw += 10.0;
        if signed.day() >= 25 {
            raw += 5.0;
            flags.push(format!("signed in the last week of December ({signed})"));
        } else {
            flags.push(format!("signed in December ({signed})"));
        }
    }

    if matches!(signed.weekday(), Weekday::Sat | Weekday::Sun) {
        raw += 5.0;
        flags.push(format!("signed on a weekend ({})", signed.weekday()));
    }

    if let Some(days) = contract.days_published_to_signed() {
        if days < config.publication_window_days {
            raw += 5.0;
            flags.push(format!(
                "only {} days between publication and signature (minimum expected {})",
                days, config.publication_window_days
            ));
        }
    }

    if raw > 0.0 {
        CriterionResult::flagged(Criterion::Timing, raw, flags.join("; "), None)
    } else {
        CriterionResult::clear(
            Criterion::Timing,
            "no timing flags: signature date and publication interval are unremarkable",
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    fn contract(signed: NaiveDate, published: Option<NaiveDate>) -> Contract {
        Contract {
            id: "c-1".to_string(),
            category: Category::Goods,
            value: 10_000.0,
            signed_at: signed,
            starts_at: signed,
            ends_at: signed + chrono::Duration::days(180),
            published_at: published,
            description: "supplies".to_string(),
            supplier_id: "s-1".to_string(),
            agency_id: "a-1".to_string(),
            amendments: vec![],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mid_december_weekday() {
        // 2023-12-13 was a Wednesday.
        let result = evaluate(&contract(date(2023, 12, 13), None), &ScoringConfig::default());
        assert_eq!(result.score, 10);
        assert!(result.is_anomaly);
        assert!(result.reason.contains("December"));
    }

    #[test]
    fn test_last_week_of_december_adds_more() {
        // 2023-12-28 was a Thursday.
        let result = evaluate(&contract(date(2023, 12, 28), None), &ScoringConfig::default());
        assert_eq!(result.score, 15);
        assert!(result.reason.contains("last week"));
    }

    #[test]
    fn test_weekend_signature() {
        // 2023-07-15 was a Saturday.
        let result = evaluate(&contract(date(2023, 7, 15), None), &ScoringConfig::default());
        assert_eq!(result.score, 5);
        assert!(result.reason.contains("weekend"));
    }

    #[test]
    fn test_short_publication_window() {
        let signed = date(2023, 7, 12); // Wednesday
        let published = date(2023, 7, 11);
        let result = evaluate(&contract(signed, Some(published)), &ScoringConfig::default());
        assert_eq!(result.score, 5);
        assert!(result.reason.contains("publication"));
    }

    #[test]
    fn test_all_flags_cap_at_25() {
        // 2023-12-30 was a Saturday in the last week of December, published
        // the day before: 10 + 5 + 5 + 5 = 25.
        let signed = date(2023, 12, 30);
        let published = date(2023, 12, 29);
        let result = evaluate(&contract(signed, Some(published)), &ScoringConfig::default());
        assert_eq!(result.score, 25);
    }

    #[test]
    fn test_unremarkable_date_is_clear() {
        // 2023-07-12 was a Wednesday, published well in advance.
        let result = evaluate(
            &contract(date(2023, 7, 12), Some(date(2023, 5, 1))),
            &ScoringConfig::default(),
        );
        assert_eq!(result.score, 0);
        assert!(!result.is_anomaly);
        assert!(result.stats.is_none());
    }

    #[test]
    fn test_missing_publication_date_not_flagged() {
        let result = evaluate(&contract(date(2023, 7, 12), None), &ScoringConfig::default());
        assert_eq!(result.score, 0);
    }
}
