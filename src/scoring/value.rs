use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::stats::{category_value_stats, PeerStats};
use crate::store::ContractStore;

/// Value criterion: how far the contracted value sits above the mean of its
/// peers (same category and signature year, falling back to the category's
/// all-time group when the year group is too small).
pub fn score<S: ContractStore>(
    store: &S,
    config: &ScoringConfig,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let contract = fetch_contract(store, contract_id)?;
    if !contract.category.is_scorable() {
        return Err(ScoreError::NoCategory(contract.id));
    }

    let contracts = store.contracts()?;
    let min_n = config.min_contracts_for_stats;
    let stats = category_value_stats(
        &contracts,
        contract.category,
        Some(contract.signature_year()),
        min_n,
    )
    .or_else(|| category_value_stats(&contracts, contract.category, None, min_n));

    Ok(evaluate(&contract, stats, config))
}

fn evaluate(contract: &Contract, stats: Option<PeerStats>, config: &ScoringConfig) -> CriterionResult {
    let stats = match stats {
        Some(s) => s,
        None => {
            return CriterionResult::insufficient(
                Criterion::Value,
                format!(
                    "fewer than {} peer contracts in category {}; value not compared",
                    config.min_contracts_for_stats, contract.category
                ),
            )
        }
    };

    // Zero spread means every peer has the same value; nothing to flag and
    // no deviation to compute.
    if stats.std_dev == 0.0 {
        return CriterionResult::clear(
            Criterion::Value,
            format!(
                "all {} peers share the same value ({:.2}); no deviation measurable",
                stats.count, stats.mean
            ),
            Some(stats),
        );
    }

    let deviation = (contract.value - stats.mean) / stats.std_dev;
    let threshold = config.value_sigma_threshold;

    if deviation > threshold {
        let excess = deviation - threshold;
        CriterionResult::flagged(
            Criterion::Value,
            5.0 + 10.0 * excess,
            format!(
                "value {:.2} is {:.1} standard deviations above the mean {:.2} of {} peers (threshold {:.1})",
                contract.value, deviation, stats.mean, stats.count, threshold
            ),
            Some(stats),
        )
    } else {
        CriterionResult::clear(
            Criterion::Value,
            format!(
                "value {:.2} is within {:.1} standard deviations of the mean {:.2} ({} peers)",
                contract.value, threshold, stats.mean, stats.count
            ),
            Some(stats),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn contract(id: &str, value: f64, year: i32) -> Contract {
        let signed = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
        Contract {
            id: id.to_string(),
            category: Category::Goods,
            value,
            signed_at: signed,
            starts_at: signed,
            ends_at: signed + chrono::Duration::days(180),
            published_at: None,
            description: "peer".to_string(),
            supplier_id: "s-1".to_string(),
            agency_id: "a-1".to_string(),
            amendments: vec![],
        }
    }

    #[test]
    fn test_zero_std_dev_scores_zero() {
        // Five peers at 100 each, sixth contract also 100: no division by zero.
        let mut contracts: Vec<Contract> = (0..5)
            .map(|i| contract(&format!("c-{i}"), 100.0, 2023))
            .collect();
        contracts.push(contract("c-target", 100.0, 2023));
        let store = MemoryStore::with_contracts(contracts);

        let result = score(&store, &ScoringConfig::default(), "c-target").unwrap();
        assert_eq!(result.score, 0);
        assert!(!result.is_anomaly);
        assert!(result.stats.is_some());
    }

    #[test]
    fn test_extreme_deviation_caps_at_25() {
        // Peers tuned so the target sits 4.5 sigma above the mean:
        // [90, 90, 110, 110, 100, 145] has mean 107.5... easier to check the
        // pure evaluator directly with known stats.
        let target = contract("c-target", 145.0, 2023);
        let stats = PeerStats {
            mean: 100.0,
            std_dev: 10.0,
            count: 6,
        };
        let result = evaluate(&target, Some(stats), &ScoringConfig::default());
        // deviation 4.5, excess 2.5, raw 5 + 25 = 30, capped
        assert!(result.is_anomaly);
        assert_eq!(result.score, 25);
    }

    #[test]
    fn test_below_threshold_is_clear() {
        let target = contract("c-target", 115.0, 2023);
        let stats = PeerStats {
            mean: 100.0,
            std_dev: 10.0,
            count: 6,
        };
        let result = evaluate(&target, Some(stats), &ScoringConfig::default());
        assert_eq!(result.score, 0);
        assert!(!result.is_anomaly);
    }

    #[test]
    fn test_moderate_excess_scores_on_ramp() {
        let target = contract("c-target", 125.0, 2023);
        let stats = PeerStats {
            mean: 100.0,
            std_dev: 10.0,
            count: 6,
        };
        // deviation 2.5, excess 0.5, raw 10
        let result = evaluate(&target, Some(stats), &ScoringConfig::default());
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_small_peer_group_is_insufficient_not_error() {
        let contracts = vec![
            contract("c-1", 100.0, 2023),
            contract("c-target", 900.0, 2023),
        ];
        let store = MemoryStore::with_contracts(contracts);

        let result = score(&store, &ScoringConfig::default(), "c-target").unwrap();
        assert_eq!(result.score, 0);
        assert!(!result.is_anomaly);
        assert!(result.stats.is_none());
    }

    #[test]
    fn test_falls_back_to_all_time_group() {
        // Only the target signed in 2023, but 6 in the category overall.
        let mut contracts: Vec<Contract> = (0..5)
            .map(|i| contract(&format!("c-{i}"), 100.0, 2020))
            .collect();
        contracts.push(contract("c-target", 100.0, 2023));
        let store = MemoryStore::with_contracts(contracts);

        let result = score(&store, &ScoringConfig::default(), "c-target").unwrap();
        // All-time group found: stats present, not the insufficient branch.
        assert!(result.stats.is_some());
        assert_eq!(result.stats.unwrap().count, 6);
    }

    #[test]
    fn test_uncategorized_contract_is_rejected() {
        let mut c = contract("c-1", 100.0, 2023);
        c.category = Category::Uncategorized;
        let store = MemoryStore::with_contracts([c]);

        let err = score(&store, &ScoringConfig::default(), "c-1").unwrap_err();
        assert_eq!(err, ScoreError::NoCategory("c-1".to_string()));
    }
}
