use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::stats::{category_duration_stats, PeerStats};
use crate::store::ContractStore;

/// Duration criterion: contracted duration far from the category norm, in
/// either direction. Too short can mean a contract meant to be amended
/// later; too long can mean locked-in supply.
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
    let stats = category_duration_stats(
        &contracts,
        contract.category,
        config.min_contracts_for_stats,
    );

    Ok(evaluate(&contract, stats, config))
}

fn evaluate(contract: &Contract, stats: Option<PeerStats>, config: &ScoringConfig) -> CriterionResult {
    let stats = match stats {
        Some(s) => s,
        None => {
            return CriterionResult::insufficient(
                Criterion::Duration,
                format!(
                    "fewer than {} peers in category {}; duration not compared",
                    config.min_contracts_for_stats, contract.category
                ),
            )
        }
    };

    let duration = contract.duration_days() as f64;

    if stats.std_dev == 0.0 {
        return CriterionResult::clear(
            Criterion::Duration,
            format!(
                "all {} peers share the same duration ({:.0} days); no deviation measurable",
                stats.count, stats.mean
            ),
            Some(stats),
        );
    }

    let deviation = (duration - stats.mean) / stats.std_dev;
    let threshold = config.duration_sigma_threshold;

    if deviation.abs() > threshold {
        let excess = deviation.abs() - threshold;
        let direction = if deviation > 0.0 {
            "longer"
        } else {
            "shorter"
        };
        CriterionResult::flagged(
            Criterion::Duration,
            5.0 + 10.0 * excess,
            format!(
                "duration {:.0} days is {:.1} standard deviations {} than the category mean {:.0} days ({} peers, threshold {:.1})",
                duration,
                deviation.abs(),
                direction,
                stats.mean,
                stats.count,
                threshold
            ),
            Some(stats),
        )
    } else {
        CriterionResult::clear(
            Criterion::Duration,
            format!(
                "duration {:.0} days is within {:.1} standard deviations of the mean {:.0} days",
                duration, threshold, stats.mean
            ),
            Some(stats),
        )
    }
}
