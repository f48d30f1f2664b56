use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::stats::{category_amendment_count_stats, PeerStats};
use crate::store::ContractStore;

const COMPONENT_CAP: f64 = 15.0;

/// Amendment criterion: too many amendments compared with category peers,
/// or amendments that grew the contract by more than half its original
/// value. The two signals are scored separately (each capped at 15) and
/// summed; only the count signal needs peer statistics.
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
    let stats = category_amendment_count_stats(
        &contracts,
        contract.category,
        config.min_contracts_for_stats,
    );

    Ok(evaluate(&contract, stats, config))
}

fn evaluate(contract: &Contract, stats: Option<PeerStats>, config: &ScoringConfig) -> CriterionResult {
    let mut flags: Vec<String> = Vec::new();
    let mut raw = 0.0;

    // Count signal: amendment count above mean + k sigma of the category.
    match stats {
        Some(s) => {
            let count = contract.amendments.len() as f64;
            let cutoff = s.mean + config.amendment_count_sigma * s.std_dev;
            if count > cutoff {
                let excess = count - cutoff;
                raw += (5.0 + 7.0 * excess).min(COMPONENT_CAP);
                flags.push(format!(
                    "{} amendments against a peer cutoff of {:.1} (mean {:.1} over {} peers)",
                    contract.amendments.len(),
                    cutoff,
                    s.mean,
                    s.count
                ));
            }
        }
        None => {
            flags.push(format!(
                "fewer than {} peers in category {}; amendment count not compared",
                config.min_contracts_for_stats, contract.category
            ));
        }
    }

    // Value signal: total absolute value change over the original value.
    // Needs no peer statistics.
    if contract.value > 0.0 {
        let ratio = contract.total_amendment_value() / contract.value;
        if ratio > config.amendment_value_ratio {
            raw += (ratio * 10.0).min(COMPONENT_CAP);
            flags.push(format!(
                "amendments changed {:.0}% of the original value (threshold {:.0}%)",
                ratio * 100.0,
                config.amendment_value_ratio * 100.0
            ));
        }
    }

    if raw > 0.0 {
        CriterionResult::flagged(Criterion::Amendment, raw, flags.join("; "), stats)
    } else if stats.is_none() {
        CriterionResult::insufficient(Criterion::Amendment, flags.join("; "))
    } else {
        CriterionResult::clear(
            Criterion::Amendment,
            format!(
                "{} amendments, within peer norms and value threshold",
                contract.amendments.len()
            ),
            stats,
        )
    }
}
