use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::stats::{population_stats, PeerStats};
use crate::store::ContractStore;

/// Concentration criterion: one supplier holding an outsized share of an
/// agency's contracts, by count or by value. The higher of the two shares
/// is scored.
pub fn score<S: ContractStore>(
    store: &S,
    config: &ScoringConfig,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let contract = fetch_contract(store, contract_id)?;
    let contracts = store.contracts()?;

    let agency: Vec<&Contract> = contracts
        .iter()
        .filter(|c| c.agency_id == contract.agency_id)
        .collect();

    if agency.len() < config.min_contracts_for_stats {
        return Ok(CriterionResult::insufficient(
            Criterion::Concentration,
            format!(
                "agency {} has only {} contracts (minimum {}); share not computed",
                contract.agency_id,
                agency.len(),
                config.min_contracts_for_stats
            ),
        ));
    }

    let supplier: Vec<&&Contract> = agency
        .iter()
        .filter(|c| c.supplier_id == contract.supplier_id)
        .collect();

    let count_share = supplier.len() as f64 / agency.len() as f64;

    let agency_value: f64 = agency.iter().map(|c| c.value).sum();
    let supplier_value: f64 = supplier.iter().map(|c| c.value).sum();
    let value_share = if agency_value > 0.0 {
        supplier_value / agency_value
    } else {
        0.0
    };

    // Informational stats over the agency's contract values.
    let agency_values: Vec<f64> = agency.iter().map(|c| c.value).collect();
    let stats: Option<PeerStats> = population_stats(&agency_values, config.min_contracts_for_stats);

    let (share, basis) = if value_share > count_share {
        (value_share, "value")
    } else {
        (count_share, "count")
    };
    let threshold = config.concentration_share_threshold;

    if share > threshold {
        let excess = share - threshold;
        Ok(CriterionResult::flagged(
            Criterion::Concentration,
            5.0 + 50.0 * excess,
            format!(
                "supplier {} holds {:.0}% of agency {} by {} ({:.0}% by count, {:.0}% by value; threshold {:.0}%)",
                contract.supplier_id,
                share * 100.0,
                contract.agency_id,
                basis,
                count_share * 100.0,
                value_share * 100.0,
                threshold * 100.0
            ),
            stats,
        ))
    } else {
        Ok(CriterionResult::clear(
            Criterion::Concentration,
            format!(
                "supplier {} holds {:.0}% of agency {} (threshold {:.0}%)",
                contract.supplier_id,
                share * 100.0,
                contract.agency_id,
                threshold * 100.0
            ),
            stats,
        ))
    }
}
