use super::similarity::jaccard_similarity;
use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::store::ContractStore;

/// Fragmentation criterion: one purchase split into several small contracts
/// to stay under the dispensa limit (the value below which competitive
/// bidding can be waived). Three independent checks, +10 each:
/// value parked just under the limit, a burst of contracts between the same
/// supplier and agency, and near-duplicate descriptions within that burst.
pub fn score<S: ContractStore>(
    store: &S,
    config: &ScoringConfig,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let contract = fetch_contract(store, contract_id)?;
    let contracts = store.contracts()?;
    Ok(evaluate(&contract, &contracts, config))
}

fn evaluate(contract: &Contract, contracts: &[Contract], config: &ScoringConfig) -> CriterionResult {
    let mut flags: Vec<String> = Vec::new();
    let mut raw = 0.0;

    if contract.value >= config.dispensa_band_floor && contract.value < config.dispensa_limit {
        raw += 10.0;
        flags.push(format!(
            "value {:.2} sits just under the dispensa limit of {:.0}",
            contract.value, config.dispensa_limit
        ));
    }

    // Same supplier+agency contracts signed within the window, self excluded.
    let window = config.fragmentation_window_days;
    let nearby: Vec<&Contract> = contracts
        .iter()
        .filter(|c| {
            c.id != contract.id
                && c.supplier_id == contract.supplier_id
                && c.agency_id == contract.agency_id
                && (c.signed_at - contract.signed_at).num_days().abs() <= window
        })
        .collect();

    if nearby.len() + 1 >= config.fragmentation_min_cluster {
        raw += 10.0;
        flags.push(format!(
            "{} contracts between supplier {} and agency {} within {} days",
            nearby.len() + 1,
            contract.supplier_id,
            contract.agency_id,
            window
        ));
    }

    let similar = nearby
        .iter()
        .map(|c| jaccard_similarity(&contract.description, &c.description))
        .fold(0.0_f64, f64::max);
    if similar > config.similarity_threshold {
        raw += 10.0;
        flags.push(format!(
            "a nearby contract describes a near-identical object (similarity {:.2})",
            similar
        ));
    }

    if raw > 0.0 {
        CriterionResult::flagged(Criterion::Fragmentation, raw, flags.join("; "), None)
    } else {
        CriterionResult::clear(
            Criterion::Fragmentation,
            "no fragmentation flags: value, supplier clustering and descriptions are unremarkable",
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn contract(id: &str, value: f64, signed: NaiveDate, description: &str) -> Contract {
        Contract {
            id: id.to_string(),
            category: Category::Goods,
            value,
            signed_at: signed,
            starts_at: signed,
            ends_at: signed + chrono::Duration::days(180),
            published_at: None,
            description: description.to_string(),
            supplier_id: "s-1".to_string(),
            agency_id: "a-1".to_string(),
            amendments: vec![],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_near_dispensa_value() {
        let store = MemoryStore::with_contracts([contract(
            "c-1",
            49_500.0,
            date(2023, 5, 10),
            "office furniture",
        )]);
        let result = score(&store, &ScoringConfig::default(), "c-1").unwrap();
        assert_eq!(result.score, 10);
        assert!(result.reason.contains("dispensa"));
    }

    #[test]
    fn test_value_at_limit_not_in_band() {
        let store = MemoryStore::with_contracts([contract(
            "c-1",
            50_000.0,
            date(2023, 5, 10),
            "office furniture",
        )]);
        let result = score(&store, &ScoringConfig::default(), "c-1").unwrap();
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_supplier_agency_burst() {
        let contracts = vec![
            contract("c-1", 20_000.0, date(2023, 5, 10), "roof repairs block a"),
            contract("c-2", 20_000.0, date(2023, 5, 20), "electrical wiring block b"),
            contract("c-3", 20_000.0, date(2023, 6, 1), "plumbing block c"),
        ];
        let store = MemoryStore::with_contracts(contracts);
        let result = score(&store, &ScoringConfig::default(), "c-1").unwrap();
        assert_eq!(result.score, 10);
        assert!(result.reason.contains("3 contracts"));
    }

    #[test]
    fn test_burst_outside_window_not_counted() {
        let contracts = vec![
            contract("c-1", 20_000.0, date(2023, 1, 10), "roof repairs"),
            contract("c-2", 20_000.0, date(2023, 5, 20), "wiring"),
            contract("c-3", 20_000.0, date(2023, 9, 1), "plumbing"),
        ];
        let store = MemoryStore::with_contracts(contracts);
        let result = score(&store, &ScoringConfig::default(), "c-1").unwrap();
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_all_three_checks_cap_at_25() {
        // Near-limit values, a three-contract burst, and near-identical
        // descriptions: raw 30 clamps to 25.
        let contracts = vec![
            contract(
                "c-1",
                49_000.0,
                date(2023, 5, 10),
                "acquisition school lunch supplies first batch",
            ),
            contract(
                "c-2",
                48_500.0,
                date(2023, 5, 18),
                "acquisition school lunch supplies second batch",
            ),
            contract(
                "c-3",
                47_900.0,
                date(2023, 5, 28),
                "acquisition school lunch supplies third batch",
            ),
        ];
        let store = MemoryStore::with_contracts(contracts);
        let result = score(&store, &ScoringConfig::default(), "c-1").unwrap();
        assert_eq!(result.score, 25);
        assert!(result.is_anomaly);
    }

    #[test]
    fn test_similarity_requires_nearby_contract() {
        // Identical description but signed half a year apart: no flag.
        let contracts = vec![
            contract("c-1", 20_000.0, date(2023, 1, 10), "school lunch supplies"),
            contract("c-2", 20_000.0, date(2023, 8, 10), "school lunch supplies"),
        ];
        let store = MemoryStore::with_contracts(contracts);
        let result = score(&store, &ScoringConfig::default(), "c-1").unwrap();
        assert_eq!(result.score, 0);
    }
}
