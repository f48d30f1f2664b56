use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ScoreError;
use crate::model::{AnomalyScore, Criterion, RiskCategory};
use crate::store::ContractStore;

/// One criterion's line in a consolidated breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub criterion: Criterion,
    pub score: u8,
    pub reason: Option<String>,
    /// True when this criterion added anything to the total.
    pub is_contributing: bool,
}

/// A contract's consolidated anomaly rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consolidated {
    pub contract_id: String,
    pub total_score: u16,
    pub category: RiskCategory,
    pub breakdown: Vec<BreakdownEntry>,
    pub contributing_criteria: Vec<Criterion>,
}

/// Consolidate a score row. Pure: unset criteria count as zero, the total
/// is the sum of the eight stored scores and the category is the fixed
/// step function over it, however many criteria have actually run.
pub fn consolidate(row: &AnomalyScore) -> Consolidated {
    let breakdown: Vec<BreakdownEntry> = Criterion::ALL
        .iter()
        .map(|&criterion| {
            let slot = row.criterion(criterion);
            BreakdownEntry {
                criterion,
                score: slot.score,
                reason: slot.reason.clone(),
                is_contributing: slot.score > 0,
            }
        })
        .collect();

    let total_score = row.sum_of_criteria();
    let contributing_criteria = breakdown
        .iter()
        .filter(|e| e.is_contributing)
        .map(|e| e.criterion)
        .collect();

    Consolidated {
        contract_id: row.contract_id.clone(),
        total_score,
        category: RiskCategory::from_total(total_score),
        breakdown,
        contributing_criteria,
    }
}

/// Read a contract's consolidated score without writing anything.
///
/// A contract that exists but has never been scored consolidates to all
/// zeros and `Low`.
pub fn get_consolidated_score<S: ContractStore>(
    store: &S,
    contract_id: &str,
) -> Result<Consolidated, ScoreError> {
    if store.contract(contract_id)?.is_none() {
        return Err(ScoreError::InvalidContract(contract_id.to_string()));
    }
    let row = store
        .score(contract_id)?
        .unwrap_or_else(|| AnomalyScore::new(contract_id));
    Ok(consolidate(&row))
}

/// Consolidate and persist when the stored total or category is stale.
///
/// Idempotent: consolidating twice with unchanged criterion scores performs
/// no second write and returns identical output.
pub fn consolidate_and_save<S: ContractStore>(
    store: &mut S,
    contract_id: &str,
) -> Result<Consolidated, ScoreError> {
    if store.contract(contract_id)?.is_none() {
        return Err(ScoreError::InvalidContract(contract_id.to_string()));
    }

    let mut row = store
        .score(contract_id)?
        .unwrap_or_else(|| AnomalyScore::new(contract_id));
    let consolidated = consolidate(&row);

    if row.total_score != consolidated.total_score || row.category != consolidated.category {
        row.total_score = consolidated.total_score;
        row.category = consolidated.category;
        row.calculated_at = Utc::now();
        store.upsert_score(row)?;
    }

    Ok(consolidated)
}

/// Reconsolidate every stored score row. Returns how many rows needed a
/// write.
pub fn consolidate_all<S: ContractStore>(store: &mut S) -> Result<usize, ScoreError> {
    let mut updated = 0;
    for row in store.scores()? {
        let consolidated = consolidate(&row);
        if row.total_score != consolidated.total_score || row.category != consolidated.category {
            let mut row = row;
            row.total_score = consolidated.total_score;
            row.category = consolidated.category;
            row.calculated_at = Utc::now();
            store.upsert_score(row)?;
            updated += 1;
        }
    }
    Ok(updated)
}

/// Zero one criterion (score and reason) and recompute total/category from
/// the remaining seven. The criterion becomes pending again for the batch
/// processor; the other criteria keep their scores and reasons untouched.
pub fn reset_criterion<S: ContractStore>(
    store: &mut S,
    contract_id: &str,
    criterion: Criterion,
) -> Result<Consolidated, ScoreError> {
    let mut row = store
        .score(contract_id)?
        .ok_or_else(|| ScoreError::InvalidContract(contract_id.to_string()))?;

    let slot = row.criterion_mut(criterion);
    slot.score = 0;
    slot.reason = None;

    let consolidated = consolidate(&row);
    row.total_score = consolidated.total_score;
    row.category = consolidated.category;
    row.calculated_at = Utc::now();
    store.upsert_score(row)?;

    Ok(consolidated)
}
