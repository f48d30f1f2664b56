pub mod amendment;
pub mod concentration;
pub mod description;
pub mod duration;
pub mod fragmentation;
pub mod round_number;
pub mod similarity;
pub mod timing;
pub mod value;

use chrono::Utc;

use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{AnomalyScore, Contract, Criterion, RiskCategory};
use crate::stats::PeerStats;
use crate::store::ContractStore;

/// Upper bound for any single criterion score.
pub const MAX_CRITERION_SCORE: u8 = 25;

/// Outcome of running one criterion against one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionResult {
    pub criterion: Criterion,
    /// 0-25, already rounded and clamped.
    pub score: u8,
    /// Human-readable explanation enumerating the flags raised (or why
    /// nothing was flagged).
    pub reason: String,
    pub is_anomaly: bool,
    /// Peer statistics the score was computed against, when the criterion
    /// uses any.
    pub stats: Option<PeerStats>,
}

impl CriterionResult {
    /// A clean (non-anomalous) result.
    pub fn clear(criterion: Criterion, reason: impl Into<String>, stats: Option<PeerStats>) -> Self {
        Self {
            criterion,
            score: 0,
            reason: reason.into(),
            is_anomaly: false,
            stats,
        }
    }

    /// The "insufficient data" outcome: the peer group was too small to
    /// trust. Deliberately a success, not an error.
    pub fn insufficient(criterion: Criterion, reason: impl Into<String>) -> Self {
        Self {
            criterion,
            score: 0,
            reason: reason.into(),
            is_anomaly: false,
            stats: None,
        }
    }

    /// A flagged result with the given raw score, rounded and clamped.
    pub fn flagged(
        criterion: Criterion,
        raw_score: f64,
        reason: impl Into<String>,
        stats: Option<PeerStats>,
    ) -> Self {
        Self {
            criterion,
            score: clamp_score(raw_score),
            reason: reason.into(),
            is_anomaly: true,
            stats,
        }
    }
}

/// Round a raw score to the nearest integer and clamp it to [0, 25].
pub fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, MAX_CRITERION_SCORE as f64) as u8
}

/// Fetch a contract or fail with `InvalidContract`.
pub(crate) fn fetch_contract<S: ContractStore>(
    store: &S,
    contract_id: &str,
) -> Result<Contract, ScoreError> {
    store
        .contract(contract_id)?
        .ok_or_else(|| ScoreError::InvalidContract(contract_id.to_string()))
}

/// Score one criterion for one contract. Pure read: nothing is persisted.
pub fn score_criterion<S: ContractStore>(
    store: &S,
    config: &ScoringConfig,
    criterion: Criterion,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    match criterion {
        Criterion::Value => value::score(store, config, contract_id),
        Criterion::Amendment => amendment::score(store, config, contract_id),
        Criterion::Concentration => concentration::score(store, config, contract_id),
        Criterion::Duration => duration::score(store, config, contract_id),
        Criterion::Timing => timing::score(store, config, contract_id),
        Criterion::RoundNumber => round_number::score(store, config, contract_id),
        Criterion::Fragmentation => fragmentation::score(store, config, contract_id),
        Criterion::Description => description::score(store, config, contract_id),
    }
}

/// Score one criterion and persist the outcome.
///
/// Creates the AnomalyScore row if this is the first criterion to run for
/// the contract (any criterion may create it; there is no ordering
/// requirement between criteria). Total and category are recomputed from
/// the stored scores in the same write, so a half-scored contract is still
/// internally consistent.
pub fn score_and_save<S: ContractStore>(
    store: &mut S,
    config: &ScoringConfig,
    criterion: Criterion,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let result = score_criterion(store, config, criterion, contract_id)?;

    let mut row = store
        .score(contract_id)?
        .unwrap_or_else(|| AnomalyScore::new(contract_id));

    let slot = row.criterion_mut(criterion);
    slot.score = result.score;
    slot.reason = Some(result.reason.clone());

    row.total_score = row.sum_of_criteria();
    row.category = RiskCategory::from_total(row.total_score);
    row.calculated_at = Utc::now();

    store.upsert_score(row)?;
    Ok(result)
}
