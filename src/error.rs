use thiserror::Error;

/// Domain errors surfaced by the scoring engine.
///
/// Insufficient peer statistics is NOT an error: scorers report it as a
/// zero-score result with `is_anomaly = false`. Only unknown ids, missing
/// categories, store failures and unrecoverable downstream state map here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("contract not found: {0}")]
    InvalidContract(String),
    #[error("contract {0} has no scorable category")]
    NoCategory(String),
    #[error("store: {0}")]
    Database(String),
    #[error("calculation failed: {0}")]
    CalculationFailed(String),
}

impl ScoreError {
    /// True for failures of the store itself, as opposed to bad input.
    /// Batch processing aborts on these instead of skipping the contract.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, ScoreError::Database(_))
    }
}
