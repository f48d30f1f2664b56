mod json;
mod memory;

pub use json::{load_store_state, JsonStore, StoreState};
pub use memory::MemoryStore;

use crate::error::ScoreError;
use crate::model::{AnomalyScore, Contract};

/// Persistence collaborator for the scoring engine.
///
/// Contracts and amendments are read-only from the engine's point of view;
/// the only thing it ever writes is the AnomalyScore row keyed by contract
/// id. Implementations map their own failures to [`ScoreError::Database`].
pub trait ContractStore {
    fn contract(&self, id: &str) -> Result<Option<Contract>, ScoreError>;
    fn contracts(&self) -> Result<Vec<Contract>, ScoreError>;
    fn score(&self, contract_id: &str) -> Result<Option<AnomalyScore>, ScoreError>;
    fn scores(&self) -> Result<Vec<AnomalyScore>, ScoreError>;
    fn upsert_score(&mut self, score: AnomalyScore) -> Result<(), ScoreError>;
}
