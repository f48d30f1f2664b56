use std::collections::BTreeMap;

use super::ContractStore;
use crate::error::ScoreError;
use crate::model::{AnomalyScore, Contract};

/// In-memory store backed by BTreeMaps. Tests build fixtures on it.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    contracts: BTreeMap<String, Contract>,
    scores: BTreeMap<String, AnomalyScore>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contracts(contracts: impl IntoIterator<Item = Contract>) -> Self {
        let mut store = Self::new();
        for contract in contracts {
            store.insert_contract(contract);
        }
        store
    }

    pub fn insert_contract(&mut self, contract: Contract) {
        self.contracts.insert(contract.id.clone(), contract);
    }
}

impl ContractStore for MemoryStore {
    fn contract(&self, id: &str) -> Result<Option<Contract>, ScoreError> {
        Ok(self.contracts.get(id).cloned())
    }

    fn contracts(&self) -> Result<Vec<Contract>, ScoreError> {
        Ok(self.contracts.values().cloned().collect())
    }

    fn score(&self, contract_id: &str) -> Result<Option<AnomalyScore>, ScoreError> {
        Ok(self.scores.get(contract_id).cloned())
    }

    fn scores(&self) -> Result<Vec<AnomalyScore>, ScoreError> {
        Ok(self.scores.values().cloned().collect())
    }

    fn upsert_score(&mut self, score: AnomalyScore) -> Result<(), ScoreError> {
        self.scores.insert(score.contract_id.clone(), score);
        Ok(())
    }
}
