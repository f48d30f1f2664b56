use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::ContractStore;
use crate::error::ScoreError;
use crate::model::{AnomalyScore, Contract};

/// On-disk shape of the JSON store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub scores: BTreeMap<String, AnomalyScore>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    pub fn new() -> Self {
        Self {
            version: 1,
            contracts: Vec::new(),
            scores: BTreeMap::new(),
        }
    }
}

/// Load store state from a JSON file.
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_store_state(path: &Path) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open store file at {}", path.display()))?;

    let state: StoreState = serde_json::from_reader(file).context("Failed to load store")?;

    if state.version != 1 {
        anyhow::bail!("Unsupported store version: {}", state.version);
    }

    Ok(state)
}

/// Flat-file store backing the CLI. Contracts are loaded once; score rows
/// are written back atomically on every upsert so a killed run never leaves
/// a corrupted or half-written file behind.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    contracts: BTreeMap<String, Contract>,
    scores: BTreeMap<String, AnomalyScore>,
}

impl JsonStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_store_state(&path)?;
        let contracts = state
            .contracts
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Ok(Self {
            path,
            contracts,
            scores: state.scores,
        })
    }

    /// Replace the contract set, keeping existing score rows. Returns the
    /// number of contracts now in the store.
    pub fn import_contracts(&mut self, contracts: Vec<Contract>) -> Result<usize> {
        for contract in contracts {
            self.contracts.insert(contract.id.clone(), contract);
        }
        self.save()?;
        Ok(self.contracts.len())
    }

    /// Write the full state back to disk atomically.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory {}", parent.display())
                })?;
            }
        }

        let state = StoreState {
            version: 1,
            contracts: self.contracts.values().cloned().collect(),
            scores: self.scores.clone(),
        };

        let mut file = AtomicWriteFile::open(&self.path)
            .with_context(|| format!("Failed to open atomic write file at {}", self.path.display()))?;

        serde_json::to_writer_pretty(&mut file, &state).context("Failed to serialize store")?;

        file.commit().context("Failed to save store")?;

        Ok(())
    }
}

impl ContractStore for JsonStore {
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
        // Persist immediately so an interrupted batch leaves every completed
        // contract's row on disk.
        self.save().map_err(|e| ScoreError::Database(e.to_string()))
    }
}
