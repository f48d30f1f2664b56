use chrono::{DateTime, Utc};

use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::Criterion;
use crate::scoring::score_and_save;
use crate::store::ContractStore;

/// Outcome of one batch run (or an aggregated process-all run) for a single
/// criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    pub criterion: Criterion,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Contracts attempted.
    pub processed: usize,
    /// Contracts scored and persisted.
    pub calculated: usize,
    pub anomalies_found: usize,
    pub errors: usize,
    pub last_error: Option<String>,
}

impl BatchStats {
    fn start(criterion: Criterion) -> Self {
        let now = Utc::now();
        Self {
            criterion,
            started_at: now,
            finished_at: now,
            processed: 0,
            calculated: 0,
            anomalies_found: 0,
            errors: 0,
            last_error: None,
        }
    }

    fn absorb(&mut self, other: &BatchStats) {
        self.finished_at = other.finished_at;
        self.processed += other.processed;
        self.calculated += other.calculated;
        self.anomalies_found += other.anomalies_found;
        self.errors += other.errors;
        if other.last_error.is_some() {
            self.last_error = other.last_error.clone();
        }
    }
}

/// Contracts still pending for a criterion: no score row yet, or a row
/// whose reason for this criterion is unset. Scored-to-zero contracts have
/// a reason and are NOT pending, which is what makes reruns idempotent.
pub fn pending_contracts<S: ContractStore>(
    store: &S,
    criterion: Criterion,
    limit: Option<usize>,
) -> Result<Vec<String>, ScoreError> {
    let mut pending = Vec::new();
    for contract in store.contracts()? {
        let scored = match store.score(&contract.id)? {
            Some(row) => row.has_run(criterion),
            None => false,
        };
        if !scored {
            pending.push(contract.id);
            if let Some(limit) = limit {
                if pending.len() >= limit {
                    break;
                }
            }
        }
    }
    Ok(pending)
}

/// Number of contracts still pending for a criterion.
pub fn pending_count<S: ContractStore>(
    store: &S,
    criterion: Criterion,
) -> Result<usize, ScoreError> {
    Ok(pending_contracts(store, criterion, None)?.len())
}

/// Score one bounded batch of pending contracts, strictly sequentially.
///
/// Per-contract domain errors (unknown id, missing category) are logged,
/// counted and skipped; the batch keeps going. A store failure aborts the
/// batch, since every later contract would hit the same wall.
pub fn run_batch<S: ContractStore>(
    store: &mut S,
    config: &ScoringConfig,
    criterion: Criterion,
    verbose: bool,
) -> Result<BatchStats, ScoreError> {
    let mut stats = BatchStats::start(criterion);
    let batch = pending_contracts(store, criterion, Some(config.batch_size))?;

    for contract_id in &batch {
        stats.processed += 1;
        match score_and_save(store, config, criterion, contract_id) {
            Ok(result) => {
                stats.calculated += 1;
                if result.is_anomaly {
                    stats.anomalies_found += 1;
                }
                if verbose {
                    eprintln!(
                        "  {} {}: score {} ({})",
                        criterion, contract_id, result.score, result.reason
                    );
                }
            }
            Err(e) if e.is_infrastructure() => return Err(e),
            Err(e) => {
                stats.errors += 1;
                stats.last_error = Some(e.to_string());
                eprintln!("  {} {}: skipped - {}", criterion, contract_id, e);
            }
        }
    }

    stats.finished_at = Utc::now();
    Ok(stats)
}

/// Drive one criterion over every pending contract, batch by batch,
/// re-querying the pending count between batches.
///
/// Stops when nothing is pending, or when a full batch makes no progress
/// (every remaining contract failed), so a permanently failing contract
/// cannot spin the loop. Safe to re-run; NOT safe to run twice
/// concurrently for the same criterion - the two runners would select the
/// same pending set and overwrite each other's rows.
pub fn process_all<S: ContractStore>(
    store: &mut S,
    config: &ScoringConfig,
    criterion: Criterion,
    verbose: bool,
) -> Result<BatchStats, ScoreError> {
    let mut total = BatchStats::start(criterion);

    loop {
        let remaining = pending_count(store, criterion)?;
        if remaining == 0 {
            break;
        }
        if verbose {
            eprintln!("{}: {} contracts pending", criterion, remaining);
        }

        let batch = run_batch(store, config, criterion, verbose)?;
        let progressed = batch.calculated > 0;
        total.absorb(&batch);

        if !progressed {
            eprintln!(
                "{}: no progress in last batch ({} still pending), stopping",
                criterion, remaining
            );
            break;
        }
    }

    total.finished_at = Utc::now();
    Ok(total)
}
