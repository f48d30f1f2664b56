use serde::{Deserialize, Serialize};

use crate::consolidation::{consolidate, Consolidated};
use crate::error::ScoreError;
use crate::model::{Criterion, RiskCategory};
use crate::store::ContractStore;

/// Sort key for scored-contract listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OrderBy {
    TotalScore,
    ContractId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Order {
    Asc,
    Desc,
}

/// Filter and pagination for [`contracts_by_score`]. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct ScoreFilter {
    pub category: Option<RiskCategory>,
    pub min_score: Option<u16>,
    pub order_by: OrderBy,
    pub order: Order,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ScoreFilter {
    fn default() -> Self {
        Self {
            category: None,
            min_score: None,
            order_by: OrderBy::TotalScore,
            order: Order::Desc,
            page: 1,
            page_size: 20,
        }
    }
}

/// One page of consolidated scores plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePage {
    pub items: Vec<Consolidated>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// List scored contracts matching a filter, consolidated on the fly.
/// Contracts with no score row yet are not listed.
pub fn contracts_by_score<S: ContractStore>(
    store: &S,
    filter: &ScoreFilter,
) -> Result<ScorePage, ScoreError> {
    let mut items: Vec<Consolidated> = store
        .scores()?
        .iter()
        .map(consolidate)
        .filter(|c| filter.category.map_or(true, |cat| c.category == cat))
        .filter(|c| filter.min_score.map_or(true, |min| c.total_score >= min))
        .collect();

    items.sort_by(|a, b| {
        let ordering = match filter.order_by {
            OrderBy::TotalScore => a
                .total_score
                .cmp(&b.total_score)
                // Stable listing for equal scores.
                .then_with(|| a.contract_id.cmp(&b.contract_id)),
            OrderBy::ContractId => a.contract_id.cmp(&b.contract_id),
        };
        match filter.order {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    });

    let total = items.len();
    let page_size = filter.page_size.max(1);
    let total_pages = total.div_ceil(page_size);
    let page = filter.page.max(1);

    let start = (page - 1).saturating_mul(page_size);
    let items = if start >= total {
        Vec::new()
    } else {
        items[start..(start + page_size).min(total)].to_vec()
    };

    Ok(ScorePage {
        items,
        total,
        page,
        page_size,
        total_pages,
    })
}

/// Aggregate statistics over every scored contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub scored_contracts: usize,
    /// (category, contract count) for all three risk categories.
    pub by_category: Vec<(RiskCategory, usize)>,
    /// (criterion, contracts where it contributed) for all eight criteria.
    pub contributing: Vec<(Criterion, usize)>,
    pub average_total: f64,
}

pub fn score_report<S: ContractStore>(store: &S) -> Result<ScoreReport, ScoreError> {
    let rows = store.scores()?;

    let by_category = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High]
        .iter()
        .map(|&cat| (cat, rows.iter().filter(|r| r.category == cat).count()))
        .collect();

    let contributing = Criterion::ALL
        .iter()
        .map(|&criterion| {
            (
                criterion,
                rows.iter()
                    .filter(|r| r.criterion(criterion).score > 0)
                    .count(),
            )
        })
        .collect();

    let average_total = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.total_score as f64).sum::<f64>() / rows.len() as f64
    };

    Ok(ScoreReport {
        scored_contracts: rows.len(),
        by_category,
        contributing,
        average_total,
    })
}
