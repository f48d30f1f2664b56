use serde::{Deserialize, Serialize};

use crate::model::{Category, Contract};

/// Mean and population standard deviation of one peer group. Ephemeral:
/// recomputed on every scoring call so the numbers always reflect the
/// current contract set, never persisted or cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerStats {
    pub mean: f64,
    pub std_dev: f64,
    pub count: usize,
}

/// Compute mean and POPULATION standard deviation over a sample.
///
/// Returns `None` when the sample is smaller than `min_n`. Callers must
/// treat that as "insufficient data" and score zero, not guess or fail.
pub fn population_stats(values: &[f64], min_n: usize) -> Option<PeerStats> {
    if values.len() < min_n.max(1) {
        return None;
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(PeerStats {
        mean,
        std_dev: variance.sqrt(),
        count,
    })
}

/// Peer group: contracts in the same category, optionally scoped to one
/// signature year. The scored contract itself belongs to its own peer group.
pub fn category_peers<'a>(
    contracts: &'a [Contract],
    category: Category,
    year: Option<i32>,
) -> impl Iterator<Item = &'a Contract> {
    contracts
        .iter()
        .filter(move |c| c.category == category)
        .filter(move |c| year.map_or(true, |y| c.signature_year() == y))
}

/// Value statistics over a category, optionally scoped to a signature year.
pub fn category_value_stats(
    contracts: &[Contract],
    category: Category,
    year: Option<i32>,
    min_n: usize,
) -> Option<PeerStats> {
    let values: Vec<f64> = category_peers(contracts, category, year)
        .map(|c| c.value)
        .collect();
    population_stats(&values, min_n)
}

/// Duration statistics (days) over a category.
pub fn category_duration_stats(
    contracts: &[Contract],
    category: Category,
    min_n: usize,
) -> Option<PeerStats> {
    let durations: Vec<f64> = category_peers(contracts, category, None)
        .map(|c| c.duration_days() as f64)
        .collect();
    population_stats(&durations, min_n)
}

/// Amendment-count statistics over a category.
pub fn category_amendment_count_stats(
    contracts: &[Contract],
    category: Category,
    min_n: usize,
) -> Option<PeerStats> {
    let counts: Vec<f64> = category_peers(contracts, category, None)
        .map(|c| c.amendments.len() as f64)
        .collect();
    population_stats(&counts, min_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn contract(id: &str, category: Category, value: f64, year: i32) -> Contract {
        let signed = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
        Contract {
            id: id.to_string(),
            category,
            value,
            signed_at: signed,
            starts_at: signed,
            ends_at: signed + chrono::Duration::days(180),
            published_at: None,
            description: "peer".to_string(),
            supplier_id: "s".to_string(),
            agency_id: "a".to_string(),
            amendments: vec![],
        }
    }

    #[test]
    fn test_population_stats_basic() {
        let stats = population_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 5).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std_dev, 2.0); // population, not sample
        assert_eq!(stats.count, 8);
    }

    #[test]
    fn test_population_stats_below_threshold() {
        assert!(population_stats(&[1.0, 2.0, 3.0, 4.0], 5).is_none());
        assert!(population_stats(&[], 1).is_none());
    }

    #[test]
    fn test_zero_spread_has_zero_std_dev() {
        let stats = population_stats(&[100.0; 5], 5).unwrap();
        assert_eq!(stats.mean, 100.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_category_value_stats_filters_category() {
        let contracts = vec![
            contract("c-1", Category::Goods, 100.0, 2023),
            contract("c-2", Category::Goods, 200.0, 2023),
            contract("c-3", Category::Works, 9_999.0, 2023),
        ];
        let stats = category_value_stats(&contracts, Category::Goods, None, 2).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 150.0);
    }

    #[test]
    fn test_category_value_stats_year_scope() {
        let contracts = vec![
            contract("c-1", Category::Goods, 100.0, 2022),
            contract("c-2", Category::Goods, 200.0, 2023),
            contract("c-3", Category::Goods, 300.0, 2023),
        ];
        let scoped = category_value_stats(&contracts, Category::Goods, Some(2023), 2).unwrap();
        assert_eq!(scoped.count, 2);
        assert_eq!(scoped.mean, 250.0);

        let all_time = category_value_stats(&contracts, Category::Goods, None, 2).unwrap();
        assert_eq!(all_time.count, 3);
    }

    #[test]
    fn test_duration_stats() {
        let contracts: Vec<Contract> = (0..5)
            .map(|i| contract(&format!("c-{i}"), Category::Health, 1_000.0, 2023))
            .collect();
        let stats = category_duration_stats(&contracts, Category::Health, 5).unwrap();
        assert_eq!(stats.mean, 180.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_amendment_count_stats() {
        let mut contracts: Vec<Contract> = (0..5)
            .map(|i| contract(&format!("c-{i}"), Category::Works, 1_000.0, 2023))
            .collect();
        contracts[0].amendments = vec![crate::model::Amendment {
            number: 1,
            value_change: 10.0,
            duration_change_days: 0,
        }];
        let stats = category_amendment_count_stats(&contracts, Category::Works, 5).unwrap();
        assert_eq!(stats.mean, 0.2);
    }
}
