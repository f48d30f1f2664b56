use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The eight independent anomaly signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    Value,
    Amendment,
    Concentration,
    Duration,
    Timing,
    RoundNumber,
    Fragmentation,
    Description,
}

impl Criterion {
    /// All criteria in their canonical (display and consolidation) order.
    pub const ALL: [Criterion; 8] = [
        Criterion::Value,
        Criterion::Amendment,
        Criterion::Concentration,
        Criterion::Duration,
        Criterion::Timing,
        Criterion::RoundNumber,
        Criterion::Fragmentation,
        Criterion::Description,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Value => "value",
            Criterion::Amendment => "amendment",
            Criterion::Concentration => "concentration",
            Criterion::Duration => "duration",
            Criterion::Timing => "timing",
            Criterion::RoundNumber => "round-number",
            Criterion::Fragmentation => "fragmentation",
            Criterion::Description => "description",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Consolidated risk rating derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    /// Step function over the total score. Thresholds are fixed at the
    /// 8-criterion scale regardless of how many criteria have run so far;
    /// partially scored contracts simply sit lower on the same scale.
    pub fn from_total(total: u16) -> Self {
        if total > 100 {
            RiskCategory::High
        } else if total > 50 {
            RiskCategory::Medium
        } else {
            RiskCategory::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One criterion's persisted outcome: a 0-25 score and the reason text.
/// `reason` stays `None` until the criterion has actually run, which is how
/// the batch processor tells "scored zero" apart from "not scored yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub score: u8,
    #[serde(default)]
    pub reason: Option<String>,
}

/// The single score row attached to a contract. Created by whichever
/// criterion runs first and mutated in place by the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScore {
    pub contract_id: String,
    #[serde(default)]
    pub value: CriterionScore,
    #[serde(default)]
    pub amendment: CriterionScore,
    #[serde(default)]
    pub concentration: CriterionScore,
    #[serde(default)]
    pub duration: CriterionScore,
    #[serde(default)]
    pub timing: CriterionScore,
    #[serde(default)]
    pub round_number: CriterionScore,
    #[serde(default)]
    pub fragmentation: CriterionScore,
    #[serde(default)]
    pub description: CriterionScore,
    pub total_score: u16,
    pub category: RiskCategory,
    pub calculated_at: DateTime<Utc>,
}

impl AnomalyScore {
    /// Fresh row with all eight criteria unset, totalling zero.
    pub fn new(contract_id: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            value: CriterionScore::default(),
            amendment: CriterionScore::default(),
            concentration: CriterionScore::default(),
            duration: CriterionScore::default(),
            timing: CriterionScore::default(),
            round_number: CriterionScore::default(),
            fragmentation: CriterionScore::default(),
            description: CriterionScore::default(),
            total_score: 0,
            category: RiskCategory::Low,
            calculated_at: Utc::now(),
        }
    }

    pub fn criterion(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::Value => &self.value,
            Criterion::Amendment => &self.amendment,
            Criterion::Concentration => &self.concentration,
            Criterion::Duration => &self.duration,
            Criterion::Timing => &self.timing,
            Criterion::RoundNumber => &self.round_number,
            Criterion::Fragmentation => &self.fragmentation,
            Criterion::Description => &self.description,
        }
    }

    pub fn criterion_mut(&mut self, criterion: Criterion) -> &mut CriterionScore {
        match criterion {
            Criterion::Value => &mut self.value,
            Criterion::Amendment => &mut self.amendment,
            Criterion::Concentration => &mut self.concentration,
            Criterion::Duration => &mut self.duration,
            Criterion::Timing => &mut self.timing,
            Criterion::RoundNumber => &mut self.round_number,
            Criterion::Fragmentation => &mut self.fragmentation,
            Criterion::Description => &mut self.description,
        }
    }

    /// Whether the given criterion has run for this row.
    pub fn has_run(&self, criterion: Criterion) -> bool {
        self.criterion(criterion).reason.is_some()
    }

    /// Sum of the eight stored scores. Consolidation keeps `total_score`
    /// equal to this at all times.
    pub fn sum_of_criteria(&self) -> u16 {
        Criterion::ALL
            .iter()
            .map(|c| self.criterion(*c).score as u16)
            .sum()
    }
}
