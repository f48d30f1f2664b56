use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Spending domain a contract was classified into. `Uncategorized` is the
/// residual value for contracts the classifier could not place; statistical
/// criteria refuse to score those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Works,
    Services,
    Goods,
    InformationTechnology,
    Health,
    Uncategorized,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Works => "works",
            Category::Services => "services",
            Category::Goods => "goods",
            Category::InformationTechnology => "information-technology",
            Category::Health => "health",
            Category::Uncategorized => "uncategorized",
        }
    }

    /// Whether peer-group statistics make sense for this category.
    pub fn is_scorable(&self) -> bool {
        !matches!(self, Category::Uncategorized)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A contractual modification applied after signature. Owned by a contract;
/// never mutated once scoring has seen it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amendment {
    pub number: u32,
    pub value_change: f64,
    pub duration_change_days: i32,
}

/// A procurement contract as read from the store. This crate never writes
/// contracts; it only reads them and attaches an [`AnomalyScore`] row.
///
/// [`AnomalyScore`]: super::AnomalyScore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub category: Category,
    /// Contracted value in currency units. Fractions are cents.
    pub value: f64,
    pub signed_at: NaiveDate,
    pub starts_at: NaiveDate,
    pub ends_at: NaiveDate,
    /// Date the call for tender was published, when known.
    #[serde(default)]
    pub published_at: Option<NaiveDate>,
    /// Free-text description of the contracted object.
    pub description: String,
    pub supplier_id: String,
    pub agency_id: String,
    #[serde(default)]
    pub amendments: Vec<Amendment>,
}

impl Contract {
    /// Contracted duration in days (end minus start).
    pub fn duration_days(&self) -> i64 {
        (self.ends_at - self.starts_at).num_days()
    }

    /// Year the contract was signed, the key for year-scoped peer groups.
    pub fn signature_year(&self) -> i32 {
        self.signed_at.year()
    }

    /// Sum of absolute amendment value changes.
    pub fn total_amendment_value(&self) -> f64 {
        self.amendments.iter().map(|a| a.value_change.abs()).sum()
    }

    /// Days between tender publication and signature, when both are known.
    pub fn days_published_to_signed(&self) -> Option<i64> {
        self.published_at.map(|p| (self.signed_at - p).num_days())
    }
}
