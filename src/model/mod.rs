mod contract;
mod score;

pub use contract::{Amendment, Category, Contract};
pub use score::{AnomalyScore, Criterion, CriterionScore, RiskCategory};
