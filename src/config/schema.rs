use serde::{Deserialize, Serialize};

/// Top-level configuration file.
///
/// Example YAML:
/// ```yaml
/// store: /var/lib/tender-radar/store.json
/// scoring:
///   min_contracts_for_stats: 5
///   batch_size: 100
///   value_sigma_threshold: 2.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the JSON store file (defaults to ~/.config/tender-radar/store.json)
    #[serde(default)]
    pub store: Option<String>,

    /// Scoring thresholds; every field has a default
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,
}

/// Thresholds and knobs for the eight criterion scorers and the batch
/// processor. Every field defaults to the values the scorers were tuned
/// with; a config file only needs the fields it wants to change.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Minimum peer-group size before statistics are trusted.
    /// Smaller groups make every dependent scorer report insufficient data.
    #[serde(default = "default_min_contracts")]
    pub min_contracts_for_stats: usize,

    /// Maximum contracts scored per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Value criterion: standard deviations above the peer mean before a
    /// contract value is flagged.
    #[serde(default = "default_value_sigma")]
    pub value_sigma_threshold: f64,

    /// Amendment criterion: sigmas above the mean amendment count.
    #[serde(default = "default_amendment_count_sigma")]
    pub amendment_count_sigma: f64,

    /// Amendment criterion: total |value change| over original value.
    #[serde(default = "default_amendment_value_ratio")]
    pub amendment_value_ratio: f64,

    /// Concentration criterion: supplier share of an agency's contracts
    /// (by count or value) before flagging.
    #[serde(default = "default_concentration_share")]
    pub concentration_share_threshold: f64,

    /// Duration criterion: absolute sigmas from the peer mean duration.
    #[serde(default = "default_duration_sigma")]
    pub duration_sigma_threshold: f64,

    /// Timing criterion: days between publication and signature considered
    /// suspiciously short.
    #[serde(default = "default_publication_window")]
    pub publication_window_days: i64,

    /// Fragmentation: lower and upper bound of the near-dispensa value band.
    /// The upper bound is the dispensa limit itself.
    #[serde(default = "default_dispensa_band_floor")]
    pub dispensa_band_floor: f64,
    #[serde(default = "default_dispensa_limit")]
    pub dispensa_limit: f64,

    /// Fragmentation: signature-date window for same supplier+agency clusters.
    #[serde(default = "default_fragmentation_window")]
    pub fragmentation_window_days: i64,

    /// Fragmentation: cluster size (self included) that triggers the flag.
    #[serde(default = "default_fragmentation_cluster")]
    pub fragmentation_min_cluster: usize,

    /// Fragmentation: Jaccard word-set similarity above which two nearby
    /// contract descriptions count as the same object split in parts.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Description criterion: character bounds for too-short / too-long text.
    #[serde(default = "default_short_description")]
    pub short_description_chars: usize,
    #[serde(default = "default_long_description")]
    pub long_description_chars: usize,

    /// Description criterion: phrases that mark a vague object description.
    /// Matched case-insensitively.
    #[serde(default = "default_vague_terms")]
    pub vague_terms: Vec<String>,

    /// Description criterion: regex flagging brand/model lock-in wording.
    #[serde(default = "default_brand_model_pattern")]
    pub brand_model_pattern: String,
}

fn default_min_contracts() -> usize {
    5
}
fn default_batch_size() -> usize {
    100
}
fn default_value_sigma() -> f64 {
    2.0
}
fn default_amendment_count_sigma() -> f64 {
    1.5
}
fn default_amendment_value_ratio() -> f64 {
    0.5
}
fn default_concentration_share() -> f64 {
    0.30
}
fn default_duration_sigma() -> f64 {
    1.5
}
fn default_publication_window() -> i64 {
    3
}
fn default_dispensa_band_floor() -> f64 {
    40_000.0
}
fn default_dispensa_limit() -> f64 {
    50_000.0
}
fn default_fragmentation_window() -> i64 {
    30
}
fn default_fragmentation_cluster() -> usize {
    3
}
fn default_similarity_threshold() -> f64 {
    0.7
}
fn default_short_description() -> usize {
    50
}
fn default_long_description() -> usize {
    2000
}

fn default_vague_terms() -> Vec<String> {
    [
        "diversos",
        "conforme necessidade",
        "entre outros",
        "e afins",
        "material diverso",
        "servicos gerais",
        "etc",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_brand_model_pattern() -> String {
    // "marca X", "modelo Y", "ref: Z" style wording that steers the tender
    // toward a single vendor.
    r"(?i)\b(marca|modelo|ref\.?|referencia)\s*[:\-]?\s+\S+".to_string()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_contracts_for_stats: default_min_contracts(),
            batch_size: default_batch_size(),
            value_sigma_threshold: default_value_sigma(),
            amendment_count_sigma: default_amendment_count_sigma(),
            amendment_value_ratio: default_amendment_value_ratio(),
            concentration_share_threshold: default_concentration_share(),
            duration_sigma_threshold: default_duration_sigma(),
            publication_window_days: default_publication_window(),
            dispensa_band_floor: default_dispensa_band_floor(),
            dispensa_limit: default_dispensa_limit(),
            fragmentation_window_days: default_fragmentation_window(),
            fragmentation_min_cluster: default_fragmentation_cluster(),
            similarity_threshold: default_similarity_threshold(),
            short_description_chars: default_short_description(),
            long_description_chars: default_long_description(),
            vague_terms: default_vague_terms(),
            brand_model_pattern: default_brand_model_pattern(),
        }
    }
}
