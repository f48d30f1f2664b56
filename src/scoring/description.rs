use regex::Regex;

use super::{fetch_contract, CriterionResult};
use crate::config::ScoringConfig;
use crate::error::ScoreError;
use crate::model::{Contract, Criterion};
use crate::store::ContractStore;

/// Description criterion: object text that hides what was bought. Too short
/// to audit, padded with vague phrasing, steering the tender to one brand or
/// model, or so long it buries the object. Pure text heuristics; there is
/// no language model behind this despite what the name might suggest.
pub fn score<S: ContractStore>(
    store: &S,
    config: &ScoringConfig,
    contract_id: &str,
) -> Result<CriterionResult, ScoreError> {
    let contract = fetch_contract(store, contract_id)?;
    evaluate(&contract, config)
}

fn evaluate(contract: &Contract, config: &ScoringConfig) -> Result<CriterionResult, ScoreError> {
    // Config validation checks this pattern at startup; a failure here means
    // the engine was handed an unvalidated config.
    let brand_regex = Regex::new(&config.brand_model_pattern)
        .map_err(|e| ScoreError::CalculationFailed(format!("brand/model regex: {e}")))?;

    let text = contract.description.trim();
    let chars = text.chars().count();
    let lower = text.to_lowercase();

    let mut flags: Vec<String> = Vec::new();
    let mut raw = 0.0;

    if chars < config.short_description_chars {
        raw += 10.0;
        flags.push(format!(
            "description has only {chars} characters (minimum {})",
            config.short_description_chars
        ));
    }

    if let Some(term) = config
        .vague_terms
        .iter()
        .find(|t| lower.contains(&t.to_lowercase()))
    {
        raw += 5.0;
        flags.push(format!("description contains vague phrasing (\"{term}\")"));
    }

    if brand_regex.is_match(text) {
        raw += 10.0;
        flags.push("description names a specific brand or model".to_string());
    }

    if chars > config.long_description_chars {
        raw += 5.0;
        flags.push(format!(
            "description has {chars} characters (maximum {})",
            config.long_description_chars
        ));
    }

    Ok(if raw > 0.0 {
        CriterionResult::flagged(Criterion::Description, raw, flags.join("; "), None)
    } else {
        CriterionResult::clear(
            Criterion::Description,
            "description length and wording are unremarkable",
            None,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    fn contract(description: &str) -> Contract {
        let signed = NaiveDate::from_ymd_opt(2023, 4, 3).unwrap();
        Contract {
            id: "c-1".to_string(),
            category: Category::Goods,
            value: 10_000.0,
            signed_at: signed,
            starts_at: signed,
            ends_at: signed + chrono::Duration::days(180),
            published_at: None,
            description: description.to_string(),
            supplier_id: "s-1".to_string(),
            agency_id: "a-1".to_string(),
            amendments: vec![],
        }
    }

    fn eval(description: &str) -> CriterionResult {
        evaluate(&contract(description), &ScoringConfig::default()).unwrap()
    }

    #[test]
    fn test_short_description() {
        let result = eval("compra de material");
        assert_eq!(result.score, 10);
        assert!(result.reason.contains("characters"));
    }

    #[test]
    fn test_vague_term() {
        let result = eval(
            "Aquisicao de materiais de escritorio diversos para atendimento da secretaria municipal",
        );
        assert_eq!(result.score, 5);
        assert!(result.reason.contains("diversos"));
    }

    #[test]
    fn test_brand_model_wording() {
        let result = eval(
            "Aquisicao de 40 computadores de mesa marca Dell modelo Optiplex para a secretaria",
        );
        assert_eq!(result.score, 10);
        assert!(result.reason.contains("brand or model"));
    }

    #[test]
    fn test_overlong_description() {
        let long = "Contratacao de empresa especializada no fornecimento parcelado de generos alimenticios destinados a merenda escolar. ".repeat(20);
        let result = eval(&long);
        assert_eq!(result.score, 5);
        assert!(result.reason.contains("maximum"));
    }

    #[test]
    fn test_multiple_flags_sum_and_cap() {
        // Short, vague AND brand-specific: 10 + 5 + 10 = 25.
        let result = eval("diversos marca Acme itens");
        assert_eq!(result.score, 25);
        assert!(result.is_anomaly);
    }

    #[test]
    fn test_clean_description() {
        let result = eval(
            "Contratacao de empresa para reforma do telhado da escola municipal Jardim das Flores, incluindo substituicao de telhas",
        );
        assert_eq!(result.score, 0);
        assert!(!result.is_anomaly);
        assert!(result.stats.is_none());
    }
}
