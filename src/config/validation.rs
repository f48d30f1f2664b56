use super::schema::ScoringConfig;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.min_contracts_for_stats == 0 {
        errors.push("scoring.min_contracts_for_stats: must be at least 1".to_string());
    }

    if config.batch_size == 0 {
        errors.push("scoring.batch_size: must be at least 1".to_string());
    }

    if config.value_sigma_threshold <= 0.0 {
        errors.push("scoring.value_sigma_threshold: must be positive".to_string());
    }

    if config.amendment_count_sigma <= 0.0 {
        errors.push("scoring.amendment_count_sigma: must be positive".to_string());
    }

    if config.amendment_value_ratio <= 0.0 {
        errors.push("scoring.amendment_value_ratio: must be positive".to_string());
    }

    if !(0.0..1.0).contains(&config.concentration_share_threshold) {
        errors.push("scoring.concentration_share_threshold: must be in [0, 1)".to_string());
    }

    if config.duration_sigma_threshold <= 0.0 {
        errors.push("scoring.duration_sigma_threshold: must be positive".to_string());
    }

    if config.publication_window_days < 0 {
        errors.push("scoring.publication_window_days: must be non-negative".to_string());
    }

    if config.dispensa_band_floor >= config.dispensa_limit {
        errors.push(format!(
            "scoring.dispensa_band_floor: {} must be below dispensa_limit {}",
            config.dispensa_band_floor, config.dispensa_limit
        ));
    }

    if config.fragmentation_window_days <= 0 {
        errors.push("scoring.fragmentation_window_days: must be positive".to_string());
    }

    if config.fragmentation_min_cluster < 2 {
        errors.push("scoring.fragmentation_min_cluster: must be at least 2".to_string());
    }

    if !(0.0..=1.0).contains(&config.similarity_threshold) {
        errors.push("scoring.similarity_threshold: must be in [0, 1]".to_string());
    }

    if config.short_description_chars >= config.long_description_chars {
        errors.push(format!(
            "scoring.short_description_chars: {} must be below long_description_chars {}",
            config.short_description_chars, config.long_description_chars
        ));
    }

    if let Err(e) = regex::Regex::new(&config.brand_model_pattern) {
        errors.push(format!(
            "scoring.brand_model_pattern: invalid regex '{}' - {}",
            config.brand_model_pattern, e
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
