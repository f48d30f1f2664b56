use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::batch::BatchStats;
use crate::consolidation::Consolidated;
use crate::model::RiskCategory;
use crate::query::{ScorePage, ScoreReport};
use crate::scoring::CriterionResult;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

fn category_colored(category: RiskCategory, use_colors: bool) -> String {
    if !use_colors {
        return category.to_string();
    }
    match category {
        RiskCategory::Low => category.green().to_string(),
        RiskCategory::Medium => category.yellow().to_string(),
        RiskCategory::High => category.red().bold().to_string(),
    }
}

/// Format a single criterion result (for the on-demand `score` command).
pub fn format_result(result: &CriterionResult, use_colors: bool) -> String {
    let marker = if result.is_anomaly {
        if use_colors {
            "ANOMALY".red().bold().to_string()
        } else {
            "ANOMALY".to_string()
        }
    } else {
        "ok".to_string()
    };

    let mut out = format!(
        "{}: {}/25 [{}]\n  {}",
        result.criterion, result.score, marker, result.reason
    );
    if let Some(stats) = &result.stats {
        out.push_str(&format!(
            "\n  peers: {} (mean {:.2}, std dev {:.2})",
            stats.count, stats.mean, stats.std_dev
        ));
    }
    out
}

/// Format a consolidated score with its full breakdown (multi-line).
pub fn format_consolidated(consolidated: &Consolidated, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "{}: {}/200 [{}]",
        if use_colors {
            consolidated.contract_id.bold().to_string()
        } else {
            consolidated.contract_id.clone()
        },
        consolidated.total_score,
        category_colored(consolidated.category, use_colors)
    )];

    for entry in &consolidated.breakdown {
        let reason = entry.reason.as_deref().unwrap_or("(not scored yet)");
        lines.push(format!(
            "  {:<15} {:>2}/25  {}",
            entry.criterion.to_string(),
            entry.score,
            reason
        ));
    }

    lines.join("\n")
}

/// Format one page of scored contracts as a table, one line per contract.
pub fn format_score_table(page: &ScorePage, use_colors: bool) -> String {
    if page.items.is_empty() {
        return "No scored contracts match the filter.".to_string();
    }

    let width = get_terminal_width().unwrap_or(usize::MAX);
    let mut lines: Vec<String> = page
        .items
        .iter()
        .map(|c| {
            let criteria = c
                .contributing_criteria
                .iter()
                .map(|cr| cr.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let line = format!(
                "{:>3}  {:<8}  {}  [{}]",
                c.total_score,
                category_colored(c.category, use_colors),
                c.contract_id,
                criteria
            );
            truncate_line(&line, width)
        })
        .collect();

    lines.push(format!(
        "page {}/{} ({} contracts)",
        page.page,
        page.total_pages.max(1),
        page.total
    ));
    lines.join("\n")
}

/// Format batch run statistics (one line per field, verbose-friendly).
pub fn format_batch_stats(stats: &BatchStats) -> String {
    let elapsed = stats.finished_at - stats.started_at;
    let mut out = format!(
        "{}: processed {}, calculated {}, anomalies {}, errors {} in {}ms",
        stats.criterion,
        stats.processed,
        stats.calculated,
        stats.anomalies_found,
        stats.errors,
        elapsed.num_milliseconds()
    );
    if let Some(err) = &stats.last_error {
        out.push_str(&format!("\n  last error: {err}"));
    }
    out
}

/// Format the aggregate score report.
pub fn format_report(report: &ScoreReport, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "{} scored contracts, average total {:.1}/200",
        report.scored_contracts, report.average_total
    )];

    lines.push("by risk category:".to_string());
    for (category, count) in &report.by_category {
        lines.push(format!(
            "  {:<8} {}",
            category_colored(*category, use_colors),
            count
        ));
    }

    lines.push("criteria contributing (score > 0):".to_string());
    for (criterion, count) in &report.contributing {
        lines.push(format!("  {:<15} {}", criterion.to_string(), count));
    }

    lines.join("\n")
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a line to fit available width, accounting for Unicode
fn truncate_line(line: &str, max_width: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_width {
        line.to_string()
    } else if max_width > 3 {
        let truncated: String = chars[..max_width - 3].iter().collect();
        format!("{truncated}...")
    } else {
        chars[..max_width].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Criterion;

    #[test]
    fn test_format_result_plain() {
        let result = CriterionResult::insufficient(Criterion::Value, "too few peers");
        let out = format_result(&result, false);
        assert!(out.contains("value: 0/25 [ok]"));
        assert!(out.contains("too few peers"));
    }

    #[test]
    fn test_format_result_includes_stats() {
        let result = CriterionResult::clear(
            Criterion::Duration,
            "within band",
            Some(crate::stats::PeerStats {
                mean: 180.0,
                std_dev: 20.0,
                count: 9,
            }),
        );
        let out = format_result(&result, false);
        assert!(out.contains("peers: 9"));
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("short", 80), "short");
        assert_eq!(truncate_line("abcdefghij", 8), "abcde...");
    }
}
