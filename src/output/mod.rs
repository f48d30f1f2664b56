mod formatter;

pub use formatter::{
    format_batch_stats, format_consolidated, format_report, format_result, format_score_table,
    should_use_colors,
};
