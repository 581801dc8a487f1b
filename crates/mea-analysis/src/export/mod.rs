//! Output writers for downstream consumers.
//!
//! Wide per-metric pivots for plotting tools, the master long table and
//! exclusion audit logs as CSV, and the statistics report as JSON. All
//! writers format floats with `{}` so values round-trip through reparsing.

mod report;
mod wide;

pub use report::{
    write_baseline_exclusions_csv, write_exclusions_csv, write_master_csv, write_outliers_csv,
    write_stats_json,
};
pub use wide::write_wide_tables;

/// Reduce a metric name to a portable file-name stem.
///
/// Instrument metric names carry spaces, slashes, and parentheses that are
/// hostile to file systems and shell scripts.
pub(crate) fn safe_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else if matches!(c, ' ' | '/' | '\\' | '-' | '.') && !out.ends_with('_') {
            out.push('_');
        }
        // anything else (parentheses, quotes, ...) is dropped
    }
    out.trim_matches('_').to_string()
}

/// Quote a CSV field if it contains a delimiter, quote, or newline.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_filename_flattens_instrument_names() {
        assert_eq!(
            safe_filename("Mean Firing Rate (Hz)"),
            "Mean_Firing_Rate_Hz"
        );
        assert_eq!(safe_filename("Spikes/Burst"), "Spikes_Burst");
        assert_eq!(safe_filename("already_safe"), "already_safe");
    }

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
