//! Report file writers for the analyze command

use crate::error::Result;
use crate::structs::{CorrelationMatrix, FeatureReport};
use std::fs;
use std::path::Path;

/// Write `stats.json` - machine-readable per-feature statistics
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_stats_json(path: &Path, report: &FeatureReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write `correlation.csv` - the labeled correlation matrix
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_correlation_csv(path: &Path, corr: &CorrelationMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = Vec::with_capacity(corr.dim() + 1);
    header.push("feature");
    header.extend(corr.names.iter().map(String::as_str));
    writer.write_record(&header)?;

    for (name, row) in corr.names.iter().zip(corr.matrix.rows()) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(name.clone());
        record.extend(row.iter().map(|&r| format_value(r)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn format_value(r: f64) -> String {
    if r.is_nan() {
        "NaN".to_string()
    } else {
        format!("{r:.6}")
    }
}
