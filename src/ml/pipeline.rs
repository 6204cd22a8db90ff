//! Analysis pipeline: stdev report, exclusion, correlation and report files

use crate::dataset::Dataset;
use crate::error::{FeatError, Result};
use crate::ml::correlation::PearsonCorrelation;
use crate::ml::heatmap::{plot_heat_map, Colormap};
use crate::ml::output::{write_correlation_csv, write_stats_json};
use crate::ml::stats::StdevThreshold;
use crate::structs::{CorrelationMatrix, FeatureReport, RedundantPair};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Configuration for the analysis pipeline
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub ntype: String,
    pub threshold: f64,
    /// Keep low-variance features in the correlation
    pub keep_low_variance: bool,
    /// Extra feature indices to drop before correlating
    pub exclude: Vec<usize>,
    /// Minimum |r| for a pair to be reported as redundant
    pub redundancy: f64,
    /// Directory receiving `stats.json`, `correlation.csv` and the heat map
    pub output_dir: Option<PathBuf>,
    pub heat_map_file: String,
    pub colormap: Colormap,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ntype: "atom".to_string(),
            threshold: 0.0,
            keep_low_variance: false,
            exclude: Vec::new(),
            redundancy: 0.95,
            output_dir: None,
            heat_map_file: crate::ml::heatmap::DEFAULT_HEAT_MAP_FILE.to_string(),
            colormap: Colormap::default(),
        }
    }
}

/// Everything the pipeline computed
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub report: FeatureReport,
    /// Feature indices dropped before correlating, ascending
    pub excluded: Vec<usize>,
    pub correlation: CorrelationMatrix,
    pub redundant: Vec<RedundantPair>,
    /// Files written, in order
    pub outputs: Vec<PathBuf>,
}

/// Run the full analysis pipeline, writing the stdev report to `out`
///
/// # Errors
/// Returns error if any stage fails; nothing is recovered
pub fn run_pipeline<D: Dataset, W: Write>(
    dataset: &D,
    config: &AnalysisConfig,
    out: &mut W,
) -> Result<AnalysisResult> {
    let ntype = config.ntype.as_str();

    let mut stdev = StdevThreshold::with_threshold(dataset, config.threshold)?;
    let report = stdev.summarize(ntype)?;
    write!(out, "{report}")?;

    let mut excluded: BTreeSet<usize> = config.exclude.iter().copied().collect();
    if !config.keep_low_variance {
        excluded.extend(report.low_variance_indices());
    }
    let excluded: Vec<usize> = excluded.into_iter().collect();
    info!(ntype, excluded = ?excluded, "correlating features");

    let correlation =
        PearsonCorrelation::new(dataset).compute_labeled(ntype, Some(excluded.as_slice()))?;
    if correlation.dim() == 0 {
        return Err(FeatError::NoFeaturesLeft {
            ntype: ntype.to_string(),
            excluded,
        });
    }
    let redundant = correlation.redundant_pairs(config.redundancy);

    let mut outputs = Vec::new();
    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)?;

        let stats_path = dir.join("stats.json");
        write_stats_json(&stats_path, &report)?;
        outputs.push(stats_path);

        let csv_path = dir.join("correlation.csv");
        write_correlation_csv(&csv_path, &correlation)?;
        outputs.push(csv_path);

        let heat_map_path = dir.join(&config.heat_map_file);
        plot_heat_map(
            &correlation.matrix,
            &correlation.names,
            &heat_map_path,
            config.colormap,
        )?;
        outputs.push(heat_map_path);
    }

    Ok(AnalysisResult {
        report,
        excluded,
        correlation,
        redundant,
        outputs,
    })
}
