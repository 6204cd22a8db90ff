//! Consolidated result types shared by the analyzers, outputs and CLI

use ndarray::Array2;
use serde::Serialize;
use std::fmt;

const RULE_WIDTH: usize = 80;

// ============================================================================
// Stdev Types
// ============================================================================

/// Statistics of a single feature column
#[derive(Debug, Clone, Serialize)]
pub struct FeatureStat {
    pub index: usize,
    pub name: String,
    pub stdev: f64,
    pub mean: f64,
    pub below_threshold: bool,
}

/// Per-feature statistics of one node type against a stdev threshold
#[derive(Debug, Clone, Serialize)]
pub struct FeatureReport {
    pub ntype: String,
    pub threshold: f64,
    pub features: Vec<FeatureStat>,
}

impl FeatureReport {
    /// Ascending indices of features whose stdev is at most the threshold
    #[must_use]
    pub fn low_variance_indices(&self) -> Vec<usize> {
        self.features
            .iter()
            .filter(|f| f.below_threshold)
            .map(|f| f.index)
            .collect()
    }
}

impl fmt::Display for FeatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max_name_len = self
            .features
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Node type: {}", self.ntype)?;
        writeln!(
            f,
            "feature{}stdev    mean   less than threshold ({:?})",
            " ".repeat(max_name_len),
            self.threshold
        )?;
        for stat in &self.features {
            let pad = " ".repeat(max_name_len - stat.name.chars().count());
            writeln!(
                f,
                "{:2} ({}){pad} {:.5}  {:.5}  {}",
                stat.index,
                stat.name,
                stat.stdev,
                stat.mean,
                if stat.below_threshold { "yes" } else { "no" }
            )?;
        }
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))
    }
}

// ============================================================================
// Correlation Types
// ============================================================================

/// Pearson correlation matrix with the names of the correlated features
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub matrix: Array2<f64>,
}

/// A pair of features whose absolute correlation is high
#[derive(Debug, Clone, PartialEq)]
pub struct RedundantPair {
    pub first: String,
    pub second: String,
    pub r: f64,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn dim(&self) -> usize {
        self.names.len()
    }

    /// Pairs with `|r| >= min_abs`, strongest first. NaN entries never match.
    #[must_use]
    pub fn redundant_pairs(&self, min_abs: f64) -> Vec<RedundantPair> {
        let n = self.dim();
        let mut pairs = Vec::new();

        for i in 0..n {
            for j in (i + 1)..n {
                let r = self.matrix[[i, j]];
                if r.abs() >= min_abs {
                    pairs.push(RedundantPair {
                        first: self.names[i].clone(),
                        second: self.names[j].clone(),
                        r,
                    });
                }
            }
        }

        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs
    }

    /// Number of undefined entries (from zero-variance columns)
    #[must_use]
    pub fn nan_count(&self) -> usize {
        self.matrix.iter().filter(|v| v.is_nan()).count()
    }
}
