use crate::dataset::Dataset;
use crate::error::{FeatError, Result};
use crate::ml::features::stack_features;
use crate::structs::{FeatureReport, FeatureStat};
use ndarray::{Array1, Axis};
use std::io::Write;

/// Analyzer flagging features whose standard deviation is at most a threshold.
///
/// The stdev and mean vectors of the last [`compute`](Self::compute) call are kept
/// for later inspection and overwritten on every call.
pub struct StdevThreshold<'a, D: Dataset> {
    dataset: &'a D,
    threshold: f64,
    stdevs: Option<Array1<f64>>,
    means: Option<Array1<f64>>,
}

impl<'a, D: Dataset> StdevThreshold<'a, D> {
    /// Analyzer with a threshold of `0.0`
    #[must_use]
    pub fn new(dataset: &'a D) -> Self {
        Self {
            dataset,
            threshold: 0.0,
            stdevs: None,
            means: None,
        }
    }

    /// # Errors
    /// Returns `InvalidThreshold` if `threshold` is negative or not finite
    pub fn with_threshold(dataset: &'a D, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(FeatError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            ..Self::new(dataset)
        })
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn stdevs(&self) -> Option<&Array1<f64>> {
        self.stdevs.as_ref()
    }

    #[must_use]
    pub fn means(&self) -> Option<&Array1<f64>> {
        self.means.as_ref()
    }

    /// Compute per-feature stdev and mean, print a report to stdout, and return
    /// the indices of features whose stdev is at most the threshold.
    ///
    /// # Errors
    /// Returns `AllFeaturesBelowThreshold` if no feature exceeds the threshold,
    /// or any error from stacking the features
    pub fn compute(&mut self, ntype: &str) -> Result<Vec<usize>> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        self.compute_with_writer(ntype, &mut lock)
    }

    /// Same as [`compute`](Self::compute) with the report written to `out`
    ///
    /// # Errors
    /// See [`compute`](Self::compute); also fails if writing the report fails
    pub fn compute_with_writer<W: Write>(&mut self, ntype: &str, out: &mut W) -> Result<Vec<usize>> {
        let report = self.summarize(ntype)?;
        write!(out, "{report}")?;
        Ok(report.low_variance_indices())
    }

    /// Compute the statistics without printing anything
    ///
    /// # Errors
    /// See [`compute`](Self::compute)
    pub fn summarize(&mut self, ntype: &str) -> Result<FeatureReport> {
        let data = stack_features(self.dataset, ntype)?;

        let stdevs = data.std_axis(Axis(0), 0.0);
        let means = data
            .mean_axis(Axis(0))
            .ok_or_else(|| FeatError::NoObservations(ntype.to_string()))?;
        self.stdevs = Some(stdevs.clone());
        self.means = Some(means.clone());

        let threshold = self.threshold;
        if stdevs.iter().all(|&s| s <= threshold) {
            return Err(FeatError::AllFeaturesBelowThreshold { threshold });
        }

        let names = self.dataset.feature_names(ntype)?;
        let features = names
            .iter()
            .zip(stdevs.iter().zip(means.iter()))
            .enumerate()
            .map(|(index, (name, (&stdev, &mean)))| FeatureStat {
                index,
                name: name.clone(),
                stdev,
                mean,
                below_threshold: stdev <= threshold,
            })
            .collect();

        Ok(FeatureReport {
            ntype: ntype.to_string(),
            threshold,
            features,
        })
    }
}
