//! Pearson correlation between feature columns

use crate::dataset::Dataset;
use crate::error::{FeatError, Result};
use crate::ml::features::stack_features;
use crate::structs::CorrelationMatrix;
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeSet;
use tracing::warn;

/// Analyzer computing the Pearson correlation coefficients between the features
/// of a node type
pub struct PearsonCorrelation<'a, D: Dataset> {
    dataset: &'a D,
}

impl<'a, D: Dataset> PearsonCorrelation<'a, D> {
    #[must_use]
    pub fn new(dataset: &'a D) -> Self {
        Self { dataset }
    }

    /// Correlation matrix between the features of `ntype`, after dropping the
    /// columns listed in `exclude`
    ///
    /// Columns with zero variance yield NaN rows and columns; drop them first
    /// with the indices returned by `StdevThreshold::compute`.
    ///
    /// # Errors
    /// Returns error if stacking fails or an excluded index is out of range
    pub fn compute(&self, ntype: &str, exclude: Option<&[usize]>) -> Result<Array2<f64>> {
        let data = stack_features(self.dataset, ntype)?;
        let keep = kept_columns(data.ncols(), exclude)?;
        let corr = pearson_matrix(&data.select(Axis(1), &keep));

        let undefined = corr.iter().filter(|v| v.is_nan()).count();
        if undefined > 0 {
            warn!(ntype, undefined, "correlation has undefined entries from zero-variance features");
        }

        Ok(corr)
    }

    /// Like [`compute`](Self::compute), paired with the names of the kept features
    ///
    /// # Errors
    /// See [`compute`](Self::compute)
    pub fn compute_labeled(
        &self,
        ntype: &str,
        exclude: Option<&[usize]>,
    ) -> Result<CorrelationMatrix> {
        let names = self.dataset.feature_names(ntype)?;
        let matrix = self.compute(ntype, exclude)?;
        let keep = kept_columns(names.len(), exclude)?;

        Ok(CorrelationMatrix {
            names: keep.iter().map(|&i| names[i].clone()).collect(),
            matrix,
        })
    }
}

/// Column indices surviving `exclude`, in ascending order
fn kept_columns(n_features: usize, exclude: Option<&[usize]>) -> Result<Vec<usize>> {
    let dropped: BTreeSet<usize> = exclude.unwrap_or_default().iter().copied().collect();

    if let Some(&index) = dropped.iter().find(|&&i| i >= n_features) {
        return Err(FeatError::InvalidFeatureIndex { index, n_features });
    }

    Ok((0..n_features).filter(|i| !dropped.contains(i)).collect())
}

/// Pearson correlation between the columns of `data` (rows are observations)
///
/// The result is symmetric with entries clamped to [-1, 1]. Pairs involving a
/// zero-variance column are NaN, including its diagonal entry.
#[must_use]
pub fn pearson_matrix(data: &Array2<f64>) -> Array2<f64> {
    let n = data.ncols();
    let means = data
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(n));

    let centered = data - &means;
    let cov = centered.t().dot(&centered);
    let scale = cov.diag().mapv(f64::sqrt);

    let mut corr = Array2::zeros((n, n));
    for i in 0..n {
        corr[[i, i]] = if scale[i] > 0.0 { 1.0 } else { f64::NAN };
        for j in (i + 1)..n {
            let r = (cov[[i, j]] / (scale[i] * scale[j])).clamp(-1.0, 1.0);
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }

    corr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::atom_dataset;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_correlation() {
        let data = array![[1.0, 2.0, 10.0], [2.0, 4.0, 20.0], [3.0, 6.0, -30.0]];
        let corr = pearson_matrix(&data);

        assert_eq!(corr.shape(), &[3, 3]);
        assert!((corr[[0, 0]] - 1.0).abs() < 1e-12);
        assert!((corr[[0, 1]] - 1.0).abs() < 1e-12);
        assert!(corr[[0, 2]] < 0.0);
    }

    #[test]
    fn test_dataset_correlation() {
        let dataset = atom_dataset();
        let analyzer = PearsonCorrelation::new(&dataset);

        let corr = analyzer.compute("atom", Some(&[2][..])).expect("correlate");

        assert_eq!(corr.shape(), &[2, 2]);
        // cov = 24, var sums 32 and 19.2
        let expected = 24.0 / (32.0_f64 * 19.2).sqrt();
        assert!((corr[[0, 1]] - expected).abs() < 1e-9);
        assert!((corr[[1, 0]] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_is_nan() {
        let dataset = atom_dataset();
        let analyzer = PearsonCorrelation::new(&dataset);

        let corr = analyzer.compute("atom", None).expect("correlate");

        assert_eq!(corr.shape(), &[3, 3]);
        assert!(corr[[2, 2]].is_nan());
        assert!(corr[[0, 2]].is_nan());
        assert!((corr[[0, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_labeled_names_follow_exclusion() {
        let dataset = atom_dataset();
        let analyzer = PearsonCorrelation::new(&dataset);

        let corr = analyzer
            .compute_labeled("atom", Some(&[0][..]))
            .expect("correlate");

        assert_eq!(corr.names, vec!["degree", "is_metal"]);
        assert_eq!(corr.matrix.shape(), &[2, 2]);
    }

    #[test]
    fn test_exclude_out_of_range() {
        let dataset = atom_dataset();
        let analyzer = PearsonCorrelation::new(&dataset);

        assert!(matches!(
            analyzer.compute("atom", Some(&[7][..])),
            Err(FeatError::InvalidFeatureIndex {
                index: 7,
                n_features: 3
            })
        ));
    }

    #[test]
    fn test_duplicate_excludes_collapse() {
        assert_eq!(kept_columns(4, Some(&[1, 1, 3][..])).expect("keep"), vec![0, 2]);
        assert_eq!(kept_columns(3, None).expect("keep"), vec![0, 1, 2]);
    }

    fn matrix_strategy() -> impl Strategy<Value = Array2<f64>> {
        (3_usize..20, 1_usize..6).prop_flat_map(|(rows, cols)| {
            prop::collection::vec(-100.0_f64..100.0, rows * cols).prop_map(move |flat| {
                Array2::from_shape_vec((rows, cols), flat).expect("shape matches")
            })
        })
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_bounded(data in matrix_strategy()) {
            let corr = pearson_matrix(&data);
            let n = data.ncols();
            prop_assert_eq!(corr.shape(), &[n, n]);

            for i in 0..n {
                let d = corr[[i, i]];
                prop_assert!(d.is_nan() || (d - 1.0).abs() < 1e-12);
                for j in 0..n {
                    let (a, b) = (corr[[i, j]], corr[[j, i]]);
                    prop_assert!(a.to_bits() == b.to_bits());
                    prop_assert!(a.is_nan() || (-1.0..=1.0).contains(&a));
                }
            }
        }

        #[test]
        fn prop_exclusion_shrinks_dimension(
            n_features in 1_usize..10,
            picks in prop::collection::btree_set(0_usize..10, 0..5)
        ) {
            let exclude: Vec<usize> = picks.into_iter().filter(|&i| i < n_features).collect();
            let keep = kept_columns(n_features, Some(exclude.as_slice())).expect("in range");
            prop_assert_eq!(keep.len(), n_features - exclude.len());
        }
    }
}
