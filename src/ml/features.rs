use crate::dataset::{Dataset, Graph};
use crate::error::{FeatError, Result};
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use tracing::debug;

/// Stack the `ntype` feature blocks of every graph into one matrix, in dataset order
///
/// # Errors
/// Returns error if a graph lacks `ntype`, a block's width disagrees with the
/// feature names, or the dataset holds no `ntype` nodes at all
pub fn stack_features<D: Dataset>(dataset: &D, ntype: &str) -> Result<Array2<f64>> {
    let expected = dataset.feature_names(ntype)?.len();

    let mut blocks: Vec<ArrayView2<'_, f64>> = Vec::with_capacity(dataset.len());
    for (graph, _) in dataset.iter() {
        let block = graph.node_features(ntype)?;
        if block.ncols() != expected {
            return Err(FeatError::FeatureCountMismatch {
                ntype: ntype.to_string(),
                expected,
                found: block.ncols(),
            });
        }
        blocks.push(block);
    }

    if blocks.is_empty() {
        return Err(FeatError::NoObservations(ntype.to_string()));
    }

    let stacked = concatenate(Axis(0), &blocks)?;
    if stacked.nrows() == 0 {
        return Err(FeatError::NoObservations(ntype.to_string()));
    }

    debug!(
        ntype,
        graphs = blocks.len(),
        rows = stacked.nrows(),
        cols = stacked.ncols(),
        "stacked node features"
    );

    Ok(stacked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::atom_dataset;
    use crate::dataset::{GraphDataset, HeteroGraph};
    use ndarray::array;
    use std::collections::BTreeMap;

    #[test]
    fn test_stack_preserves_order() {
        let dataset = atom_dataset();
        let stacked = stack_features(&dataset, "atom").expect("stack atoms");

        assert_eq!(stacked.shape(), &[5, 3]);
        assert_eq!(stacked.column(0).to_vec(), vec![1.0, 1.0, 1.0, 5.0, 7.0]);
        assert_eq!(stacked.column(1).to_vec(), vec![2.0, 2.0, 2.0, 6.0, 6.0]);
    }

    #[test]
    fn test_row_count_matches_node_count() {
        let dataset = atom_dataset();
        for ntype in ["atom", "bond"] {
            let total: usize = dataset
                .iter()
                .map(|(g, _)| g.num_nodes(ntype).expect("node count"))
                .sum();
            let stacked = stack_features(&dataset, ntype).expect("stack");
            assert_eq!(stacked.nrows(), total);
        }
    }

    #[test]
    fn test_missing_node_type() {
        let dataset = atom_dataset();
        assert!(matches!(
            stack_features(&dataset, "ring"),
            Err(FeatError::MissingNodeTypeOrFeature(_))
        ));
    }

    #[test]
    fn test_width_mismatch() {
        let mut names = BTreeMap::new();
        names.insert("atom".to_string(), vec!["a".to_string(), "b".to_string()]);
        let mut dataset = GraphDataset::new(names);
        dataset.push(HeteroGraph::new().with_nodes("atom", array![[1.0]]), vec![]);

        assert!(matches!(
            stack_features(&dataset, "atom"),
            Err(FeatError::FeatureCountMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let mut names = BTreeMap::new();
        names.insert("atom".to_string(), vec!["a".to_string()]);
        let dataset = GraphDataset::new(names);

        assert!(matches!(
            stack_features(&dataset, "atom"),
            Err(FeatError::NoObservations(_))
        ));
    }
}
