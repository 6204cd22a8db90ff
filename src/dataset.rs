//! Graph dataset abstraction and an in-memory implementation loaded from JSON

use crate::error::{FeatError, Result};
use ndarray::{Array2, ArrayView2};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A heterogeneous graph exposing one feature block per node type
pub trait Graph {
    /// Feature block for `ntype`, one row per node of that type
    ///
    /// # Errors
    /// Returns `MissingNodeTypeOrFeature` if the graph has no such node type
    fn node_features(&self, ntype: &str) -> Result<ArrayView2<'_, f64>>;

    /// Number of nodes of type `ntype`
    ///
    /// # Errors
    /// Returns `MissingNodeTypeOrFeature` if the graph has no such node type
    fn num_nodes(&self, ntype: &str) -> Result<usize> {
        Ok(self.node_features(ntype)?.nrows())
    }
}

/// An ordered collection of `(graph, label)` samples with a feature schema per node type
pub trait Dataset {
    type Graph: Graph;
    type Label;

    /// Samples in dataset order
    fn iter(&self) -> impl Iterator<Item = (&Self::Graph, &Self::Label)> + '_;

    /// Ordered feature names for `ntype`
    ///
    /// # Errors
    /// Returns `MissingNodeTypeOrFeature` if the node type has no schema
    fn feature_names(&self, ntype: &str) -> Result<&[String]>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Graph holding a dense feature matrix per node type
#[derive(Debug, Clone, Default)]
pub struct HeteroGraph {
    nodes: BTreeMap<String, Array2<f64>>,
}

impl HeteroGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a node type's features
    #[must_use]
    pub fn with_nodes(mut self, ntype: &str, features: Array2<f64>) -> Self {
        self.insert(ntype, features);
        self
    }

    pub fn insert(&mut self, ntype: &str, features: Array2<f64>) {
        self.nodes.insert(ntype.to_string(), features);
    }

    #[must_use]
    pub fn node_types(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }
}

impl Graph for HeteroGraph {
    fn node_features(&self, ntype: &str) -> Result<ArrayView2<'_, f64>> {
        self.nodes
            .get(ntype)
            .map(Array2::view)
            .ok_or_else(|| {
                FeatError::MissingNodeTypeOrFeature(format!("graph has no `{ntype}` nodes"))
            })
    }
}

/// In-memory dataset of heterogeneous graphs with vector labels
#[derive(Debug, Clone, Default)]
pub struct GraphDataset {
    feature_name: BTreeMap<String, Vec<String>>,
    samples: Vec<(HeteroGraph, Vec<f64>)>,
}

impl GraphDataset {
    #[must_use]
    pub fn new(feature_name: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            feature_name,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, graph: HeteroGraph, label: Vec<f64>) {
        self.samples.push((graph, label));
    }

    /// Node types that have a feature schema
    #[must_use]
    pub fn node_types(&self) -> Vec<&str> {
        self.feature_name.keys().map(String::as_str).collect()
    }

    /// Load a dataset from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a valid dataset
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a dataset from a JSON string
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or a feature block is ragged
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDataset = serde_json::from_str(json)?;

        let mut dataset = Self::new(raw.feature_name);
        for (idx, sample) in raw.samples.into_iter().enumerate() {
            let mut graph = HeteroGraph::new();
            for (ntype, rows) in sample.graph {
                let width = dataset.feature_name.get(&ntype).map(Vec::len);
                let block = rows_to_array(&rows, width).map_err(|msg| {
                    FeatError::Dataset(format!("sample {idx}, node type `{ntype}`: {msg}"))
                })?;
                graph.insert(&ntype, block);
            }
            dataset.push(graph, sample.label);
        }

        Ok(dataset)
    }
}

impl Dataset for GraphDataset {
    type Graph = HeteroGraph;
    type Label = Vec<f64>;

    fn iter(&self) -> impl Iterator<Item = (&HeteroGraph, &Vec<f64>)> + '_ {
        self.samples.iter().map(|(g, label)| (g, label))
    }

    fn feature_names(&self, ntype: &str) -> Result<&[String]> {
        self.feature_name
            .get(ntype)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                FeatError::MissingNodeTypeOrFeature(format!(
                    "dataset has no feature names for `{ntype}`"
                ))
            })
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[derive(Deserialize)]
struct RawDataset {
    feature_name: BTreeMap<String, Vec<String>>,
    samples: Vec<RawSample>,
}

#[derive(Deserialize)]
struct RawSample {
    graph: BTreeMap<String, Vec<Vec<f64>>>,
    #[serde(default)]
    label: Vec<f64>,
}

/// Convert row vectors into a dense matrix, rejecting ragged rows
fn rows_to_array(
    rows: &[Vec<f64>],
    width: Option<usize>,
) -> std::result::Result<Array2<f64>, String> {
    let n_cols = rows.first().map_or(width.unwrap_or(0), Vec::len);

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(format!(
            "row {i} has {} values, expected {n_cols}",
            row.len()
        ));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), n_cols), flat).map_err(|e| e.to_string())
}

/// Shared fixtures for unit tests
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use ndarray::array;

    /// Two graphs of atoms; `is_metal` is constant across the dataset
    pub fn atom_dataset() -> GraphDataset {
        let mut names: BTreeMap<String, Vec<String>> = BTreeMap::new();
        names.insert(
            "atom".to_string(),
            vec!["charge".into(), "degree".into(), "is_metal".into()],
        );
        names.insert("bond".to_string(), vec!["length".into()]);

        let mut dataset = GraphDataset::new(names);
        dataset.push(
            HeteroGraph::new()
                .with_nodes("atom", array![[1.0, 2.0, 0.0], [1.0, 2.0, 0.0], [1.0, 2.0, 0.0]])
                .with_nodes("bond", array![[1.2], [1.5]]),
            vec![0.1],
        );
        dataset.push(
            HeteroGraph::new()
                .with_nodes("atom", array![[5.0, 6.0, 0.0], [7.0, 6.0, 0.0]])
                .with_nodes("bond", array![[1.1]]),
            vec![0.2],
        );
        dataset
    }
}
