use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatError {
    #[error("No feature meets the stdev threshold {threshold:.5}")]
    AllFeaturesBelowThreshold { threshold: f64 },

    #[error("Missing node type or feature: {0}")]
    MissingNodeTypeOrFeature(String),

    #[error("Node type `{ntype}` has {expected} feature names but {found} feature columns")]
    FeatureCountMismatch {
        ntype: String,
        expected: usize,
        found: usize,
    },

    #[error("No `{0}` nodes found in the dataset")]
    NoObservations(String),

    #[error("No `{ntype}` features left to correlate after excluding {excluded:?}")]
    NoFeaturesLeft { ntype: String, excluded: Vec<usize> },

    #[error("Feature index {index} out of range for {n_features} features")]
    InvalidFeatureIndex { index: usize, n_features: usize },

    #[error("Threshold must be a finite non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("Got {labels} labels for a {dim}x{dim} matrix")]
    LabelCountMismatch { labels: usize, dim: usize },

    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FeatError>;
