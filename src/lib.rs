//! Feature diagnostics for graph datasets: per-feature stdev and mean, Pearson
//! correlation between features, and correlation heat maps.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args, clippy::module_name_repetitions)]

pub mod dataset;
pub mod error;
pub mod ml;
pub mod structs;

pub use dataset::{Dataset, Graph, GraphDataset, HeteroGraph};
pub use error::{FeatError, Result};
pub use ml::correlation::{pearson_matrix, PearsonCorrelation};
pub use ml::features::stack_features;
pub use ml::heatmap::{plot_heat_map, Colormap, DEFAULT_HEAT_MAP_FILE};
pub use ml::stats::StdevThreshold;
pub use structs::{CorrelationMatrix, FeatureReport, FeatureStat, RedundantPair};
