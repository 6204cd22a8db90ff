pub mod correlation;
pub mod features;
pub mod heatmap;
pub mod output;
pub mod pipeline;
pub mod stats;
