#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args)]

use clap::{Parser, Subcommand};
use featstat::ml::pipeline::{run_pipeline, AnalysisConfig};
use featstat::{
    Colormap, Dataset, FeatError, GraphDataset, Result, StdevThreshold, DEFAULT_HEAT_MAP_FILE,
};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// featstat - feature statistics and correlation for graph datasets
#[derive(Parser, Debug)]
#[command(name = "featstat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print per-feature stdev and mean of a node type
    Stdev {
        /// Dataset JSON file
        #[arg(short, long)]
        dataset: PathBuf,

        /// Node type whose features are analyzed (e.g. atom, bond)
        #[arg(short, long)]
        ntype: String,

        /// Features with stdev at or below this value are flagged
        #[arg(short, long, default_value = "0.0")]
        threshold: f64,
    },

    /// Run stdev report, correlation and heat map, writing report files
    Analyze {
        /// Dataset JSON file
        #[arg(short, long)]
        dataset: PathBuf,

        /// Node type whose features are analyzed (e.g. atom, bond)
        #[arg(short, long)]
        ntype: String,

        /// Features with stdev at or below this value are flagged
        #[arg(short, long, default_value = "0.0")]
        threshold: f64,

        /// Keep flagged low-variance features in the correlation
        #[arg(long)]
        keep_low_variance: bool,

        /// Additional feature index to exclude (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<usize>,

        /// Output directory for report files
        #[arg(short, long, default_value = "./feature_report")]
        output_dir: PathBuf,

        /// Heat map file name inside the output directory
        #[arg(long, default_value = DEFAULT_HEAT_MAP_FILE)]
        heat_map: String,

        /// Heat map color scale
        #[arg(long, value_enum, default_value_t = Colormap::Viridis)]
        colormap: Colormap,

        /// Report feature pairs with |r| at or above this value
        #[arg(long, default_value = "0.95")]
        redundancy: f64,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Install a stderr subscriber so the stdout report stays clean
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging already initialized");
    }
}

fn run(command: Option<Commands>) -> Result<()> {
    match command {
        Some(Commands::Stdev {
            dataset,
            ntype,
            threshold,
        }) => run_stdev(&dataset, &ntype, threshold),

        Some(Commands::Analyze {
            dataset,
            ntype,
            threshold,
            keep_low_variance,
            exclude,
            output_dir,
            heat_map,
            colormap,
            redundancy,
        }) => run_analyze(
            &dataset,
            &AnalysisConfig {
                ntype,
                threshold,
                keep_low_variance,
                exclude,
                redundancy,
                output_dir: Some(output_dir),
                heat_map_file: heat_map,
                colormap,
            },
        ),

        None => {
            eprintln!("No subcommand provided. Use 'featstat stdev' or 'featstat analyze'.");
            eprintln!("Run 'featstat --help' for usage information.");
            std::process::exit(1);
        }
    }
}

fn load_dataset(path: &Path) -> Result<GraphDataset> {
    if !path.exists() {
        return Err(FeatError::Dataset(format!(
            "dataset file not found: {}",
            path.display()
        )));
    }

    let dataset = GraphDataset::from_json_file(path)?;
    eprintln!(
        "Loaded {} samples, node types: {}",
        dataset.len(),
        dataset.node_types().join(", ")
    );
    Ok(dataset)
}

/// Print the stdev report of one node type
fn run_stdev(dataset_path: &Path, ntype: &str, threshold: f64) -> Result<()> {
    let dataset = load_dataset(dataset_path)?;
    let mut analyzer = StdevThreshold::with_threshold(&dataset, threshold)?;
    let low_variance = analyzer.compute(ntype)?;

    eprintln!("Low-variance feature indices: {low_variance:?}");
    Ok(())
}

/// Run the full analysis pipeline
fn run_analyze(dataset_path: &Path, config: &AnalysisConfig) -> Result<()> {
    let dataset = load_dataset(dataset_path)?;

    let stdout = std::io::stdout();
    let result = run_pipeline(&dataset, config, &mut stdout.lock())?;

    eprintln!("Excluded feature indices: {:?}", result.excluded);
    if result.correlation.nan_count() > 0 {
        eprintln!("Warning: correlation has undefined entries, some features have zero variance");
    }

    if result.redundant.is_empty() {
        eprintln!("No feature pairs with |r| >= {}", config.redundancy);
    } else {
        eprintln!("Feature pairs with |r| >= {}:", config.redundancy);
        for pair in &result.redundant {
            eprintln!("  {} ~ {}: {:.4}", pair.first, pair.second, pair.r);
        }
    }

    eprintln!("Output written:");
    for path in &result.outputs {
        eprintln!("  - {}", path.display());
    }

    Ok(())
}
