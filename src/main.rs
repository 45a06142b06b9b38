//! pca-compress - lossy image compression by principal component analysis
//! of pixel colors.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pca_compress::{
    CompressionConfig, Compressor, report::{JsonReport, visualization::Visualizer},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pca-compress")]
#[command(author, version)]
#[command(about = "Compress an image by keeping its leading color principal components")]
struct Cli {
    /// JSON configuration file; fields not given fall back to defaults
    config: Option<PathBuf>,

    /// Input image
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Number of principal components to retain (1-3)
    #[arg(short = 'n', long)]
    components: Option<usize>,

    /// Where to write the compressed image
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write the side-by-side comparison figure
    #[arg(short, long)]
    figure: Option<PathBuf>,

    /// Write a JSON report of the run
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<CompressionConfig> {
        let mut config = match &self.config {
            Some(path) => CompressionConfig::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => CompressionConfig::default(),
        };

        if let Some(image) = self.image {
            config.image_path = image;
        }
        if let Some(n) = self.components {
            config.n_components = n;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(figure) = self.figure {
            config.figure_path = figure;
        }
        if self.report.is_some() {
            config.report_path = self.report;
        }

        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.into_config()?;
    let compressor = Compressor::from_config(config.clone())
        .with_context(|| format!("failed to load {}", config.image_path.display()))?;

    let result = compressor.compress()?;

    Visualizer::new()
        .save_comparison(&result, &config.figure_path)
        .context("failed to write comparison figure")?;
    result
        .save(&config.output_path)
        .context("failed to write compressed image")?;

    let metrics = result.metrics()?;
    println!("{}", metrics);

    if let Some(path) = &config.report_path {
        JsonReport::new(&result, &metrics)
            .with_image_path(&config.image_path)
            .save(path)
            .context("failed to write report")?;
    }

    Ok(())
}
