//! Chartify Phones - phone listing CSV cleaning & chart suite
//!
//! Renders the chart set for a listing CSV and opens the gallery viewer.

use anyhow::Result;
use chartify_phones::charts::{ChartSink, GallerySink};
use chartify_phones::data::CleaningMode;
use chartify_phones::gui;
use chartify_phones::{Pipeline, VizConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Murphy",
    version,
    about = "Clean a phone listing CSV and render its chart suite",
    long_about = "Cleans a phone listing CSV (Brand, Selling Price, Original Price, Rating)\n\
                  and renders thirteen charts as PNG files.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: Flipkart_Mobiles.csv, PNGs in the current directory, open viewer\n  \
                  chartify-phones\n\n  \
                  # Headless run into a folder\n  \
                  chartify-phones -i phones.csv -o charts/ --no-window\n\n  \
                  # Settings from a JSON file, strict cleaning\n  \
                  chartify-phones --config viz.json --strict"
)]
struct Args {
    /// JSON config file; flags given here override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the listing CSV
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for the PNG files and run summary
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Do not write any files
    #[arg(long)]
    no_persist: bool,

    /// Do not open the chart viewer
    #[arg(long)]
    no_window: bool,

    /// Drop rows whose numeric cells failed to parse
    #[arg(long)]
    strict: bool,

    /// Output resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// File config (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<VizConfig> {
        let mut config = match &self.config {
            Some(path) => VizConfig::from_file(path)?,
            None => VizConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_persist {
            config.persist_output = false;
        }
        if self.no_window {
            config.show_window = false;
        }
        if self.strict {
            config.cleaning = CleaningMode::Strict;
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = args.resolve_config()?;
    info!(
        input = %config.input.display(),
        output_dir = %config.output_dir.display(),
        persist = config.persist_output,
        cleaning = ?config.cleaning,
        "starting run"
    );

    let pipeline = Pipeline::new(config.clone());
    let mut gallery = GallerySink::new();
    let summary = if config.show_window {
        let mut sinks: [&mut dyn ChartSink; 1] = [&mut gallery];
        pipeline.run(&mut sinks)?
    } else {
        pipeline.run(&mut [])?
    };

    if config.show_window {
        gui::run_viewer(config, gallery.into_charts(), summary)?;
    }

    Ok(())
}
