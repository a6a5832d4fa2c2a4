use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cps_analyzer::{AnalysisConfig, CpsError, RenderMode};
use log::{info, warn};

/// Count positive and nuclear objects in an IHC image and report the Combined Positive Score
#[derive(Parser, Debug)]
#[command(name = "cps-analyzer")]
#[command(about = "Compute the Combined Positive Score of an IHC image", long_about = None)]
struct Args {
    /// Input image file path
    #[arg(short, long)]
    input: PathBuf,

    /// Where to save the rendered result image
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON analysis configuration; defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rendering mode, overriding the configuration
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Seed the value thresholds with Otsu's method before analysis
    #[arg(short, long)]
    auto_threshold: bool,

    /// Write the effective configuration to this path
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Overlay,
    BoundingBox,
}

impl From<ModeArg> for RenderMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Overlay => RenderMode::Overlay,
            ModeArg::BoundingBox => RenderMode::BoundingBox,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let _logger = flexi_logger::Logger::try_with_env_or_str(level)?.start()?;

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }

    let image = cps_analyzer::load_image(&args.input)?;
    info!(
        "analyzing {} ({}x{})",
        args.input.display(),
        image.width(),
        image.height()
    );

    if args.auto_threshold {
        match cps_analyzer::estimate_threshold(&image) {
            Ok(threshold) => config.apply_value_threshold(threshold),
            Err(e @ CpsError::CannotEstimate(_)) => {
                warn!("{e}; keeping the configured thresholds");
            }
            Err(e) => return Err(e.into()),
        }
    }

    config.validate()?;

    if let Some(path) = &args.write_config {
        config
            .to_json_file(path)
            .with_context(|| format!("writing configuration to {}", path.display()))?;
    }

    let result = cps_analyzer::run_analysis(&image, &config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary())?);
    } else {
        println!("PD-L1 positive cells: {}", result.dab_count());
        println!("Total tumor cells: {}", result.nucleus_count());
        println!("CPS: {:.2}", result.cps);
    }

    if let Some(path) = &args.output {
        // The in-memory result stays valid even if it cannot be written.
        cps_analyzer::save_image(&result.rendered, path)?;
    }

    Ok(())
}
