//! tilesplit - Split images into tiles.
//!
//! This binary parses the command line and runs the splitter.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilesplit::{
    config::{Cli, Command, PlanConfig, SplitConfig},
    ImageRasterEngine, Splitter, TileOutput,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Split(config) => run_split(config).await,
        Command::Plan(config) => run_plan(config).await,
    }
}

// =============================================================================
// Split Command
// =============================================================================

async fn run_split(config: SplitConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let tiles = config.to_tiling_request();
    let output = config.to_output_request();
    let engine = ImageRasterEngine::new().with_jpeg_quality(config.jpeg_quality);
    let splitter = Splitter::with_engine(engine);

    info!(
        "Splitting {} ({} mode)",
        config.image.display(),
        tiles.mode
    );

    let outputs = match splitter.split(config.image.as_path(), &tiles, &output).await {
        Ok(outputs) => outputs,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for (index, tile) in outputs.iter().enumerate() {
        match tile {
            TileOutput::File(path) => println!("{}", path.display()),
            TileOutput::Buffer(bytes) => println!("tile {}: {} bytes", index, bytes.len()),
        }
    }

    info!("Done: {} tile(s)", outputs.len());
    ExitCode::SUCCESS
}

// =============================================================================
// Plan Command
// =============================================================================

async fn run_plan(config: PlanConfig) -> ExitCode {
    init_logging(config.verbose);

    let tiles = config.tiling.to_tiling_request();
    let (size, rects) = match Splitter::new().plan(config.image.as_path(), &tiles).await {
        Ok(plan) => plan,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let json = serde_json::json!({
        "image": config.image,
        "size": size,
        "mode": tiles.mode,
        "tiles": rects,
    });
    match serde_json::to_string_pretty(&json) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize plan: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Log to stderr so stdout only carries results.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tilesplit=debug"
    } else {
        "tilesplit=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
