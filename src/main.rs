// SPDX-License-Identifier: GPL-3.0-only

use barcode_scanner::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "barcode-scanner")]
#[command(about = "Scan EAN-8 and EAN-13 barcodes from a camera")]
#[command(version = barcode_scanner::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/barcode-scanner/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan barcodes continuously (default)
    Scan {
        /// Camera index to use (from 'barcode-scanner list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Scan an image file instead of a camera
        #[arg(short, long, conflicts_with = "camera")]
        image: Option<PathBuf>,

        /// Exit after the first decoded barcode
        #[arg(long)]
        once: bool,
    },

    /// List available cameras
    List,

    /// Decode barcodes in image files
    Decode {
        /// Image files to decode
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=barcode_scanner=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Some(Commands::Scan {
            camera,
            image,
            once,
        }) => cli::scan(config, cli::ScanOptions { camera, image, once }),
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Decode { files }) => cli::decode_files(&config, &files),
        None => cli::scan(config, cli::ScanOptions::default()),
    }
}
