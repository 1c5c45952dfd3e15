// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use package_dimensions::constants::{app_info, sensor};
use package_dimensions::synthetic::SyntheticBox;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "package-dimensions")]
#[command(about = "Measure objects with a depth camera against an empty-scene baseline")]
#[command(version = app_info::version())]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Width of .raw depth frames
    #[arg(long, global = true, default_value_t = sensor::GRID_WIDTH)]
    frame_width: u32,

    /// Height of .raw depth frames
    #[arg(long, global = true, default_value_t = sensor::GRID_HEIGHT)]
    frame_height: u32,

    /// Region of interest width in pixels (overrides config)
    #[arg(long, global = true, requires = "roi_height")]
    roi_width: Option<u32>,

    /// Region of interest height in pixels (overrides config)
    #[arg(long, global = true, requires = "roi_width")]
    roi_height: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure an object from an empty-scene baseline and a frame
    Measure {
        /// Empty-scene depth frame (.raw or 16-bit .png)
        #[arg(short, long)]
        baseline: PathBuf,

        /// Depth frame containing the object
        #[arg(short, long)]
        frame: PathBuf,

        /// Print the measurement as JSON
        #[arg(long)]
        json: bool,

        /// Save a snapshot (displays, filtered depth, measurement) under this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a directory of recorded depth frames
    Replay {
        /// Directory of .raw / .png depth frames, processed in name order
        dir: PathBuf,

        /// Frame index used as calibration baseline
        #[arg(short, long, default_value = "0")]
        calibrate_at: usize,

        /// Playback rate (0 = as fast as possible)
        #[arg(long, default_value = "0")]
        fps: u32,

        /// Save a snapshot for every measured frame under this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a synthetic baseline and object frame
    Synth {
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Floor distance from the camera (mm)
        #[arg(long, default_value = "2000")]
        floor: u16,

        /// Box width (mm)
        #[arg(long, default_value = "400")]
        box_width: f64,

        /// Box length (mm)
        #[arg(long, default_value = "300")]
        box_length: f64,

        /// Box height (mm)
        #[arg(long, default_value = "250")]
        box_height: u16,

        /// File format: raw or png
        #[arg(long, default_value = "raw", value_parser = ["raw", "png"])]
        format: String,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=package_dimensions=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let options = cli::EngineOptions {
        config: cli.config.clone(),
        raw_size: (cli.frame_width, cli.frame_height),
        roi: cli.roi_width.zip(cli.roi_height),
    };

    match cli.command {
        Commands::Measure {
            baseline,
            frame,
            json,
            output,
        } => cli::measure(&options, &baseline, &frame, json, output),
        Commands::Replay {
            dir,
            calibrate_at,
            fps,
            output,
        } => cli::replay(&options, &dir, calibrate_at, fps, output),
        Commands::Synth {
            output,
            floor,
            box_width,
            box_length,
            box_height,
            format,
        } => cli::synth(
            &output,
            options.raw_size,
            floor,
            SyntheticBox {
                width_mm: box_width,
                length_mm: box_length,
                height_mm: box_height,
            },
            &format,
        ),
        Commands::Config { save } => cli::show_config(cli.config, save),
    }
}
