// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for depth measurement
//!
//! This module provides command-line functionality for:
//! - Measuring an object from a baseline and a frame file
//! - Replaying a directory of recorded frames
//! - Generating synthetic scenes
//! - Inspecting the configuration

use package_dimensions::config::Config;
use package_dimensions::export;
use package_dimensions::measurement::{DimensionEngine, FrameOutcome, FrameOutput};
use package_dimensions::replay::{ProcessingLoop, RecordedFrames};
use package_dimensions::synthetic::{SyntheticBox, SyntheticScene};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Options shared by commands that run the measurement engine
pub struct EngineOptions {
    pub config: Option<PathBuf>,
    pub raw_size: (u32, u32),
    pub roi: Option<(u32, u32)>,
}

impl EngineOptions {
    fn build_engine(&self) -> Result<DimensionEngine, Box<dyn std::error::Error>> {
        let path = self.config.clone().unwrap_or_else(Config::default_path);
        let config = Config::load(&path)?;
        let engine = DimensionEngine::new(config);
        if let Some((width, height)) = self.roi {
            engine.set_region_of_interest(width, height);
        }
        Ok(engine)
    }
}

fn print_outcome(index: Option<usize>, output: &FrameOutput) {
    let prefix = index.map(|i| format!("[{:04}] ", i)).unwrap_or_default();
    match &output.outcome {
        FrameOutcome::Calibrated => println!("{}Calibrated", prefix),
        FrameOutcome::Measured(m) => println!(
            "{}Width: {} cm  Height: {} cm  Depth: {} cm  (distance {} mm)",
            prefix, m.width_cm, m.height_cm, m.depth_cm, m.camera_distance_mm
        ),
        FrameOutcome::Skipped(reason) => println!("{}{}", prefix, reason),
    }
}

/// Calibrate on `baseline`, then measure `frame`
pub fn measure(
    options: &EngineOptions,
    baseline: &Path,
    frame: &Path,
    json: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = options.build_engine()?;

    let baseline_grid = export::load_depth_frame(baseline, options.raw_size)?;
    let frame_grid = export::load_depth_frame(frame, options.raw_size)?;

    engine.request_calibration();
    engine.process_frame(&baseline_grid, 0, u16::MAX)?;
    let result = engine.process_frame(&frame_grid, 0, u16::MAX)?;

    if json {
        let measurement = result.outcome.measurement();
        println!("{}", serde_json::to_string_pretty(&measurement)?);
    } else {
        print_outcome(None, &result);
    }

    if let Some(dir) = output {
        let paths = export::save_snapshot(&result, &dir)?;
        println!("Snapshot saved: {}", paths.dir.display());
    }

    Ok(())
}

/// Replay recorded frames through the engine on a background loop
pub fn replay(
    options: &EngineOptions,
    dir: &Path,
    calibrate_at: usize,
    fps: u32,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(options.build_engine()?);
    let source = RecordedFrames::open(dir, options.raw_size)?.with_frame_rate(fps);

    if calibrate_at == 0 {
        engine.request_calibration();
    }

    let callback_engine = Arc::clone(&engine);
    let mut processing = ProcessingLoop::start(
        "replay",
        Arc::clone(&engine),
        source,
        move |index, result| {
            print_outcome(Some(index), result);
            if let Some(dir) = &output
                && result.outcome.measurement().is_some()
                && let Err(e) = export::save_snapshot(result, dir)
            {
                eprintln!("Failed to save snapshot: {}", e);
            }
            if index + 1 == calibrate_at {
                callback_engine.request_calibration();
            }
        },
    );

    // Set up Ctrl+C handler
    let stop_flag = processing.stop_signal();
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::SeqCst);
    })?;

    while processing.is_running() {
        std::thread::sleep(Duration::from_millis(50));
    }
    processing.join();

    match engine.last_measurement() {
        Some(m) => println!(
            "Last measurement: {} x {} x {} cm",
            m.width_cm, m.height_cm, m.depth_cm
        ),
        None => println!("No object measured."),
    }

    if processing.stop_signal().load(Ordering::SeqCst) {
        println!("Stopped early.");
    }
    Ok(())
}

/// Write a synthetic baseline and object frame into `output`
pub fn synth(
    output: &Path,
    size: (u32, u32),
    floor_mm: u16,
    object: SyntheticBox,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output)?;

    let scene = SyntheticScene::new(size.0, size.1, floor_mm).with_box(object);
    let baseline_path = output.join(format!("baseline.{}", format));
    let frame_path = output.join(format!("frame.{}", format));

    export::save_depth_frame(&scene.baseline(), &baseline_path)?;
    export::save_depth_frame(&scene.frame(), &frame_path)?;

    println!("Baseline: {}", baseline_path.display());
    println!("Frame:    {}", frame_path.display());
    if let Some((columns, rows)) = scene.footprint() {
        println!("Box footprint: {}x{} px", columns, rows);
    }
    Ok(())
}

/// Print the effective configuration, optionally writing it out
pub fn show_config(path: Option<PathBuf>, save: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.unwrap_or_else(Config::default_path);
    let config = Config::load(&path)?;

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        config.save(&path)?;
        println!("Configuration saved: {}", path.display());
    }
    Ok(())
}
