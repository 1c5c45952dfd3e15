// SPDX-License-Identifier: MPL-2.0

//! Package Dimensions - measure objects with a depth camera
//!
//! This library compares live depth frames against an empty-scene baseline
//! to locate an object and estimate its width, height and depth.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`measurement`]: filtering, differencing, bounding box and dimension pipeline
//! - [`replay`]: frame source abstraction and background processing loop
//! - [`export`]: depth frame files and measurement snapshots
//! - [`synthetic`]: deterministic synthetic scenes
//! - [`config`]: user configuration handling
//!
//! # Example
//!
//! ```
//! use package_dimensions::{Config, DimensionEngine};
//! use package_dimensions::synthetic::{SyntheticBox, SyntheticScene};
//!
//! let scene = SyntheticScene::new(512, 424, 2000).with_box(SyntheticBox {
//!     width_mm: 400.0,
//!     length_mm: 300.0,
//!     height_mm: 250,
//! });
//!
//! let engine = DimensionEngine::new(Config::default());
//! engine.request_calibration();
//! engine.process_frame(&scene.baseline(), 0, u16::MAX).unwrap();
//!
//! let output = engine.process_frame(&scene.frame(), 0, u16::MAX).unwrap();
//! let measurement = output.outcome.measurement().unwrap();
//! assert_eq!(measurement.depth_cm, 25);
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod export;
pub mod measurement;
pub mod replay;
pub mod synthetic;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, FrameError};
pub use measurement::{DepthGrid, DimensionEngine, FrameOutcome, FrameOutput, Measurement};
