// SPDX-License-Identifier: GPL-3.0-only

//! Depth-difference object measurement
//!
//! Compares each depth frame against an empty-scene baseline to find an
//! object's bounding box and convert it to physical dimensions.
//!
//! - [`roi`]: region-of-interest and valid-range filtering
//! - [`baseline`]: calibration baseline store and one-shot trigger
//! - [`difference`]: baseline-minus-current excess depth
//! - [`bounding_box`]: density-thresholded edge scanning
//! - [`histogram`]: depth histograms over the box
//! - [`dimensions`]: field-of-view projection to centimeters
//! - [`engine`]: the per-frame pipeline tying these together

pub mod baseline;
pub mod bounding_box;
pub mod difference;
pub mod dimensions;
pub mod engine;
pub mod grid;
pub mod histogram;
pub mod roi;
pub mod visualization;

pub use baseline::{BaselineStore, CalibrationState, CalibrationTrigger};
pub use bounding_box::{BoundingBox, EdgeScan, EdgeScans};
pub use dimensions::Measurement;
pub use engine::{DimensionEngine, FrameOutcome, FrameOutput};
pub use grid::{DepthGrid, DifferenceGrid};
pub use histogram::{BoxHistograms, DepthHistogram};
pub use roi::RegionOfInterest;
