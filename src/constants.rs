// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Single source of truth for sensor geometry, depth filtering thresholds and
//! visualization scaling. [`crate::config::Config`] uses these as its defaults.

/// Depth sensor geometry (Kinect v2 depth stream)
pub mod sensor {
    /// Depth grid width in pixels
    pub const GRID_WIDTH: u32 = 512;
    /// Depth grid height in pixels
    pub const GRID_HEIGHT: u32 = 424;
    /// Bytes per depth sample (16-bit millimeters)
    pub const BYTES_PER_SAMPLE: u32 = 2;

    /// Horizontal field of view in degrees
    pub const HORIZONTAL_FOV_DEG: f64 = 70.6;
    /// Vertical field of view in degrees
    pub const VERTICAL_FOV_DEG: f64 = 60.0;
}

/// Depth filtering and measurement thresholds (millimeters unless noted)
pub mod depth {
    /// Invalid depth marker value
    pub const DEPTH_INVALID_MM: u16 = 0;

    /// Samples nearer than this are discarded
    pub const DEPTH_MIN_MM: u16 = 500;
    /// Samples farther than this are discarded
    pub const DEPTH_MAX_MM: u16 = 4000;

    /// Baseline-minus-current deltas at or below this are treated as sensor noise
    pub const NOISE_FLOOR_MM: u16 = 100;

    /// A row or column is an object edge once more than this many pixels are present
    pub const EDGE_DENSITY_THRESHOLD: u32 = 10;

    /// Difference values seen this many times or fewer are outliers for the height estimate
    pub const HEIGHT_OUTLIER_COUNT: u32 = 4;
}

/// Grayscale display mapping
pub mod display {
    /// Millimeter range mapped onto the 8-bit display scale
    pub const DISPLAY_MAX_DEPTH_MM: u16 = 8000;

    /// Gain applied to difference values so small excess depths stay visible
    pub const DIFFERENCE_GAIN: u32 = 10;

    /// Intensity used to draw bounding box edges
    pub const EDGE_INTENSITY: u8 = 255;
}

/// Millimeters per centimeter
pub const MM_PER_CM: f64 = 10.0;

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

/// Map depth range to byte range
///
/// Integer divisor that squeezes `max_depth_mm` millimeters into 256 gray levels.
pub fn depth_to_byte_divisor(max_depth_mm: u16) -> u16 {
    (max_depth_mm / 256).max(1)
}
