// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{depth, display, sensor};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current configuration file version
pub const CONFIG_VERSION: u32 = 1;

/// Directory name under the platform config directory
const CONFIG_DIR_NAME: &str = "package-dimensions";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Region of interest size in pixels, centered on the depth grid
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiSize {
    pub width: u32,
    pub height: u32,
}

impl Default for RoiSize {
    fn default() -> Self {
        Self {
            width: sensor::GRID_WIDTH,
            height: sensor::GRID_HEIGHT,
        }
    }
}

/// Thresholds used by the measurement pipeline
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Nearest accepted depth (mm)
    pub min_depth_mm: u16,
    /// Farthest accepted depth (mm)
    pub max_depth_mm: u16,
    /// Differences at or below this are zeroed (mm)
    pub noise_floor_mm: u16,
    /// Present pixels a row/column needs (strictly more) to become an edge
    pub edge_density: u32,
    /// Difference histogram entries need strictly more hits than this to count as object height
    pub height_outlier_count: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_depth_mm: depth::DEPTH_MIN_MM,
            max_depth_mm: depth::DEPTH_MAX_MM,
            noise_floor_mm: depth::NOISE_FLOOR_MM,
            edge_density: depth::EDGE_DENSITY_THRESHOLD,
            height_outlier_count: depth::HEIGHT_OUTLIER_COUNT,
        }
    }
}

/// Sensor optics used to convert pixel extents to physical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Optics {
    /// Horizontal field of view (degrees)
    pub horizontal_fov_deg: f64,
    /// Vertical field of view (degrees)
    pub vertical_fov_deg: f64,
}

impl Default for Optics {
    fn default() -> Self {
        Self {
            horizontal_fov_deg: sensor::HORIZONTAL_FOV_DEG,
            vertical_fov_deg: sensor::VERTICAL_FOV_DEG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration format version
    pub version: u32,
    /// Region of interest applied to every frame
    pub roi: RoiSize,
    /// Filtering and scan thresholds
    pub thresholds: Thresholds,
    /// Field of view
    pub optics: Optics,
    /// Millimeter range mapped onto the 8-bit display scale
    pub display_max_depth_mm: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            roi: RoiSize::default(),
            thresholds: Thresholds::default(),
            optics: Optics::default(),
            display_max_depth_mm: display::DISPLAY_MAX_DEPTH_MM,
        }
    }
}

impl Config {
    /// Default config file location (`<config dir>/package-dimensions/config.json`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Load configuration from `path`, falling back to defaults if the file does not exist
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;

        info!(path = %path.display(), version = config.version, "Loaded configuration");
        Ok(config)
    }

    /// Write configuration to `path` as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Check that the configured values can drive the pipeline
    pub fn validate(&self) -> AppResult<()> {
        let t = &self.thresholds;
        if t.min_depth_mm > t.max_depth_mm {
            return Err(AppError::Config(format!(
                "min_depth_mm ({}) exceeds max_depth_mm ({})",
                t.min_depth_mm, t.max_depth_mm
            )));
        }
        for (name, fov) in [
            ("horizontal_fov_deg", self.optics.horizontal_fov_deg),
            ("vertical_fov_deg", self.optics.vertical_fov_deg),
        ] {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(AppError::Config(format!(
                    "{} must be within (0, 180), got {}",
                    name, fov
                )));
            }
        }
        if self.display_max_depth_mm == 0 {
            return Err(AppError::Config("display_max_depth_mm must be non-zero".into()));
        }
        Ok(())
    }
}
