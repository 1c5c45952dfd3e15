// SPDX-License-Identifier: GPL-3.0-only

//! Depth frame files and measurement snapshots
//!
//! Frames are read from and written to disk as either:
//! - `.raw`: little-endian 16-bit millimeters, dimensions supplied separately
//! - `.png`: 16-bit grayscale, dimensions taken from the image
//!
//! A snapshot is a timestamped directory holding the grayscale displays, the
//! filtered depth and the measurement for one processed frame.

use crate::constants::sensor::BYTES_PER_SAMPLE;
use crate::errors::{AppError, AppResult};
use crate::measurement::{BoundingBox, DepthGrid, FrameOutput, Measurement};
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load a depth frame from `path`
///
/// `.raw` files need `raw_size` (width, height); PNG files carry their own.
pub fn load_depth_frame(path: &Path, raw_size: (u32, u32)) -> AppResult<DepthGrid> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let grid = match ext.as_str() {
        "png" => {
            let img = image::open(path)?.into_luma16();
            let (width, height) = img.dimensions();
            DepthGrid::new(width, height, img.into_raw())?
        }
        "raw" | "bin" => {
            let data = std::fs::read(path)?;
            DepthGrid::from_bytes(&data, raw_size.0, raw_size.1, BYTES_PER_SAMPLE)?
        }
        other => {
            return Err(AppError::Storage(format!(
                "Unsupported depth frame format '{}': {}",
                other,
                path.display()
            )));
        }
    };

    debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "Loaded depth frame"
    );
    Ok(grid)
}

/// Save a depth frame, format chosen by extension (`.raw` or `.png`)
pub fn save_depth_frame(grid: &DepthGrid, path: &Path) -> AppResult<()> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => {
            let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(
                grid.width(),
                grid.height(),
                grid.samples().to_vec(),
            )
            .ok_or("Failed to create 16-bit depth image")?;
            img.save(path)?;
        }
        _ => std::fs::write(path, grid.to_le_bytes())?,
    }
    debug!(path = %path.display(), "Saved depth frame");
    Ok(())
}

/// Depth frame files in `dir`, sorted by name
pub fn list_depth_frames(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .map(|e| {
                    let e = e.to_string_lossy();
                    e.eq_ignore_ascii_case("raw")
                        || e.eq_ignore_ascii_case("bin")
                        || e.eq_ignore_ascii_case("png")
                })
                .unwrap_or(false)
        })
        .collect();
    frames.sort();
    Ok(frames)
}

fn save_gray(pixels: &[u8], width: u32, height: u32, path: &Path) -> AppResult<()> {
    let img = GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or("Failed to create grayscale image")?;
    img.save(path)?;
    Ok(())
}

#[derive(Serialize)]
struct SnapshotReport<'a> {
    timestamp: String,
    width: u32,
    height: u32,
    bounding_box: Option<&'a BoundingBox>,
    measurement: Option<&'a Measurement>,
}

/// Paths written by [`save_snapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub dir: PathBuf,
    pub filtered_display: PathBuf,
    pub difference_display: Option<PathBuf>,
    pub filtered_depth: PathBuf,
    pub report: PathBuf,
}

/// Write one processed frame into a new `snapshot_<timestamp>` directory under `output_dir`
pub fn save_snapshot(output: &FrameOutput, output_dir: &Path) -> AppResult<SnapshotPaths> {
    let now = chrono::Local::now();
    let dir = output_dir.join(format!("snapshot_{}", now.format("%Y%m%d_%H%M%S_%3f")));
    std::fs::create_dir_all(&dir)?;

    let (width, height) = (output.filtered.width(), output.filtered.height());

    let filtered_display = dir.join("filtered.png");
    save_gray(&output.filtered_display, width, height, &filtered_display)?;

    let difference_display = match &output.difference_display {
        Some(pixels) => {
            let path = dir.join("difference.png");
            save_gray(pixels, width, height, &path)?;
            Some(path)
        }
        None => None,
    };

    let filtered_depth = dir.join("filtered_depth.png");
    save_depth_frame(&output.filtered, &filtered_depth)?;

    let report = dir.join("measurement.json");
    let json = serde_json::to_string_pretty(&SnapshotReport {
        timestamp: now.to_rfc3339(),
        width,
        height,
        bounding_box: output.bounding_box.as_ref(),
        measurement: output.outcome.measurement(),
    })?;
    std::fs::write(&report, json)?;

    info!(dir = %dir.display(), "Snapshot saved");

    Ok(SnapshotPaths {
        dir,
        filtered_display,
        difference_display,
        filtered_depth,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "package-dimensions-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_raw_and_png_frames_load_back() {
        let dir = temp_dir("frames");
        let mut grid = DepthGrid::filled(8, 6, 2000);
        grid.set(3, 2, 1234);

        let raw = dir.join("frame_000.raw");
        let png = dir.join("frame_001.png");
        save_depth_frame(&grid, &raw).unwrap();
        save_depth_frame(&grid, &png).unwrap();

        assert_eq!(load_depth_frame(&raw, (8, 6)).unwrap(), grid);
        assert_eq!(load_depth_frame(&png, (0, 0)).unwrap(), grid);
        assert!(load_depth_frame(&raw, (8, 5)).is_err());
        assert_eq!(list_depth_frames(&dir).unwrap(), vec![raw, png]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_extension() {
        let err = load_depth_frame(Path::new("frame.txt"), (1, 1)).unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
