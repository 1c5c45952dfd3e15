// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame measurement pipeline
//!
//! Filter → (calibrate | difference → bounding box → histograms → dimensions).
//! Frames are processed one at a time; calibration requests and region
//! changes may arrive from other threads and take effect on the next frame.

use super::baseline::{BaselineStore, CalibrationState, CalibrationTrigger};
use super::bounding_box::{self, BoundingBox};
use super::difference::difference;
use super::dimensions::{Measurement, measure};
use super::grid::DepthGrid;
use super::histogram::BoxHistograms;
use super::roi::{RegionOfInterest, filter_depth};
use super::visualization::{depth_to_gray, difference_to_gray, draw_bounding_box};
use crate::config::{Config, RoiSize};
use crate::errors::FrameError;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, trace};

/// What happened to a processed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was stored as the new baseline
    Calibrated,
    /// The object was measured
    Measured(Measurement),
    /// No measurement for this frame (no baseline, or no object found)
    Skipped(FrameError),
}

impl FrameOutcome {
    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            FrameOutcome::Measured(m) => Some(m),
            _ => None,
        }
    }
}

/// Everything produced for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Range- and region-filtered depth
    pub filtered: DepthGrid,
    /// Grayscale rendering of `filtered`
    pub filtered_display: Vec<u8>,
    /// Grayscale excess depth with the bounding box drawn, when a baseline exists
    pub difference_display: Option<Vec<u8>>,
    /// Located bounding box, if all four edges were found
    pub bounding_box: Option<BoundingBox>,
    pub outcome: FrameOutcome,
}

#[derive(Debug, Default)]
struct PipelineState {
    /// Grid size fixed by the first accepted frame
    grid_size: Option<(u32, u32)>,
    last_measurement: Option<Measurement>,
    baseline_display: Option<Vec<u8>>,
}

/// Depth-difference dimension estimator
pub struct DimensionEngine {
    config: Config,
    roi: Mutex<RoiSize>,
    calibration: CalibrationTrigger,
    baseline: Arc<BaselineStore>,
    state: Mutex<PipelineState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DimensionEngine {
    pub fn new(config: Config) -> Self {
        Self::with_baseline_store(config, Arc::new(BaselineStore::new()))
    }

    /// Create an engine that reads and writes the given baseline store
    pub fn with_baseline_store(config: Config, baseline: Arc<BaselineStore>) -> Self {
        Self {
            roi: Mutex::new(config.roi),
            config,
            calibration: CalibrationTrigger::new(),
            baseline,
            state: Mutex::new(PipelineState::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Change the region of interest used from the next frame on
    pub fn set_region_of_interest(&self, width: u32, height: u32) {
        *lock(&self.roi) = RoiSize { width, height };
        debug!(width, height, "Region of interest updated");
    }

    pub fn region_of_interest(&self) -> RoiSize {
        *lock(&self.roi)
    }

    /// Store the next processed frame as the baseline instead of measuring it
    pub fn request_calibration(&self) {
        self.calibration.arm();
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    pub fn baseline_store(&self) -> &Arc<BaselineStore> {
        &self.baseline
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_calibrated()
    }

    /// Most recent successful measurement, kept across frames that could not be measured
    pub fn last_measurement(&self) -> Option<Measurement> {
        lock(&self.state).last_measurement
    }

    /// Grayscale rendering of the frame last captured as baseline
    pub fn baseline_display(&self) -> Option<Vec<u8>> {
        lock(&self.state).baseline_display.clone()
    }

    /// Run one frame through the pipeline
    ///
    /// `min_reliable`/`max_reliable` only affect the filtered display. A grid whose
    /// size differs from the session's first frame is rejected without touching
    /// any state.
    pub fn process_frame(
        &self,
        raw: &DepthGrid,
        min_reliable: u16,
        max_reliable: u16,
    ) -> Result<FrameOutput, FrameError> {
        let mut state = lock(&self.state);

        let (width, height) = *state.grid_size.get_or_insert((raw.width(), raw.height()));
        if (raw.width(), raw.height()) != (width, height) {
            return Err(FrameError::FrameSizeMismatch {
                expected: (width as usize) * (height as usize),
                actual: raw.len(),
                unit: "samples",
            });
        }

        let thresholds = &self.config.thresholds;
        let roi = RegionOfInterest::centered(self.region_of_interest(), width, height);
        let filtered = filter_depth(raw, &roi, thresholds.min_depth_mm, thresholds.max_depth_mm)
            .with_reliable_range(min_reliable, max_reliable);
        let filtered_display = depth_to_gray(&filtered, self.config.display_max_depth_mm);
        trace!(?roi, valid = filtered.valid_count(), "Frame filtered");

        if self.calibration.take() {
            self.baseline.capture(filtered.clone());
            state.baseline_display = Some(filtered_display.clone());
            return Ok(FrameOutput {
                filtered,
                filtered_display,
                difference_display: None,
                bounding_box: None,
                outcome: FrameOutcome::Calibrated,
            });
        }

        let Some(baseline) = self.baseline.current() else {
            trace!("No baseline, skipping measurement");
            return Ok(FrameOutput {
                filtered,
                filtered_display,
                difference_display: None,
                bounding_box: None,
                outcome: FrameOutcome::Skipped(FrameError::NoBaseline),
            });
        };

        let diff = difference(&baseline, &filtered, thresholds.noise_floor_mm)?;
        let mut difference_display = difference_to_gray(&diff, self.config.display_max_depth_mm);

        let Some(bbox) = bounding_box::locate(&diff, thresholds.edge_density) else {
            debug!("No object detected");
            return Ok(FrameOutput {
                filtered,
                filtered_display,
                difference_display: Some(difference_display),
                bounding_box: None,
                outcome: FrameOutcome::Skipped(FrameError::NoObjectDetected),
            });
        };
        draw_bounding_box(&mut difference_display, width, &bbox);

        let histograms = BoxHistograms::build(&diff, &filtered, &bbox);
        let object_height_mm = histograms
            .object_height_mm(thresholds.height_outlier_count)
            .or_else(|| state.last_measurement.map(|m| m.object_height_mm))
            .unwrap_or(0);
        let camera_distance_mm = histograms.camera_distance_mm();

        let measurement = measure(
            &bbox,
            width,
            height,
            camera_distance_mm,
            object_height_mm,
            &self.config.optics,
        );
        state.last_measurement = Some(measurement);

        info!(
            width_cm = measurement.width_cm,
            height_cm = measurement.height_cm,
            depth_cm = measurement.depth_cm,
            camera_distance_mm,
            top = bbox.top,
            bottom = bbox.bottom,
            left = bbox.left,
            right = bbox.right,
            "Object measured"
        );

        Ok(FrameOutput {
            filtered,
            filtered_display,
            difference_display: Some(difference_display),
            bounding_box: Some(bbox),
            outcome: FrameOutcome::Measured(measurement),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Block = (u32, u32, u32, u32, u16);

    fn scene(width: u32, height: u32, floor: u16, object: Option<Block>) -> DepthGrid {
        let mut grid = DepthGrid::filled(width, height, floor);
        if let Some((x, y, w, h, depth)) = object {
            for row in y..y + h {
                for column in x..x + w {
                    grid.set(column, row, depth);
                }
            }
        }
        grid
    }

    /// 30x20 block at (10, 10) where every pixel sits at a different depth
    fn ragged_block(floor: u16) -> DepthGrid {
        let mut grid = DepthGrid::filled(64, 48, floor);
        let mut depth = 2500;
        for row in 10..30 {
            for column in 10..40 {
                grid.set(column, row, depth);
                depth -= 1;
            }
        }
        grid
    }

    fn calibrated(floor: u16) -> DimensionEngine {
        let engine = DimensionEngine::new(Config::default());
        engine.request_calibration();
        let output = engine
            .process_frame(&scene(64, 48, floor, None), 0, 8000)
            .unwrap();
        assert_eq!(output.outcome, FrameOutcome::Calibrated);
        engine
    }

    #[test]
    fn test_without_calibration_only_filtered_output() {
        let engine = DimensionEngine::new(Config::default());
        let frame = scene(64, 48, 2000, Some((10, 10, 20, 20, 1500)));
        let output = engine.process_frame(&frame, 500, 4500).unwrap();

        assert_eq!(output.outcome, FrameOutcome::Skipped(FrameError::NoBaseline));
        assert!(output.difference_display.is_none());
        assert_eq!(output.filtered_display.len(), 64 * 48);
        assert!(engine.last_measurement().is_none());
    }

    #[test]
    fn test_calibration_consumed_once() {
        let engine = DimensionEngine::new(Config::default());
        let empty = scene(64, 48, 2000, None);

        engine.request_calibration();
        assert_eq!(engine.calibration_state(), CalibrationState::Armed);
        let output = engine.process_frame(&empty, 500, 4500).unwrap();
        assert_eq!(output.outcome, FrameOutcome::Calibrated);
        assert!(engine.is_calibrated());
        assert!(engine.baseline_display().is_some());
        assert_eq!(engine.calibration_state(), CalibrationState::Idle);

        let output = engine.process_frame(&empty, 500, 4500).unwrap();
        assert_eq!(
            output.outcome,
            FrameOutcome::Skipped(FrameError::NoObjectDetected)
        );
        assert!(output.difference_display.unwrap().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_size_change_rejected() {
        let engine = DimensionEngine::new(Config::default());
        engine
            .process_frame(&scene(64, 48, 2000, None), 0, 8000)
            .unwrap();

        engine.request_calibration();
        let err = engine
            .process_frame(&scene(32, 48, 2000, None), 0, 8000)
            .unwrap_err();
        assert!(matches!(err, FrameError::FrameSizeMismatch { .. }));
        // the rejected frame did not consume the calibration request
        assert_eq!(engine.calibration_state(), CalibrationState::Armed);
        assert!(!engine.is_calibrated());
    }

    #[test]
    fn test_size_change_keeps_measurement_and_baseline() {
        let engine = calibrated(3000);
        let baseline = engine.baseline_store().current().expect("baseline");
        let measured = engine
            .process_frame(&scene(64, 48, 3000, Some((10, 10, 30, 20, 2500))), 0, 8000)
            .unwrap();
        let measured = *measured.outcome.measurement().expect("object measured");

        let err = engine
            .process_frame(&scene(64, 40, 3000, Some((10, 10, 30, 20, 2000))), 0, 8000)
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::FrameSizeMismatch {
                expected: 64 * 48,
                actual: 64 * 40,
                unit: "samples"
            }
        );

        assert_eq!(engine.last_measurement(), Some(measured));
        let current = engine.baseline_store().current().expect("baseline");
        assert!(Arc::ptr_eq(&baseline, &current));
    }

    #[test]
    fn test_measurement_retained_when_object_leaves() {
        let engine = calibrated(2000);

        let with_object = scene(64, 48, 2000, Some((10, 10, 30, 20, 1700)));
        let output = engine.process_frame(&with_object, 0, 8000).unwrap();
        let measured = *output.outcome.measurement().expect("object measured");
        assert_eq!(measured.depth_cm, 30);
        assert_eq!(measured.camera_distance_mm, 1700);

        let output = engine
            .process_frame(&scene(64, 48, 2000, None), 0, 8000)
            .unwrap();
        assert!(output.outcome.measurement().is_none());
        assert_eq!(engine.last_measurement(), Some(measured));
    }

    #[test]
    fn test_height_kept_when_no_excess_value_repeats() {
        let engine = calibrated(3000);
        let output = engine
            .process_frame(&scene(64, 48, 3000, Some((10, 10, 30, 20, 2500))), 0, 8000)
            .unwrap();
        let first = *output.outcome.measurement().expect("block measured");
        assert_eq!(first.object_height_mm, 500);
        assert_eq!(first.depth_cm, 50);

        // 600 distinct excess values from 500 to 1099 mm, none seen more than once
        let output = engine.process_frame(&ragged_block(3000), 0, 8000).unwrap();
        let second = *output.outcome.measurement().expect("block measured");
        let expected = BoundingBox {
            top: 10,
            bottom: 29,
            left: 10,
            right: 39,
        };
        assert_eq!(output.bounding_box, Some(expected));
        assert_eq!(second.object_height_mm, 500);
        assert_eq!(second.depth_cm, 50);
        assert_eq!(engine.last_measurement(), Some(second));
    }

    #[test]
    fn test_height_zero_without_previous_measurement() {
        let engine = calibrated(3000);
        let output = engine.process_frame(&ragged_block(3000), 0, 8000).unwrap();
        let m = *output.outcome.measurement().expect("block measured");
        assert_eq!(m.object_height_mm, 0);
        assert_eq!(m.depth_cm, 0);
        assert!(m.width_cm > 0);
    }

    #[test]
    fn test_region_change_applies_to_next_frame() {
        let engine = DimensionEngine::new(Config::default());
        engine.set_region_of_interest(10, 10);
        let output = engine
            .process_frame(&scene(64, 48, 2000, None), 0, 8000)
            .unwrap();
        // x in [27, 37], y in [19, 29]
        assert_eq!(output.filtered.valid_count(), 11 * 11);
        assert_eq!(
            engine.region_of_interest(),
            RoiSize {
                width: 10,
                height: 10
            }
        );
    }
}
