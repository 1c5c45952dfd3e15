// SPDX-License-Identifier: GPL-3.0-only

//! Calibration baseline storage and the one-shot calibration trigger

use super::grid::DepthGrid;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Holds the most recent empty-scene depth grid
///
/// Readers get an `Arc` to a fully built grid; a capture swaps the reference
/// under the write lock, so a reader never sees a partially written baseline.
#[derive(Debug, Default)]
pub struct BaselineStore {
    baseline: RwLock<Option<Arc<DepthGrid>>>,
}

impl BaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored baseline unconditionally
    pub fn capture(&self, grid: DepthGrid) {
        let grid = Arc::new(grid);
        let valid = grid.valid_count();
        match self.baseline.write() {
            Ok(mut guard) => *guard = Some(grid),
            Err(poisoned) => *poisoned.into_inner() = Some(grid),
        }
        info!(valid_samples = valid, "Calibration baseline captured");
    }

    /// The stored baseline, or `None` if no calibration has happened yet
    pub fn current(&self) -> Option<Arc<DepthGrid>> {
        match self.baseline.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.current().is_some()
    }

    /// Drop the stored baseline
    pub fn clear(&self) {
        if let Ok(mut guard) = self.baseline.write() {
            *guard = None;
            debug!("Calibration baseline cleared");
        }
    }
}

/// State of the calibration trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// No request outstanding
    Idle,
    /// The next processed frame becomes the baseline
    Armed,
}

/// One-shot calibration request
///
/// `arm` may be called from any thread; `take` atomically consumes the request
/// so that exactly one frame is captured per request.
#[derive(Debug, Default)]
pub struct CalibrationTrigger {
    armed: AtomicBool,
}

impl CalibrationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
        debug!("Calibration requested");
    }

    /// Consume the request, returning whether one was outstanding
    pub fn take(&self) -> bool {
        self.armed.swap(false, Ordering::SeqCst)
    }

    pub fn state(&self) -> CalibrationState {
        if self.armed.load(Ordering::SeqCst) {
            CalibrationState::Armed
        } else {
            CalibrationState::Idle
        }
    }
}
