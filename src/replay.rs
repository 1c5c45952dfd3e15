// SPDX-License-Identifier: GPL-3.0-only
//! Background frame processing loop
//!
//! Pulls frames from a [`FrameSource`] on a dedicated thread and runs each one
//! through a shared [`DimensionEngine`]. The engine can be driven from other
//! threads meanwhile (calibration requests, region changes), which only take
//! effect on the next frame.

use crate::errors::AppResult;
use crate::export;
use crate::measurement::{DepthGrid, DimensionEngine, FrameOutput};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// A frame as delivered by the acquisition side
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub grid: DepthGrid,
    pub min_reliable: u16,
    pub max_reliable: u16,
}

/// Supplier of depth frames
pub trait FrameSource: Send {
    /// Next frame, `Ok(None)` once the source is exhausted
    fn next_frame(&mut self) -> AppResult<Option<SourceFrame>>;
}

/// Frames recorded as files in a directory, replayed in name order
pub struct RecordedFrames {
    paths: std::vec::IntoIter<PathBuf>,
    raw_size: (u32, u32),
    reliable_range: (u16, u16),
    frame_interval: Option<Duration>,
}

impl RecordedFrames {
    pub fn open(dir: &Path, raw_size: (u32, u32)) -> AppResult<Self> {
        let paths = export::list_depth_frames(dir)?;
        info!(dir = %dir.display(), count = paths.len(), "Opened recorded frames");
        Ok(Self {
            paths: paths.into_iter(),
            raw_size,
            reliable_range: (0, u16::MAX),
            frame_interval: None,
        })
    }

    /// Reliable range reported with every frame
    pub fn with_reliable_range(mut self, min: u16, max: u16) -> Self {
        self.reliable_range = (min, max);
        self
    }

    /// Pace frames to roughly `fps` per second
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_interval = (fps > 0).then(|| Duration::from_secs(1) / fps);
        self
    }
}

impl FrameSource for RecordedFrames {
    fn next_frame(&mut self) -> AppResult<Option<SourceFrame>> {
        let Some(path) = self.paths.next() else {
            return Ok(None);
        };
        if let Some(interval) = self.frame_interval {
            thread::sleep(interval);
        }
        let grid = export::load_depth_frame(&path, self.raw_size)?;
        Ok(Some(SourceFrame {
            grid,
            min_reliable: self.reliable_range.0,
            max_reliable: self.reliable_range.1,
        }))
    }
}

/// In-memory frames, mostly for tests
impl FrameSource for std::vec::IntoIter<SourceFrame> {
    fn next_frame(&mut self) -> AppResult<Option<SourceFrame>> {
        Ok(self.next())
    }
}

/// Controller for a processing loop running in a separate thread
///
/// Dropping the controller stops the loop and waits for the thread.
pub struct ProcessingLoop {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl ProcessingLoop {
    /// Start processing frames from `source`
    ///
    /// `on_frame` receives the frame index and output of every processed frame.
    /// Frames the engine rejects are logged and skipped. The loop ends when
    /// the source is exhausted, fails, or a stop is requested.
    pub fn start<S, F>(
        name: &str,
        engine: Arc<DimensionEngine>,
        mut source: S,
        mut on_frame: F,
    ) -> Self
    where
        S: FrameSource + 'static,
        F: FnMut(usize, &FrameOutput) + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting processing loop");

        let thread_handle = thread::spawn(move || {
            let mut index = 0usize;
            loop {
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!(name = %name_clone, "Stop signal received");
                    break;
                }

                let frame = match source.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        debug!(name = %name_clone, "Frame source exhausted");
                        break;
                    }
                    Err(e) => {
                        warn!(name = %name_clone, error = %e, "Frame source failed");
                        break;
                    }
                };

                match engine.process_frame(&frame.grid, frame.min_reliable, frame.max_reliable) {
                    Ok(output) => on_frame(index, &output),
                    Err(e) => warn!(name = %name_clone, frame = index, error = %e, "Frame dropped"),
                }
                index += 1;
            }

            info!(name = %name_clone, frames = index, "Processing loop exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Get a clone of the stop signal for external use (e.g. a Ctrl+C handler)
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting processing loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take()
            && let Err(e) = handle.join()
        {
            warn!(name = %self.name, "Processing loop thread panicked: {:?}", e);
        }
    }
}

impl Drop for ProcessingLoop {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "ProcessingLoop dropped, stopping loop");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::measurement::FrameOutcome;
    use std::sync::Mutex;

    fn frame(grid: DepthGrid) -> SourceFrame {
        SourceFrame {
            grid,
            min_reliable: 0,
            max_reliable: u16::MAX,
        }
    }

    #[test]
    fn test_loop_processes_all_frames() {
        let engine = Arc::new(DimensionEngine::new(Config::default()));
        engine.request_calibration();

        let empty = DepthGrid::filled(64, 48, 2000);
        let mut with_object = empty.clone();
        for row in 10..30 {
            for column in 20..40 {
                with_object.set(column, row, 1600);
            }
        }
        let frames = vec![frame(empty), frame(with_object.clone()), frame(with_object)];

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&outcomes);
        let mut processing = ProcessingLoop::start(
            "test",
            Arc::clone(&engine),
            frames.into_iter(),
            move |index, output| sink.lock().unwrap().push((index, output.outcome.clone())),
        );
        processing.join();

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0], (0, FrameOutcome::Calibrated));
        assert!(outcomes[1].1.measurement().is_some());
        assert_eq!(outcomes[1].1, outcomes[2].1);
        assert!(!processing.is_running());
    }

    #[test]
    fn test_rejected_frames_are_skipped() {
        let engine = Arc::new(DimensionEngine::new(Config::default()));
        let frames = vec![
            frame(DepthGrid::filled(8, 8, 2000)),
            frame(DepthGrid::filled(4, 4, 2000)),
            frame(DepthGrid::filled(8, 8, 2000)),
        ];

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut processing =
            ProcessingLoop::start("test", engine, frames.into_iter(), move |index, _| {
                sink.lock().unwrap().push(index)
            });
        processing.join();

        assert_eq!(*seen.lock().unwrap(), vec![0, 2]);
    }
}
