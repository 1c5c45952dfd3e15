// SPDX-License-Identifier: MPL-2.0

//! Error types for the measurement application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Per-frame measurement errors
    Frame(FrameError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Per-frame conditions
///
/// All of these are recoverable: the frame is dropped or left unmeasured and
/// the next frame is an independent attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Raw buffer size or grid dimensions disagree with what the session expects
    FrameSizeMismatch {
        /// Expected size (samples or bytes, see `unit`)
        expected: usize,
        /// Actual size
        actual: usize,
        /// Unit of the sizes above
        unit: &'static str,
    },
    /// A measurement was attempted before any calibration
    NoBaseline,
    /// The bounding box scan did not find all four edges
    NoObjectDetected,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::FrameSizeMismatch {
                expected,
                actual,
                unit,
            } => write!(
                f,
                "Frame size mismatch: expected {} {}, got {}",
                expected, unit, actual
            ),
            FrameError::NoBaseline => write!(f, "No calibration baseline captured"),
            FrameError::NoObjectDetected => write!(f, "No object detected"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for FrameError {}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Storage(err.to_string())
    }
}
