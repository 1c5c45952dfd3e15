// SPDX-License-Identifier: GPL-3.0-only

//! Depth grid types

use crate::constants::depth::DEPTH_INVALID_MM;
use crate::constants::sensor::BYTES_PER_SAMPLE;
use crate::errors::FrameError;

/// A row-major grid of 16-bit depth samples in millimeters
///
/// A sample of [`DEPTH_INVALID_MM`] means the sensor had no valid reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthGrid {
    width: u32,
    height: u32,
    bytes_per_sample: u32,
    /// Nearest distance the sensor reported as reliable for this frame
    pub min_reliable_distance: u16,
    /// Farthest distance the sensor reported as reliable for this frame
    pub max_reliable_distance: u16,
    samples: Vec<u16>,
}

impl DepthGrid {
    /// Wrap already-decoded samples
    ///
    /// Fails with [`FrameError::FrameSizeMismatch`] if `samples.len() != width * height`.
    pub fn new(width: u32, height: u32, samples: Vec<u16>) -> Result<Self, FrameError> {
        let expected = (width as usize) * (height as usize);
        if samples.len() != expected {
            return Err(FrameError::FrameSizeMismatch {
                expected,
                actual: samples.len(),
                unit: "samples",
            });
        }
        Ok(Self {
            width,
            height,
            bytes_per_sample: BYTES_PER_SAMPLE,
            min_reliable_distance: 0,
            max_reliable_distance: u16::MAX,
            samples,
        })
    }

    /// Grid with every sample set to `value`
    pub fn filled(width: u32, height: u32, value: u16) -> Self {
        Self {
            width,
            height,
            bytes_per_sample: BYTES_PER_SAMPLE,
            min_reliable_distance: 0,
            max_reliable_distance: u16::MAX,
            samples: vec![value; (width as usize) * (height as usize)],
        }
    }

    /// Decode a raw little-endian 16-bit sensor buffer
    pub fn from_bytes(
        data: &[u8],
        width: u32,
        height: u32,
        bytes_per_sample: u32,
    ) -> Result<Self, FrameError> {
        let expected = (width as usize) * (height as usize) * (bytes_per_sample as usize);
        if bytes_per_sample != BYTES_PER_SAMPLE || data.len() != expected {
            return Err(FrameError::FrameSizeMismatch {
                expected: (width as usize) * (height as usize) * (BYTES_PER_SAMPLE as usize),
                actual: data.len(),
                unit: "bytes",
            });
        }

        let samples = data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(width, height, samples)
    }

    /// Attach the sensor's per-frame reliable range
    pub fn with_reliable_range(mut self, min: u16, max: u16) -> Self {
        self.min_reliable_distance = min;
        self.max_reliable_distance = max;
        self
    }

    /// Encode the samples as a little-endian byte buffer
    pub fn to_le_bytes(&self) -> Vec<u8> {
        if cfg!(target_endian = "little") {
            bytemuck::cast_slice::<u16, u8>(&self.samples).to_vec()
        } else {
            self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_sample(&self) -> u32 {
        self.bytes_per_sample
    }

    #[inline]
    pub fn index(&self, column: u32, row: u32) -> usize {
        column as usize + row as usize * self.width as usize
    }

    #[inline]
    pub fn get(&self, column: u32, row: u32) -> u16 {
        self.samples[self.index(column, row)]
    }

    pub fn set(&mut self, column: u32, row: u32, value: u16) {
        let i = self.index(column, row);
        self.samples[i] = value;
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Same width and height as `other`
    pub fn same_shape(&self, other: &DepthGrid) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Number of samples holding a valid reading
    pub fn valid_count(&self) -> usize {
        self.samples.iter().filter(|&&d| d != DEPTH_INVALID_MM).count()
    }
}

/// Per-pixel excess depth: how much nearer the current surface is than the baseline
///
/// Shares [`DepthGrid`]'s layout; every value is non-negative by construction.
pub type DifferenceGrid = DepthGrid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_little_endian() {
        let data = [0xD0, 0x07, 0x00, 0x00, 0xDC, 0x05, 0x01, 0x00];
        let grid = DepthGrid::from_bytes(&data, 2, 2, 2).expect("valid buffer");
        assert_eq!(grid.samples(), &[2000, 0, 1500, 1]);
        assert_eq!(grid.get(0, 1), 1500);
        assert_eq!(grid.to_le_bytes(), data.to_vec());
    }

    #[test]
    fn test_from_bytes_size_mismatch() {
        let err = DepthGrid::from_bytes(&[0u8; 7], 2, 2, 2).unwrap_err();
        assert_eq!(
            err,
            FrameError::FrameSizeMismatch {
                expected: 8,
                actual: 7,
                unit: "bytes"
            }
        );
    }

    #[test]
    fn test_from_bytes_rejects_other_sample_width() {
        assert!(DepthGrid::from_bytes(&[0u8; 16], 2, 2, 4).is_err());
    }

    #[test]
    fn test_new_checks_length() {
        assert!(DepthGrid::new(3, 2, vec![0; 5]).is_err());
        assert!(DepthGrid::new(3, 2, vec![0; 6]).is_ok());
    }

    #[test]
    fn test_mutation_keeps_shape() {
        let mut grid = DepthGrid::new(3, 2, vec![1; 6]).unwrap();
        grid.samples_mut().fill(0);
        grid.set(2, 1, 7);
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.bytes_per_sample(), 2);
    }

    #[test]
    fn test_row_major_index() {
        let grid = DepthGrid::filled(5, 4, 1);
        assert_eq!(grid.index(2, 3), 17);
        assert_eq!(grid.valid_count(), 20);
    }
}
