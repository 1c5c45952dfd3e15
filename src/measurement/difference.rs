// SPDX-License-Identifier: GPL-3.0-only

//! Baseline-minus-current depth differencing

use super::grid::{DepthGrid, DifferenceGrid};
use crate::constants::depth::DEPTH_INVALID_MM;
use crate::errors::FrameError;

/// Excess depth for a single pixel
///
/// Zero if either sample is invalid or the current surface is not more than
/// `noise_floor_mm` nearer than the baseline.
#[inline]
pub fn excess_depth(baseline: u16, current: u16, noise_floor_mm: u16) -> u16 {
    if baseline == DEPTH_INVALID_MM || current == DEPTH_INVALID_MM {
        return 0;
    }
    let delta = i32::from(baseline) - i32::from(current);
    if delta <= i32::from(noise_floor_mm) {
        0
    } else {
        // baseline > current here, so the delta fits in u16
        delta as u16
    }
}

/// Compute the difference grid for two filtered grids of the same shape
pub fn difference(
    baseline: &DepthGrid,
    current: &DepthGrid,
    noise_floor_mm: u16,
) -> Result<DifferenceGrid, FrameError> {
    if !baseline.same_shape(current) {
        return Err(FrameError::FrameSizeMismatch {
            expected: baseline.len(),
            actual: current.len(),
            unit: "samples",
        });
    }

    let mut diff = DepthGrid::filled(current.width(), current.height(), 0);
    for ((out, &b), &c) in diff
        .samples_mut()
        .iter_mut()
        .zip(baseline.samples())
        .zip(current.samples())
    {
        *out = excess_depth(b, c, noise_floor_mm);
    }
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_samples_give_zero() {
        assert_eq!(excess_depth(0, 1500, 100), 0);
        assert_eq!(excess_depth(2000, 0, 100), 0);
        assert_eq!(excess_depth(0, 0, 100), 0);
    }

    #[test]
    fn test_noise_floor_is_inclusive() {
        assert_eq!(excess_depth(2000, 1900, 100), 0);
        assert_eq!(excess_depth(2000, 1899, 100), 101);
        assert_eq!(excess_depth(2000, 1500, 100), 500);
    }

    #[test]
    fn test_farther_surface_gives_zero() {
        assert_eq!(excess_depth(1500, 2000, 100), 0);
    }

    #[test]
    fn test_exhaustive_small_range() {
        for b in (0..=4000u16).step_by(97) {
            for c in (0..=4000u16).step_by(89) {
                let d = excess_depth(b, c, 100);
                if b == 0 || c == 0 || i32::from(b) - i32::from(c) <= 100 {
                    assert_eq!(d, 0, "b={b} c={c}");
                } else {
                    assert_eq!(d, b - c, "b={b} c={c}");
                }
            }
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let a = DepthGrid::filled(4, 4, 2000);
        let b = DepthGrid::filled(4, 3, 2000);
        assert!(matches!(
            difference(&a, &b, 100),
            Err(FrameError::FrameSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_difference_grid() {
        let baseline = DepthGrid::new(3, 1, vec![2000, 2000, 0]).unwrap();
        let current = DepthGrid::new(3, 1, vec![1500, 1950, 1000]).unwrap();
        let diff = difference(&baseline, &current, 100).unwrap();
        assert_eq!(diff.samples(), &[500, 0, 0]);
    }
}
