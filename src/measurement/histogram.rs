// SPDX-License-Identifier: GPL-3.0-only

//! Depth histograms over the bounding box

use super::bounding_box::BoundingBox;
use super::grid::DepthGrid;
use crate::constants::depth::DEPTH_INVALID_MM;
use std::collections::BTreeMap;

/// Occurrence count per 16-bit value, ordered by value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthHistogram {
    counts: BTreeMap<u16, u32>,
}

impl DepthHistogram {
    /// Count every sample of `grid` inside `bbox`
    ///
    /// With `skip_invalid`, samples equal to [`DEPTH_INVALID_MM`] are left out.
    pub fn build(grid: &DepthGrid, bbox: &BoundingBox, skip_invalid: bool) -> Self {
        let mut histogram = Self::default();
        for row in bbox.top..=bbox.bottom {
            for column in bbox.left..=bbox.right {
                let value = grid.get(column, row);
                if skip_invalid && value == DEPTH_INVALID_MM {
                    continue;
                }
                histogram.add(value);
            }
        }
        histogram
    }

    pub fn add(&mut self, value: u16) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    pub fn count(&self, value: u16) -> u32 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Most frequent value
    ///
    /// Ties go to the larger value. `None` for an empty histogram.
    pub fn mode(&self) -> Option<u16> {
        self.counts
            .iter()
            .max_by_key(|&(_, &count)| count)
            .map(|(&value, _)| value)
    }

    /// Largest value seen more than `min_count` times
    pub fn largest_frequent(&self, min_count: u32) -> Option<u16> {
        self.counts
            .iter()
            .rev()
            .find(|&(_, &count)| count > min_count)
            .map(|(&value, _)| value)
    }
}

/// Histograms used by the measurement, both restricted to the bounding box
#[derive(Debug, Clone)]
pub struct BoxHistograms {
    /// Excess depth values, zeros included
    pub difference: DepthHistogram,
    /// Current depth values, invalid samples excluded
    pub depth: DepthHistogram,
}

impl BoxHistograms {
    pub fn build(diff: &DepthGrid, current: &DepthGrid, bbox: &BoundingBox) -> Self {
        Self {
            difference: DepthHistogram::build(diff, bbox, false),
            depth: DepthHistogram::build(current, bbox, true),
        }
    }

    /// Height of the object above the reference surface (mm), ignoring rare outliers
    pub fn object_height_mm(&self, outlier_count: u32) -> Option<u16> {
        self.difference.largest_frequent(outlier_count)
    }

    /// Modal distance from the camera (mm), 0 when nothing valid was seen
    pub fn camera_distance_mm(&self) -> u16 {
        self.depth.mode().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_box(grid: &DepthGrid) -> BoundingBox {
        BoundingBox {
            top: 0,
            bottom: grid.height() - 1,
            left: 0,
            right: grid.width() - 1,
        }
    }

    #[test]
    fn test_mode() {
        let grid = DepthGrid::new(5, 1, vec![1500, 1500, 1600, 0, 0]).unwrap();
        let histogram = DepthHistogram::build(&grid, &full_box(&grid), true);
        assert_eq!(histogram.count(0), 0);
        assert_eq!(histogram.mode(), Some(1500));
    }

    #[test]
    fn test_empty_mode_is_zero_distance() {
        let grid = DepthGrid::filled(3, 3, 0);
        let histograms = BoxHistograms::build(&grid, &grid, &full_box(&grid));
        assert!(histograms.depth.is_empty());
        assert_eq!(histograms.camera_distance_mm(), 0);
        // zeros are kept in the difference histogram
        assert_eq!(histograms.difference.count(0), 9);
    }

    #[test]
    fn test_largest_frequent_skips_outliers() {
        let mut histogram = DepthHistogram::default();
        for _ in 0..20 {
            histogram.add(300);
        }
        for _ in 0..5 {
            histogram.add(310);
        }
        for _ in 0..4 {
            histogram.add(900);
        }
        assert_eq!(histogram.largest_frequent(4), Some(310));
        assert_eq!(histogram.largest_frequent(5), Some(300));
        assert_eq!(histogram.largest_frequent(20), None);
    }

    #[test]
    fn test_box_bounds_are_inclusive() {
        let mut grid = DepthGrid::filled(4, 4, 1000);
        grid.set(3, 3, 2000);
        let bbox = BoundingBox {
            top: 1,
            bottom: 3,
            left: 1,
            right: 3,
        };
        let histogram = DepthHistogram::build(&grid, &bbox, true);
        assert_eq!(histogram.count(1000), 8);
        assert_eq!(histogram.count(2000), 1);
        assert_eq!(histogram.len(), 2);
    }
}
