// SPDX-License-Identifier: GPL-3.0-only

//! Region-of-interest and valid-range filtering

use super::grid::DepthGrid;
use crate::config::RoiSize;
use crate::constants::depth::DEPTH_INVALID_MM;

/// A rectangle centered on the grid, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOfInterest {
    pub x1: u32,
    pub x2: u32,
    pub y1: u32,
    pub y2: u32,
}

impl RegionOfInterest {
    /// Center a `size` window on a `grid_width` x `grid_height` grid
    ///
    /// Sizes larger than the grid are clamped so that `x1 <= x2 <= grid_width`.
    pub fn centered(size: RoiSize, grid_width: u32, grid_height: u32) -> Self {
        let x1 = (grid_width - size.width.min(grid_width)) / 2;
        let y1 = (grid_height - size.height.min(grid_height)) / 2;
        Self {
            x1,
            x2: grid_width - x1,
            y1,
            y2: grid_height - y1,
        }
    }

    #[inline]
    pub fn contains(&self, column: u32, row: u32) -> bool {
        column >= self.x1 && column <= self.x2 && row >= self.y1 && row <= self.y2
    }
}

/// Invalidate samples outside the region or outside `[min_mm, max_mm]`
pub fn filter_depth(
    grid: &DepthGrid,
    roi: &RegionOfInterest,
    min_mm: u16,
    max_mm: u16,
) -> DepthGrid {
    let mut filtered = grid.clone();
    let width = grid.width() as usize;

    for (i, sample) in filtered.samples_mut().iter_mut().enumerate() {
        let column = (i % width) as u32;
        let row = (i / width) as u32;
        if *sample < min_mm || *sample > max_mm || !roi.contains(column, row) {
            *sample = DEPTH_INVALID_MM;
        }
    }

    filtered
}
