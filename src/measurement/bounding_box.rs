// SPDX-License-Identifier: GPL-3.0-only

//! Density-thresholded edge scanning
//!
//! A pixel is "present" when its excess depth is non-zero. Rows are scanned
//! from the top and bottom at the same time, columns from the left and right;
//! the first line on each side with more than `density` present pixels is
//! that side's edge.

use super::grid::DifferenceGrid;
use serde::Serialize;
use tracing::debug;

/// Outcome of scanning for one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeScan {
    Found(u32),
    NotFound,
}

impl EdgeScan {
    pub fn edge(self) -> Option<u32> {
        match self {
            EdgeScan::Found(edge) => Some(edge),
            EdgeScan::NotFound => None,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, EdgeScan::Found(_))
    }
}

/// Per-side scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeScans {
    pub top: EdgeScan,
    pub bottom: EdgeScan,
    pub left: EdgeScan,
    pub right: EdgeScan,
}

/// Inclusive pixel rectangle around the detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl BoundingBox {
    /// Horizontal extent in pixels (`right - left`)
    pub fn pixel_width(&self) -> u32 {
        self.right - self.left
    }

    /// Vertical extent in pixels (`bottom - top`)
    pub fn pixel_height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn contains(&self, column: u32, row: u32) -> bool {
        (self.left..=self.right).contains(&column) && (self.top..=self.bottom).contains(&row)
    }
}

impl EdgeScans {
    /// Assemble a box if every side was found and the sides are ordered
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let bbox = BoundingBox {
            top: self.top.edge()?,
            bottom: self.bottom.edge()?,
            left: self.left.edge()?,
            right: self.right.edge()?,
        };
        (bbox.top <= bbox.bottom && bbox.left <= bbox.right).then_some(bbox)
    }
}

/// Scan all four sides of `diff`
pub fn scan_edges(diff: &DifferenceGrid, density: u32) -> EdgeScans {
    let (top, bottom) = scan_two_sided(diff.height(), diff.width(), density, |line, i| {
        diff.get(i, line) > 0
    });
    let (left, right) = scan_two_sided(diff.width(), diff.height(), density, |line, i| {
        diff.get(line, i) > 0
    });

    let scans = EdgeScans {
        top,
        bottom,
        left,
        right,
    };
    debug!(?scans, "Edge scan complete");
    scans
}

/// Locate the object's bounding box, `None` if any side is missing
pub fn locate(diff: &DifferenceGrid, density: u32) -> Option<BoundingBox> {
    scan_edges(diff, density).bounding_box()
}

/// Scan `lines` lines of `line_len` pixels from both ends at once
///
/// `present(line, i)` reports whether pixel `i` of line `line` is occupied.
fn scan_two_sided<F>(lines: u32, line_len: u32, density: u32, present: F) -> (EdgeScan, EdgeScan)
where
    F: Fn(u32, u32) -> bool,
{
    let count = |line: u32| (0..line_len).filter(|&i| present(line, i)).count() as u32;

    let mut near = EdgeScan::NotFound;
    let mut far = EdgeScan::NotFound;

    for step in 0..lines {
        if !near.is_found() && count(step) > density {
            near = EdgeScan::Found(step);
        }
        let far_line = lines - step - 1;
        if !far.is_found() && count(far_line) > density {
            far = EdgeScan::Found(far_line);
        }
        if near.is_found() && far.is_found() {
            break;
        }
    }

    (near, far)
}
