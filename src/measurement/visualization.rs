// SPDX-License-Identifier: GPL-3.0-only

//! Depth visualization helpers
//!
//! Produces flat 8-bit grayscale buffers for the rendering side:
//! - Filtered depth (far = bright, linear in millimeters)
//! - Excess depth with the bounding box outlined

use super::bounding_box::BoundingBox;
use super::grid::DepthGrid;
use crate::constants::depth_to_byte_divisor;
use crate::constants::display::{DIFFERENCE_GAIN, EDGE_INTENSITY};

/// Convert filtered depth (mm) to grayscale
///
/// Samples outside the frame's reliable range map to 0 (black); the rest are
/// divided by `max_depth_mm / 256`.
pub fn depth_to_gray(grid: &DepthGrid, max_depth_mm: u16) -> Vec<u8> {
    let divisor = depth_to_byte_divisor(max_depth_mm);
    let (min, max) = (grid.min_reliable_distance, grid.max_reliable_distance);

    grid.samples()
        .iter()
        .map(|&depth| {
            if depth >= min && depth <= max {
                (depth / divisor).min(255) as u8
            } else {
                0
            }
        })
        .collect()
}

/// Convert excess depth (mm) to grayscale, amplified and clamped to 255
pub fn difference_to_gray(diff: &DepthGrid, max_depth_mm: u16) -> Vec<u8> {
    let divisor = u32::from(depth_to_byte_divisor(max_depth_mm));
    diff.samples()
        .iter()
        .map(|&d| ((u32::from(d) / divisor) * DIFFERENCE_GAIN).min(255) as u8)
        .collect()
}

/// Draw the four sides of `bbox` into a grayscale buffer of `width` columns
pub fn draw_bounding_box(pixels: &mut [u8], width: u32, bbox: &BoundingBox) {
    let width = width as usize;
    let mut put = |column: u32, row: u32| {
        if let Some(p) = pixels.get_mut(column as usize + row as usize * width) {
            *p = EDGE_INTENSITY;
        }
    };

    for column in bbox.left..=bbox.right {
        put(column, bbox.top);
        put(column, bbox.bottom);
    }
    for row in bbox.top..=bbox.bottom {
        put(bbox.left, row);
        put(bbox.right, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_to_gray() {
        let grid = DepthGrid::new(4, 1, vec![0, 620, 3100, 7936])
            .unwrap()
            .with_reliable_range(500, 4500);
        let gray = depth_to_gray(&grid, 8000);
        // divisor = 31; 7936 is beyond the reliable range
        assert_eq!(gray, vec![0, 20, 100, 0]);
    }

    #[test]
    fn test_difference_to_gray_clamps() {
        let diff = DepthGrid::new(3, 1, vec![0, 310, 2000]).unwrap();
        assert_eq!(difference_to_gray(&diff, 8000), vec![0, 100, 255]);
    }

    #[test]
    fn test_draw_bounding_box() {
        let mut pixels = vec![0u8; 25];
        let bbox = BoundingBox {
            top: 1,
            bottom: 3,
            left: 1,
            right: 3,
        };
        draw_bounding_box(&mut pixels, 5, &bbox);

        let outlined = pixels.iter().filter(|&&p| p == 255).count();
        assert_eq!(outlined, 8);
        assert_eq!(pixels[2 + 2 * 5], 0, "interior stays untouched");
        assert_eq!(pixels[1 + 5], 255);
        assert_eq!(pixels[3 + 3 * 5], 255);
    }
}
