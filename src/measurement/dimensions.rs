// SPDX-License-Identifier: GPL-3.0-only

//! Pixel extents to physical dimensions

use super::bounding_box::BoundingBox;
use crate::config::Optics;
use crate::constants::MM_PER_CM;
use serde::{Deserialize, Serialize};

/// Physical size of the detected object, in whole centimeters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Horizontal extent in the image plane
    pub width_cm: i32,
    /// Vertical extent in the image plane
    pub height_cm: i32,
    /// How far the object stands off the reference surface
    pub depth_cm: i32,
    /// Modal distance from the camera to the object (mm)
    pub camera_distance_mm: u16,
    /// Largest frequent excess depth (mm) the depth was derived from
    pub object_height_mm: u16,
}

/// Physical span of `pixels` out of `total_pixels` at `distance_mm`, for a sensor
/// with the given full field of view
pub fn span_mm(distance_mm: u16, fov_deg: f64, pixels: u32, total_pixels: u32) -> f64 {
    let half_fov = (fov_deg / 2.0).to_radians();
    let scale = f64::from(pixels) / f64::from(total_pixels);
    2.0 * f64::from(distance_mm) * half_fov.tan().abs() * scale
}

#[inline]
fn mm_to_cm(mm: f64) -> i32 {
    (mm / MM_PER_CM) as i32
}

/// Convert a bounding box and distances into a [`Measurement`]
pub fn measure(
    bbox: &BoundingBox,
    grid_width: u32,
    grid_height: u32,
    camera_distance_mm: u16,
    object_height_mm: u16,
    optics: &Optics,
) -> Measurement {
    let width_mm = span_mm(
        camera_distance_mm,
        optics.horizontal_fov_deg,
        bbox.pixel_width(),
        grid_width,
    );
    let height_mm = span_mm(
        camera_distance_mm,
        optics.vertical_fov_deg,
        bbox.pixel_height(),
        grid_height,
    );

    Measurement {
        width_cm: mm_to_cm(width_mm),
        height_cm: mm_to_cm(height_mm),
        depth_cm: i32::from(object_height_mm / 10),
        camera_distance_mm,
        object_height_mm,
    }
}
