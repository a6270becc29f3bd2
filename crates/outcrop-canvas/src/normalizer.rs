// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Normaliser — scales a filled raster back to the width that entered the
// round and persists it.

use std::path::Path;

use outcrop_core::error::Result;
use tracing::{info, instrument};

use crate::planner::to_pixels;
use crate::raster::Raster;

/// Rescale `filled` so its width is exactly `target_width`.
///
/// The height follows the filled raster's own aspect ratio, so it is not
/// forced back to the pre-expansion height.
#[instrument(skip(filled), fields(from_w = filled.width(), from_h = filled.height()))]
pub fn normalize(filled: Raster, target_width: u32) -> Raster {
    let (width, height) = filled.dimensions();
    let target_height = proportional_height(width, height, target_width);
    if (width, height) == (target_width, target_height) {
        return filled;
    }
    info!(target_height, "Rescaling filled image");
    filled.resize_exact(target_width, target_height)
}

/// Write a normalised round result as JPEG.
pub fn persist(result: &Raster, path: impl AsRef<Path>, quality: u8) -> Result<()> {
    result.save_jpeg(path, quality)
}

fn proportional_height(width: u32, height: u32, target_width: u32) -> u32 {
    to_pixels(f64::from(height) * f64::from(target_width) / f64::from(width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn filled(width: u32, height: u32) -> Raster {
        Raster::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([90, 90, 90]),
        )))
    }

    #[test]
    fn reference_round_trip() {
        let result = normalize(filled(1344, 1012), 1280);
        assert_eq!(result.dimensions(), (1280, 964));
    }

    #[test]
    fn width_is_exact_for_any_input() {
        for &(w, h, target) in &[(1000, 10, 333), (7, 900, 64), (1408, 1024, 1280), (50, 50, 50)] {
            assert_eq!(normalize(filled(w, h), target).width(), target);
        }
    }

    #[test]
    fn height_follows_filled_aspect() {
        // The service answered at 1408x1024 rather than the planned 1344x1012.
        let result = normalize(filled(1408, 1024), 1280);
        assert_eq!(result.dimensions(), (1280, 931));
    }

    #[test]
    fn persist_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out-001.jpg");
        persist(&normalize(filled(60, 40), 30), &path, 90).unwrap();

        let reopened = Raster::open(&path).unwrap();
        assert_eq!(reopened.dimensions(), (30, 20));
    }
}
