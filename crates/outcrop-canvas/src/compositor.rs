// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor — builds the two canvas-sized rasters a fill request carries.
//
//   matte: backdrop colour with the original copied in at the offset
//   mask:  `MaskRole::Generate` everywhere except an original-sized
//          `MaskRole::Preserve` rectangle at the same offset

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use outcrop_core::error::Result;
use outcrop_core::types::{CanvasPlan, MaskRole, Offset};
use tracing::{debug, instrument};

use crate::raster::{Raster, encode_to_format};

/// Known pixels for the fill: the original centred on a solid backdrop.
#[derive(Debug, Clone)]
pub struct Matte(RgbaImage);

/// Which matte pixels the fill may synthesise and which it must keep.
#[derive(Debug, Clone)]
pub struct Mask(RgbaImage);

impl Matte {
    pub fn as_image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// PNG encoding used on the wire.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&DynamicImage::ImageRgba8(self.0.clone()), image::ImageFormat::Png)
    }

    /// Convert into a plain raster (e.g. to hand back from a stub fill).
    pub fn into_raster(self) -> Raster {
        Raster::from_dynamic(DynamicImage::ImageRgba8(self.0))
    }
}

impl Mask {
    pub fn as_image(&self) -> &RgbaImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Role of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn role_at(&self, x: u32, y: u32) -> Option<MaskRole> {
        self.0
            .get_pixel_checked(x, y)
            .and_then(|pixel| MaskRole::from_rgba(pixel.0))
    }

    /// PNG encoding used on the wire. Lossless so the two role colours
    /// arrive exactly.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&DynamicImage::ImageRgba8(self.0.clone()), image::ImageFormat::Png)
    }
}

/// Lay `original` over an opaque `backdrop` canvas of the planned size.
///
/// Pixels are copied, not blended: a translucent original keeps its alpha.
#[instrument(skip(original), fields(width = plan.width, height = plan.height, x = offset.x, y = offset.y))]
pub fn build_matte(
    original: &Raster,
    plan: &CanvasPlan,
    offset: Offset,
    backdrop: [u8; 4],
) -> Matte {
    let [r, g, b, _] = backdrop;
    let mut canvas = RgbaImage::from_pixel(plan.width, plan.height, Rgba([r, g, b, 255]));
    let top = original.as_dynamic().to_rgba8();
    imageops::replace(&mut canvas, &top, offset.x, offset.y);
    debug!("Matte composed");
    Matte(canvas)
}

/// Mark the planned canvas as `Generate` except for the original's footprint.
///
/// When the plan equals the original size the whole mask is `Preserve`.
#[instrument(skip(original), fields(width = plan.width, height = plan.height, x = offset.x, y = offset.y))]
pub fn build_mask(original: &Raster, plan: &CanvasPlan, offset: Offset) -> Mask {
    let mut canvas = RgbaImage::from_pixel(
        plan.width,
        plan.height,
        Rgba(MaskRole::Generate.rgba()),
    );
    let (width, height) = original.dimensions();
    let keep = Rect::at(clamp_i32(offset.x), clamp_i32(offset.y)).of_size(width, height);
    draw_filled_rect_mut(&mut canvas, keep, Rgba(MaskRole::Preserve.rgba()));
    debug!("Mask composed");
    Mask(canvas)
}

#[allow(clippy::cast_possible_truncation)]
fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
