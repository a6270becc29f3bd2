// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canvas planner — target size for one round and the offset that centres the
// current raster inside it.

use outcrop_core::types::{CanvasPlan, Offset};

/// Compute the grown canvas for a `width` x `height` raster.
///
/// The height is scaled first and the width is solved back from the aspect
/// ratio, so the result carries a single rounding instead of two independent
/// ones. Both sides are at least one pixel.
pub fn plan(width: u32, height: u32, scale: f64) -> CanvasPlan {
    let aspect_ratio = f64::from(width) / f64::from(height);
    let new_height = to_pixels(f64::from(height) * scale);
    let new_width = to_pixels(aspect_ratio * f64::from(new_height));

    CanvasPlan {
        width: new_width,
        height: new_height,
        aspect_ratio,
    }
}

/// Offset placing an `old_width` x `old_height` raster in the middle of `plan`.
pub fn centered_offset(old_width: u32, old_height: u32, plan: &CanvasPlan) -> Offset {
    let dx = (f64::from(plan.width) - f64::from(old_width)) / 2.0;
    let dy = (f64::from(plan.height) - f64::from(old_height)) / 2.0;
    Offset {
        x: round_half_up(dx) as i64,
        y: round_half_up(dy) as i64,
    }
}

/// Round to the nearest integer, ties toward positive infinity.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_pixels(value: f64) -> u32 {
    // Clamped before the cast.
    round_half_up(value).clamp(1.0, f64::from(u32::MAX)) as u32
}
