// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One round: load → plan → matte → mask → fill → normalise → persist.
//
// Stages run in that fixed order and each logs a progress line before it
// starts, so the last line logged before a failure names the failing stage.

use std::path::Path;

use chrono::Utc;
use outcrop_canvas::{Raster, build_mask, build_matte, centered_offset, normalize, persist, plan};
use outcrop_core::config::OutcropConfig;
use outcrop_core::error::Result;
use outcrop_core::types::{FillParams, RoundReport, Stage};
use outcrop_fill::FillService;
use tracing::{info, instrument};

/// Per-round knobs, fixed for a whole run.
#[derive(Debug, Clone)]
pub struct RoundSettings {
    /// Canvas growth factor.
    pub scale: f64,
    /// Matte backdrop colour.
    pub backdrop: [u8; 4],
    pub params: FillParams,
    /// JPEG quality of the persisted result.
    pub quality: u8,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self::from_config(&OutcropConfig::default())
    }
}

impl RoundSettings {
    pub fn from_config(config: &OutcropConfig) -> Self {
        Self {
            scale: config.scale,
            backdrop: config.backdrop,
            params: config.fill_params(),
            quality: config.output_quality,
        }
    }
}

/// Grow the image at `input` by one round and write the result to `output`.
///
/// The rasters built here are dropped when the round returns; only the file
/// at `output` survives into the next round.
#[instrument(skip(fill, settings, input, output), fields(round = index, input = %input.display(), output = %output.display()))]
pub async fn run_round<F: FillService + ?Sized>(
    index: u32,
    input: &Path,
    output: &Path,
    fill: &F,
    settings: &RoundSettings,
) -> Result<RoundReport> {
    let started_at = Utc::now();

    info!(stage = %Stage::Load, "Loading {}", input.display());
    let original = Raster::open(input)?;
    let (width, height) = original.dimensions();

    let canvas = plan(width, height, settings.scale);
    let offset = centered_offset(width, height, &canvas);
    info!(
        stage = %Stage::Plan,
        width,
        height,
        new_width = canvas.width,
        new_height = canvas.height,
        x = offset.x,
        y = offset.y,
        "Working canvas"
    );

    info!(stage = %Stage::Matte, "Create matte");
    let matte = build_matte(&original, &canvas, offset, settings.backdrop);

    info!(stage = %Stage::Mask, "Create mask");
    let mask = build_mask(&original, &canvas, offset);
    drop(original);

    info!(stage = %Stage::Fill, "Call fill service");
    let filled = fill.fill(&matte, &mask, &settings.params).await?;
    let filled_size = filled.dimensions();

    info!(
        stage = %Stage::Normalize,
        "Scale image width {} -> {}",
        filled_size.0,
        width
    );
    let result = normalize(filled, width);

    info!(stage = %Stage::Persist, "Save to {}", output.display());
    persist(&result, output, settings.quality)?;

    Ok(RoundReport {
        index,
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        input_size: (width, height),
        plan: canvas,
        offset,
        filled_size,
        output_size: result.dimensions(),
        started_at,
        finished_at: Utc::now(),
    })
}
