// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Outcrop canvas-expansion pipeline.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one multi-round run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target canvas for one round.
///
/// `aspect_ratio` is the ratio of the raster that entered the round, not the
/// ratio of the rounded `width`/`height` pair (which may differ by up to one
/// pixel of rounding).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPlan {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

/// Pixel offset of the original raster inside the expanded canvas.
///
/// Signed because a scale below 1.0 shrinks the canvas and pushes the
/// original partly outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

/// Meaning of a mask pixel.
///
/// The fill service reads the mask as a colour image: white marks pixels it
/// may synthesise, black marks pixels it must keep. Swapping the two inverts
/// the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskRole {
    /// Border region the model is free to synthesise.
    Generate,
    /// Original content that must be preserved exactly.
    Preserve,
}

impl MaskRole {
    /// RGBA colour this role is encoded as on the wire.
    pub const fn rgba(self) -> [u8; 4] {
        match self {
            Self::Generate => [255, 255, 255, 255],
            Self::Preserve => [0, 0, 0, 255],
        }
    }

    /// Decode a mask pixel. Anything other than the two reserved colours is
    /// not a valid mask value.
    pub fn from_rgba(rgba: [u8; 4]) -> Option<Self> {
        if rgba == Self::Generate.rgba() {
            Some(Self::Generate)
        } else if rgba == Self::Preserve.rgba() {
            Some(Self::Preserve)
        } else {
            None
        }
    }
}

/// Generation parameters sent with every fill request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillParams {
    /// Fractional growth of the generate region past the strict border.
    pub dilation: f64,
    /// Step budget for the generation.
    pub base_steps: u32,
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            dilation: 0.03,
            base_steps: 50,
        }
    }
}

/// Classification of errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Network blip, timeout, throttling, expired token. Safe to retry.
    Transient,
    /// Operator must act (log in, fix a path, grant access).
    UserAction,
    /// Retrying will not help: bad request, bad image, bad config.
    Permanent,
}

/// Pipeline stages of a single round, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Load,
    Plan,
    Matte,
    Mask,
    Fill,
    Normalize,
    Persist,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Plan => "plan",
            Self::Matte => "matte",
            Self::Mask => "mask",
            Self::Fill => "fill",
            Self::Normalize => "normalize",
            Self::Persist => "persist",
        };
        f.write_str(name)
    }
}

/// What one round did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// Zero-based round index.
    pub index: u32,
    pub input: PathBuf,
    pub output: PathBuf,
    /// Size of the raster that entered the round.
    pub input_size: (u32, u32),
    pub plan: CanvasPlan,
    pub offset: Offset,
    /// Size of the raster returned by the fill service.
    pub filled_size: (u32, u32),
    /// Size of the persisted result.
    pub output_size: (u32, u32),
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub reports: Vec<RoundReport>,
}

impl RunSummary {
    /// Path of the last persisted round, if any round ran.
    pub fn final_output(&self) -> Option<&PathBuf> {
        self.reports.last().map(|r| &r.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_roles_use_distinct_colours() {
        assert_ne!(MaskRole::Generate.rgba(), MaskRole::Preserve.rgba());
        assert_eq!(MaskRole::Generate.rgba(), [255, 255, 255, 255]);
        assert_eq!(MaskRole::Preserve.rgba(), [0, 0, 0, 255]);
    }

    #[test]
    fn mask_role_decodes_reserved_colours_only() {
        assert_eq!(
            MaskRole::from_rgba([255, 255, 255, 255]),
            Some(MaskRole::Generate)
        );
        assert_eq!(MaskRole::from_rgba([0, 0, 0, 255]), Some(MaskRole::Preserve));
        assert_eq!(MaskRole::from_rgba([128, 128, 128, 255]), None);
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Fill.to_string(), "fill");
        assert_eq!(Stage::Normalize.to_string(), "normalize");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
