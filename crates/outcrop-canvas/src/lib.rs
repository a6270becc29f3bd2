// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// outcrop-canvas — Raster handling for the Outcrop pipeline.
//
// Provides the in-memory raster wrapper (load, decode, encode, resize, save),
// the canvas planner (aspect-preserving growth and centring), the compositor
// that builds the matte and mask sent to the fill service, and the normaliser
// that brings a filled result back to the round's starting width.

pub mod compositor;
pub mod normalizer;
pub mod planner;
pub mod raster;

// Re-export the primary items so callers can use `outcrop_canvas::Raster` etc.
pub use compositor::{Mask, Matte, build_mask, build_matte};
pub use normalizer::{normalize, persist};
pub use planner::{centered_offset, plan};
pub use raster::Raster;
