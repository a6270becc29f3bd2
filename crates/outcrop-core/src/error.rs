// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Outcrop.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Outcrop operations.
#[derive(Debug, Error)]
pub enum OutcropError {
    // -- Remote fill errors --
    #[error("could not obtain an access token: {0}")]
    Credential(String),

    #[error("fill request failed: {0}")]
    Transport(String),

    #[error("fill service returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The service answered but the response carried no output image.
    #[error("fill service response contained no output image")]
    MissingOutput { payload: String },

    // -- Image errors --
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("failed to read image {path}: {reason}")]
    ImageRead { path: PathBuf, reason: String },

    #[error("failed to write image {path}: {reason}")]
    ImageWrite { path: PathBuf, reason: String },

    #[error("cannot prepare output directory {path}: {reason}")]
    OutputDir { path: PathBuf, reason: String },

    // -- Run control --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("run cancelled after {completed} completed round(s)")]
    Cancelled { completed: u32 },

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OutcropError>;
