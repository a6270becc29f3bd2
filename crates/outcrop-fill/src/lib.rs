// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outcrop Fill — the remote generative fill step. Holds the predict wire
// contract, the access-token provider, the HTTP client and the retry layer
// that can be stacked on top of it.

pub mod client;
pub mod credentials;
pub mod retry;
pub mod wire;

pub use client::{FillService, ImagenClient};
pub use credentials::{CachedCredentials, CredentialProvider, GcloudTokenSource, StaticTokenSource};
pub use retry::{RetryConfig, RetryingFill};
