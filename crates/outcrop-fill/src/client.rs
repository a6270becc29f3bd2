// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async client for the generative fill model.
//
// One `fill` call is one POST to the model's `:predict` method: the matte and
// mask are PNG encoded, base64 wrapped, and sent with a bearer token; the
// first prediction of the response is decoded back into a raster.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use outcrop_canvas::{Mask, Matte, Raster};
use outcrop_core::error::{OutcropError, Result};
use outcrop_core::types::FillParams;
use reqwest::StatusCode;
use tracing::{debug, error, info, instrument};

use crate::credentials::CredentialProvider;
use crate::wire::{PredictRequest, parse_output};

/// Fills the `Generate` region of a matte.
///
/// The pipeline only depends on this trait, so the HTTP client, the retry
/// wrapper and test doubles are interchangeable.
#[async_trait]
pub trait FillService: Send + Sync {
    async fn fill(&self, matte: &Matte, mask: &Mask, params: &FillParams) -> Result<Raster>;
}

/// HTTP client for an Imagen-style `:predict` endpoint.
pub struct ImagenClient {
    http: reqwest::Client,
    url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ImagenClient {
    /// Create a client posting to `url` with a per-request `timeout`.
    pub fn new(
        url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OutcropError::Transport(format!("HTTP client setup: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            credentials,
        })
    }
}

#[async_trait]
impl FillService for ImagenClient {
    #[instrument(skip_all, fields(url = %self.url, width = matte.dimensions().0, height = matte.dimensions().1))]
    async fn fill(&self, matte: &Matte, mask: &Mask, params: &FillParams) -> Result<Raster> {
        let matte64 = general_purpose::STANDARD.encode(matte.to_png_bytes()?);
        let mask64 = general_purpose::STANDARD.encode(mask.to_png_bytes()?);
        let request = PredictRequest::outpaint(matte64, mask64, params);

        let token = self.credentials.token().await?;

        info!(
            dilation = params.dilation,
            base_steps = params.base_steps,
            "sending predict request"
        );
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| OutcropError::Transport(format!("predict: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OutcropError::Transport(format!("predict response body: {e}")))?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.credentials.invalidate().await;
            }
            error!(status = status.as_u16(), response = %body, "predict request failed");
            return Err(OutcropError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let image64 = parse_output(&body)?;
        let bytes = general_purpose::STANDARD
            .decode(image64.as_bytes())
            .map_err(|e| OutcropError::Image(format!("fill output is not valid base64: {e}")))?;
        let raster = Raster::from_bytes(&bytes)?;

        debug!(
            width = raster.width(),
            height = raster.height(),
            "predict response decoded"
        );
        Ok(raster)
    }
}
