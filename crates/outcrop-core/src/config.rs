// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run configuration. Loaded from a JSON file and/or assembled from CLI flags;
// every field has a default so a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OutcropError, Result};
use crate::types::FillParams;

/// Settings for a complete outpainting run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcropConfig {
    /// Canvas growth per round (1.05 grows the height by 5%).
    pub scale: f64,
    /// Mask edge expansion fraction sent to the fill service.
    pub dilation: f64,
    /// Generation step budget.
    pub base_steps: u32,
    /// Number of rounds to run.
    pub rounds: u32,
    /// Image that enters round 0.
    pub initial_file: Option<PathBuf>,
    /// Directory the numbered round outputs are written to.
    pub output_dir: PathBuf,
    /// Filename prefix of round outputs (`<prefix>-<index>.<ext>`).
    pub output_prefix: String,
    /// Extension of round outputs: `jpg` or `jpeg`, since outputs are JPEG encoded.
    pub output_extension: String,
    /// JPEG quality of round outputs (1-100).
    pub output_quality: u8,
    /// Colour behind the original in the matte (RGBA).
    pub backdrop: [u8; 4],
    pub endpoint: EndpointConfig,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Default for OutcropConfig {
    fn default() -> Self {
        Self {
            scale: 1.05,
            dilation: 0.03,
            base_steps: 50,
            rounds: 1,
            initial_file: None,
            output_dir: PathBuf::from("."),
            output_prefix: "out".into(),
            output_extension: "jpg".into(),
            output_quality: 90,
            backdrop: [0, 0, 0, 255],
            endpoint: EndpointConfig::default(),
            request_timeout_secs: 120,
            retry: RetrySettings::default(),
        }
    }
}

/// Where the generative fill model lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Cloud region hosting the model.
    pub location: String,
    /// Cloud project the request is billed to.
    pub project_id: String,
    /// Model identifier.
    pub model: String,
    /// Replaces `https://{location}-aiplatform.googleapis.com` when set.
    pub base_url: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            location: "us-central1".into(),
            project_id: String::new(),
            model: "imagen-3.0-capability-001".into(),
            base_url: None,
        }
    }
}

impl EndpointConfig {
    /// Full URL of the model's predict method.
    pub fn predict_url(&self) -> String {
        let base = match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        };
        format!(
            "{base}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.project_id, self.location, self.model
        )
    }
}

/// Backoff policy for fill requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 60_000,
        }
    }
}

impl OutcropConfig {
    /// Read a configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(invalid(format!("scale must be positive, got {}", self.scale)));
        }
        if !(0.0..=1.0).contains(&self.dilation) {
            return Err(invalid(format!(
                "dilation must be within 0..=1, got {}",
                self.dilation
            )));
        }
        if self.base_steps == 0 {
            return Err(invalid("base_steps must be at least 1".into()));
        }
        if self.rounds == 0 {
            return Err(invalid("rounds must be at least 1".into()));
        }
        if !(1..=100).contains(&self.output_quality) {
            return Err(invalid(format!(
                "output_quality must be within 1..=100, got {}",
                self.output_quality
            )));
        }
        if self.output_prefix.is_empty() {
            return Err(invalid("output prefix must not be empty".into()));
        }
        if !["jpg", "jpeg"].contains(&self.output_extension.to_ascii_lowercase().as_str()) {
            return Err(invalid(format!(
                "output extension must be jpg or jpeg (got {:?}); round outputs are JPEG encoded",
                self.output_extension
            )));
        }
        if self.endpoint.project_id.trim().is_empty() {
            return Err(invalid("endpoint.project_id is required".into()));
        }
        Ok(())
    }

    /// Generation parameters derived from this configuration.
    pub fn fill_params(&self) -> FillParams {
        FillParams {
            dilation: self.dilation,
            base_steps: self.base_steps,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn invalid(reason: String) -> OutcropError {
    OutcropError::InvalidConfig(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> OutcropConfig {
        OutcropConfig {
            endpoint: EndpointConfig {
                project_id: "demo-project".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_recommended_values() {
        let config = OutcropConfig::default();
        assert_eq!(config.scale, 1.05);
        assert_eq!(config.dilation, 0.03);
        assert_eq!(config.base_steps, 50);
        assert_eq!(config.output_prefix, "out");
        assert_eq!(config.output_extension, "jpg");
    }

    #[test]
    fn predict_url_from_location_and_project() {
        let endpoint = EndpointConfig {
            project_id: "demo-project".into(),
            ..Default::default()
        };
        assert_eq!(
            endpoint.predict_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo-project/locations/us-central1/publishers/google/models/imagen-3.0-capability-001:predict"
        );
    }

    #[test]
    fn predict_url_honours_base_override() {
        let endpoint = EndpointConfig {
            project_id: "p".into(),
            base_url: Some("http://127.0.0.1:9000/".into()),
            ..Default::default()
        };
        assert!(endpoint
            .predict_url()
            .starts_with("http://127.0.0.1:9000/v1/projects/p/"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(valid().validate().is_ok());

        let cases = [
            OutcropConfig { scale: 0.0, ..valid() },
            OutcropConfig { scale: f64::NAN, ..valid() },
            OutcropConfig { dilation: 1.5, ..valid() },
            OutcropConfig { base_steps: 0, ..valid() },
            OutcropConfig { rounds: 0, ..valid() },
            OutcropConfig { output_quality: 0, ..valid() },
            OutcropConfig { output_extension: "png".into(), ..valid() },
            OutcropConfig { output_extension: String::new(), ..valid() },
            OutcropConfig::default(),
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(OutcropError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn jpeg_extensions_accepted_in_any_case() {
        for ext in ["jpg", "jpeg", "JPG"] {
            let config = OutcropConfig {
                output_extension: ext.into(),
                ..valid()
            };
            assert!(config.validate().is_ok(), "{ext} should be accepted");
        }
    }

    #[test]
    fn partial_file_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outcrop.json");
        std::fs::write(
            &path,
            r#"{ "rounds": 12, "endpoint": { "project_id": "demo" } }"#,
        )
        .unwrap();

        let config = OutcropConfig::load(&path).unwrap();
        assert_eq!(config.rounds, 12);
        assert_eq!(config.endpoint.project_id, "demo");
        assert_eq!(config.endpoint.location, "us-central1");
        assert_eq!(config.scale, 1.05);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outcrop.json");
        let config = OutcropConfig { rounds: 7, ..valid() };
        config.save(&path).unwrap();

        let loaded = OutcropConfig::load(&path).unwrap();
        assert_eq!(loaded.rounds, 7);
        assert_eq!(loaded.endpoint.project_id, "demo-project");
    }
}
