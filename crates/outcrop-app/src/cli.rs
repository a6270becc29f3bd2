// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments and their merge onto the configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use outcrop_core::OutcropConfig;

/// Grow an image's canvas round after round, filling each new border with a
/// generative model.
#[derive(Parser, Debug)]
#[command(name = "outcrop")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Image that enters the first round. Overrides `initial_file`.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// JSON configuration file. Flags override its values.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of rounds to run.
    #[arg(short = 'n', long, value_name = "INT")]
    pub rounds: Option<u32>,

    /// Canvas growth per round (1.05 = 5% larger).
    #[arg(short, long, value_name = "FLOAT")]
    pub scale: Option<f64>,

    /// Mask edge expansion fraction (0.03 is suggested).
    #[arg(long, value_name = "FLOAT")]
    pub dilation: Option<f64>,

    /// Generation step budget (35 is a reasonable start).
    #[arg(long, value_name = "INT")]
    pub steps: Option<u32>,

    /// Output JPEG quality (1-100).
    #[arg(short, long, value_name = "INT")]
    pub quality: Option<u8>,

    /// Directory round outputs are written to.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Filename prefix of round outputs.
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Cloud project id the requests are billed to.
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Cloud region hosting the model.
    #[arg(long, value_name = "REGION")]
    pub location: Option<String>,

    /// Model identifier.
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Base URL replacing the regional endpoint host.
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries per fill request on transient failures (0 disables).
    #[arg(long, value_name = "INT")]
    pub max_retries: Option<u32>,

    /// Read the access token from this environment variable instead of
    /// running `gcloud auth print-access-token`.
    #[arg(long, value_name = "VAR")]
    pub access_token_env: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Load the configuration file (if any), apply flags, and validate.
    pub fn resolve_config(&self) -> Result<OutcropConfig> {
        let mut config = match &self.config {
            Some(path) => OutcropConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => OutcropConfig::default(),
        };

        if let Some(input) = &self.input {
            config.initial_file = Some(input.clone());
        }
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(dilation) = self.dilation {
            config.dilation = dilation;
        }
        if let Some(steps) = self.steps {
            config.base_steps = steps;
        }
        if let Some(quality) = self.quality {
            config.output_quality = quality;
        }
        if let Some(dir) = &self.out_dir {
            config.output_dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.output_prefix = prefix.clone();
        }
        if let Some(project) = &self.project {
            config.endpoint.project_id = project.clone();
        }
        if let Some(location) = &self.location {
            config.endpoint.location = location.clone();
        }
        if let Some(model) = &self.model {
            config.endpoint.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.base_url = Some(endpoint.clone());
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }

        config.validate().context("Invalid configuration")?;
        if config.initial_file.is_none() {
            anyhow::bail!("No input image given (pass INPUT or set initial_file)");
        }
        Ok(config)
    }
}
