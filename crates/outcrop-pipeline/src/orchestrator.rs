// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-round driver.
//
// Rounds run strictly one after another: round `i` starts only after round
// `i - 1` has written its file. Any failure ends the run. Cancellation is
// checked before each round begins.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use outcrop_core::config::OutcropConfig;
use outcrop_core::error::{OutcropError, Result};
use outcrop_core::types::{RunId, RunSummary};
use outcrop_fill::FillService;
use tracing::{error, info, instrument, warn};

use crate::naming::RoundNaming;
use crate::round::{RoundSettings, run_round};

/// Shared stop request for a run. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before its next round.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where round outputs go.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub dir: std::path::PathBuf,
    pub prefix: String,
    pub extension: String,
}

impl OutputLayout {
    pub fn from_config(config: &OutcropConfig) -> Self {
        Self {
            dir: config.output_dir.clone(),
            prefix: config.output_prefix.clone(),
            extension: config.output_extension.clone(),
        }
    }
}

/// Runs N rounds against one fill service.
pub struct Orchestrator<F> {
    fill: F,
    settings: RoundSettings,
    layout: OutputLayout,
    cancel: CancelFlag,
}

impl<F: FillService> Orchestrator<F> {
    pub fn new(fill: F, settings: RoundSettings, layout: OutputLayout) -> Self {
        Self {
            fill,
            settings,
            layout,
            cancel: CancelFlag::new(),
        }
    }

    pub fn from_config(fill: F, config: &OutcropConfig) -> Self {
        Self::new(
            fill,
            RoundSettings::from_config(config),
            OutputLayout::from_config(config),
        )
    }

    /// Use an externally owned cancel flag (e.g. one tripped by Ctrl-C).
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run `rounds` rounds starting from `initial_file`.
    ///
    /// Returns one report per round. A failing round aborts the run; files
    /// already written by earlier rounds are left in place.
    #[instrument(skip(self, initial_file), fields(initial = %initial_file.display()))]
    pub async fn run(&self, initial_file: &Path, rounds: u32) -> Result<RunSummary> {
        let run_id = RunId::new();
        let naming = RoundNaming::new(
            &self.layout.dir,
            &self.layout.prefix,
            &self.layout.extension,
            rounds,
        );
        std::fs::create_dir_all(naming.dir()).map_err(|err| OutcropError::OutputDir {
            path: naming.dir().to_path_buf(),
            reason: err.to_string(),
        })?;

        info!(%run_id, dir = %naming.dir().display(), "starting run");
        let mut reports = Vec::with_capacity(rounds as usize);

        for round in 0..rounds {
            if self.cancel.is_cancelled() {
                warn!(%run_id, completed = round, "run cancelled");
                return Err(OutcropError::Cancelled { completed: round });
            }

            let input = naming.input_for_round(round, initial_file);
            let output = naming.output_for_round(round);
            info!(
                "* Round {}/{}: {} -> {}",
                round + 1,
                rounds,
                input.display(),
                output.display()
            );

            let report = run_round(round, &input, &output, &self.fill, &self.settings)
                .await
                .inspect_err(|e| error!(%run_id, round, error = %e, "round failed"))?;
            reports.push(report);
        }

        info!(%run_id, rounds, "run complete");
        Ok(RunSummary { run_id, reports })
    }
}
