// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outcrop — iterative canvas expansion with a generative fill model.
//
// Entry point. Parses flags, initialises logging, wires the credential
// provider, fill client and retry layer into the orchestrator, and runs it.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Args;
use outcrop_core::OutcropError;
use outcrop_core::human_errors::humanize_error;
use outcrop_fill::{
    CachedCredentials, CredentialProvider, GcloudTokenSource, ImagenClient, RetryConfig,
    RetryingFill, StaticTokenSource,
};
use outcrop_pipeline::{CancelFlag, Orchestrator};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args).await {
        tracing::error!("{err:#}");
        if let Some(outcrop_err) = err.downcast_ref::<OutcropError>() {
            let human = humanize_error(outcrop_err);
            tracing::debug!(severity = ?human.severity, retriable = human.retriable, "classified failure");
            eprintln!("{}", human.render());
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(args: &Args) -> Result<()> {
    let config = args.resolve_config()?;
    let initial = config
        .initial_file
        .clone()
        .context("No input image given")?;

    if !initial.exists() {
        anyhow::bail!("Input file does not exist: {}", initial.display());
    }

    let credentials: Arc<dyn CredentialProvider> = match &args.access_token_env {
        Some(var) => Arc::new(CachedCredentials::new(StaticTokenSource::from_env(var)?)),
        None => Arc::new(CachedCredentials::new(GcloudTokenSource::default())),
    };
    // Fail before the first round rather than after compositing it.
    credentials
        .token()
        .await
        .context("Failed to obtain an access token")?;

    let url = config.endpoint.predict_url();
    tracing::info!(%url, model = %config.endpoint.model, "fill endpoint");
    let client = ImagenClient::new(url, credentials, config.request_timeout())
        .context("Failed to initialise fill client")?;
    let fill = RetryingFill::new(client, RetryConfig::from(&config.retry));

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current round");
            on_interrupt.cancel();
        }
    });

    let orchestrator = Orchestrator::from_config(fill, &config).with_cancel(cancel);
    let summary = orchestrator
        .run(&initial, config.rounds)
        .await
        .context("Outpainting run failed")?;

    if let Some(last) = summary.final_output() {
        println!(
            "Completed {} round(s): {} -> {}",
            summary.reports.len(),
            initial.display(),
            last.display()
        );
    }

    Ok(())
}
