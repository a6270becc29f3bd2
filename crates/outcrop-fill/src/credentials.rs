// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Access tokens for the fill service.
//
// A `TokenSource` knows how to mint a token (gcloud CLI, environment, ...).
// `CachedCredentials` wraps a source, fetches once, and hands the same token
// to every request until it is invalidated.

use async_trait::async_trait;
use outcrop_core::error::{OutcropError, Result};
use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Supplies the bearer token attached to fill requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current token. Fetch failures are `OutcropError::Credential`.
    async fn token(&self) -> Result<String>;

    /// Drop any cached token so the next `token()` fetches a fresh one.
    async fn invalidate(&self) {}
}

/// A mechanism that produces a fresh token on every call.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Single-fetch-then-reuse cache over a `TokenSource`.
pub struct CachedCredentials<S> {
    source: S,
    cached: RwLock<Option<String>>,
}

impl<S: TokenSource> CachedCredentials<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }
}

#[async_trait]
impl<S: TokenSource> CredentialProvider for CachedCredentials<S> {
    async fn token(&self) -> Result<String> {
        if let Some(token) = self.cached.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut slot = self.cached.write().await;
        // Another caller may have filled the slot while we waited.
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let token = self.source.fetch().await?;
        info!(source = self.source.name(), "access token obtained");
        *slot = Some(token.clone());
        Ok(token)
    }

    async fn invalidate(&self) {
        if self.cached.write().await.take().is_some() {
            debug!(source = self.source.name(), "cached access token dropped");
        }
    }
}

/// Mints tokens by running `gcloud auth print-access-token`.
#[derive(Debug, Clone)]
pub struct GcloudTokenSource {
    program: String,
    args: Vec<String>,
}

impl Default for GcloudTokenSource {
    fn default() -> Self {
        Self {
            program: "gcloud".into(),
            args: vec!["auth".into(), "print-access-token".into()],
        }
    }
}

impl GcloudTokenSource {
    /// Run a different command that prints a token on stdout.
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl TokenSource for GcloudTokenSource {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn fetch(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| OutcropError::Credential(format!("{}: {e}", self.program)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "token command wrote to stderr");
        }

        if !output.status.success() {
            return Err(OutcropError::Credential(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(OutcropError::Credential(format!(
                "{} printed no token",
                self.program
            )));
        }
        Ok(token)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// A fixed token, e.g. read once from the environment.
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl std::fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSource").finish_non_exhaustive()
    }
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        let token = std::env::var(var)
            .map_err(|e| OutcropError::Credential(format!("{var}: {e}")))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(OutcropError::Credential(format!("{var} is empty")));
        }
        Ok(Self::new(token))
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Hands out `token-1`, `token-2`, ... and counts fetches.
    struct CountingSource {
        fetches: Arc<AtomicU32>,
        fail: bool,
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn fetch(&self) -> Result<String> {
            if self.fail {
                return Err(OutcropError::Credential("not logged in".into()));
            }
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("token-{n}"))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting(fail: bool) -> (CachedCredentials<CountingSource>, Arc<AtomicU32>) {
        let fetches = Arc::new(AtomicU32::new(0));
        let source = CountingSource {
            fetches: fetches.clone(),
            fail,
        };
        (CachedCredentials::new(source), fetches)
    }

    #[tokio::test]
    async fn token_is_fetched_once() {
        let (creds, fetches) = counting(false);
        for _ in 0..5 {
            assert_eq!(creds.token().await.unwrap(), "token-1");
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (creds, fetches) = counting(false);
        assert_eq!(creds.token().await.unwrap(), "token-1");
        creds.invalidate().await;
        assert_eq!(creds.token().await.unwrap(), "token-2");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let (creds, _) = counting(true);
        let err = creds.token().await.unwrap_err();
        assert!(matches!(err, OutcropError::Credential(_)));
    }

    #[tokio::test]
    async fn command_output_is_trimmed() {
        let source = GcloudTokenSource::with_command("echo", vec!["  ya29.token  ".into()]);
        assert_eq!(source.fetch().await.unwrap(), "ya29.token");
    }

    #[tokio::test]
    async fn failing_command_is_credential_error() {
        let source = GcloudTokenSource::with_command("false", vec![]);
        assert!(matches!(
            source.fetch().await,
            Err(OutcropError::Credential(_))
        ));
    }

    #[tokio::test]
    async fn missing_command_is_credential_error() {
        let source = GcloudTokenSource::with_command("outcrop-no-such-token-tool", vec![]);
        assert!(matches!(
            source.fetch().await,
            Err(OutcropError::Credential(_))
        ));
    }

    #[tokio::test]
    async fn silent_command_is_credential_error() {
        let source = GcloudTokenSource::with_command("true", vec![]);
        assert!(matches!(
            source.fetch().await,
            Err(OutcropError::Credential(_))
        ));
    }

    #[test]
    fn unset_env_var_is_credential_error() {
        let err = StaticTokenSource::from_env("OUTCROP_TEST_TOKEN_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, OutcropError::Credential(_)));
    }
}
