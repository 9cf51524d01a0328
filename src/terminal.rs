//! Line-oriented terminal front end over [`CompletionRelay`].

use std::fmt;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::{CompletionFailure, CompletionResult};
use crate::relay::CompletionRelay;

const PROMPT_MARKER: &str = "You: ";

/// What the session does after an exchange ends in a relay failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Report the failure and read the next line.
    #[default]
    Continue,
    /// Report the failure and end the session with an error.
    Abort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Continue => write!(f, "continue"),
            FailurePolicy::Abort => write!(f, "abort"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session aborted after relay failure: {0}")]
    Aborted(CompletionFailure),
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub exchanges: usize,
    pub failures: usize,
    pub skipped_lines: usize,
}

pub struct TerminalSession {
    relay: CompletionRelay,
    policy: FailurePolicy,
    shutdown: Option<CancellationToken>,
}

impl TerminalSession {
    pub fn new(relay: CompletionRelay, policy: FailurePolicy) -> Self {
        Self {
            relay,
            policy,
            shutdown: None,
        }
    }

    /// Stop the session (and any in-flight call) once `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Run until `input` reaches EOF, the shutdown token fires, or an
    /// `Abort` policy meets a failure.
    ///
    /// Replies go to `output`; failures and skipped lines go to `diagnostics`.
    pub async fn run<R, W, E>(
        &self,
        mut input: R,
        output: &mut W,
        diagnostics: &mut E,
    ) -> Result<SessionSummary, TerminalError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let mut summary = SessionSummary::default();
        let mut buf = Vec::new();

        loop {
            output.write_all(PROMPT_MARKER.as_bytes()).await?;
            output.flush().await?;

            buf.clear();
            let read = match &self.shutdown {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    read = input.read_until(b'\n', &mut buf) => read?,
                },
                None => input.read_until(b'\n', &mut buf).await?,
            };
            if read == 0 {
                break;
            }

            let prompt = match std::str::from_utf8(&buf) {
                Ok(line) => strip_line_ending(line),
                Err(e) => {
                    warn!(error = %e, "skipping line that is not valid UTF-8");
                    summary.skipped_lines += 1;
                    diagnostics
                        .write_all(format!("skipped line: {e}\n").as_bytes())
                        .await?;
                    diagnostics.flush().await?;
                    continue;
                }
            };

            summary.exchanges += 1;
            let result = match &self.shutdown {
                Some(token) => self.relay.complete_with_cancellation(prompt, token).await,
                None => self.relay.complete(prompt).await,
            };

            match result {
                CompletionResult::Reply(text) => {
                    output.write_all(text.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                    output.flush().await?;
                }
                CompletionResult::Failure(failure) => {
                    summary.failures += 1;
                    diagnostics
                        .write_all(
                            format!("error [{}]: {}\n", failure.kind, failure.detail).as_bytes(),
                        )
                        .await?;
                    diagnostics.flush().await?;

                    if self.policy == FailurePolicy::Abort {
                        return Err(TerminalError::Aborted(failure));
                    }
                }
            }

            if self.shutdown.as_ref().is_some_and(|t| t.is_cancelled()) {
                break;
            }
        }

        info!(
            exchanges = summary.exchanges,
            failures = summary.failures,
            skipped = summary.skipped_lines,
            "terminal session ended"
        );
        Ok(summary)
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}
