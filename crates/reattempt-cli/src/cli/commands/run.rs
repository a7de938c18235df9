//! `reattempt run -- <program> [args]` – run a program until it exits 0.

use anyhow::{Context, Result};
use reattempt_core::config::RetryConfig;
use reattempt_core::control::CancelToken;
use reattempt_core::logging::{Logger, TracingLogger, WriterLogger};
use reattempt_core::retry::{non_retryable, BoxError, RetryPolicy};
use std::io::{self, Cursor, Write};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

use crate::cli::RunArgs;

/// A finished attempt that did not exit successfully.
#[derive(Debug, thiserror::Error)]
#[error("`{program}` exited with {status}")]
pub struct ExitFailure {
    pub program: String,
    pub status: ExitStatus,
}

pub async fn run_command(cfg: &RetryConfig, args: &RunArgs) -> Result<()> {
    let cfg = args.apply_to(cfg);
    let logger: Arc<dyn Logger> = if args.quiet {
        Arc::new(TracingLogger)
    } else {
        Arc::new(WriterLogger::with_prefix(io::stderr(), "reattempt: "))
    };
    let policy = cfg.to_builder().shared_logger(logger).build()?;

    let token = match args.timeout_secs {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };
    spawn_ctrl_c(token.clone());

    tracing::info!(
        "running {:?} with up to {} attempt(s)",
        args.command,
        policy.max_attempts()
    );
    let mut body = retry_program(&policy, &token, args).await?;

    let mut stdout = io::stdout().lock();
    io::copy(&mut body, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Run the program from `args` under `policy`. The returned error keeps the
/// typed [`RetryError`](reattempt_core::retry::RetryError) and its causes.
pub(crate) async fn retry_program(
    policy: &RetryPolicy,
    token: &CancelToken,
    args: &RunArgs,
) -> Result<Cursor<Vec<u8>>> {
    let (program, rest) = args
        .command
        .split_first()
        .context("no program given")?;
    let attempt_timeout = args.attempt_timeout_secs.map(Duration::from_secs);

    let body = policy
        .run_async(token, || {
            run_once(program, rest, attempt_timeout, &args.no_retry_exit)
        })
        .await?;
    Ok(body)
}

/// Cancel `token` on the first Ctrl-C. Takes effect before the next attempt.
fn spawn_ctrl_c(token: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling retries");
            token.cancel();
        }
    });
}

/// One attempt: spawn the program, wait (bounded by `timeout`), and hand back
/// its stdout. Child stderr is passed through as-is.
pub(crate) async fn run_once(
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
    no_retry_exit: &[i32],
) -> Result<Cursor<Vec<u8>>, BoxError> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

    let output = match timeout {
        Some(t) => tokio::time::timeout(t, cmd.output()).await?,
        None => cmd.output().await,
    };
    let output = output.map_err(|e| spawn_error(program, e))?;

    let _ = io::stderr().write_all(&output.stderr);
    if output.status.success() {
        return Ok(Cursor::new(output.stdout));
    }

    let failure = ExitFailure {
        program: program.to_string(),
        status: output.status,
    };
    match output.status.code() {
        Some(code) if no_retry_exit.contains(&code) => Err(non_retryable(failure)),
        _ => Err(failure.into()),
    }
}

/// A program that is missing or not executable will not appear on retry.
fn spawn_error(program: &str, err: io::Error) -> BoxError {
    let err = io::Error::new(err.kind(), format!("spawn `{program}`: {err}"));
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => non_retryable(err),
        _ => err.into(),
    }
}
