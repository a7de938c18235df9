//! CLI for reattempt: run a program until it succeeds, with retries.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use reattempt_core::config::{self, RetryConfig};
use reattempt_core::retry::Backoff;

use commands::{run_command, run_show_config};

/// Top-level CLI for reattempt.
#[derive(Debug, Parser)]
#[command(name = "reattempt")]
#[command(about = "Run a program, retrying it with backoff until it succeeds", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a program under the retry policy; its stdout is printed once it succeeds.
    Run(RunArgs),

    /// Show the config file path and the effective retry settings.
    Config,
}

/// Options for `reattempt run`. Unset options fall back to the config file.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Total number of attempts, including the first.
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,
    /// Base delay between attempts, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,
    /// Upper bound on the delay, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub max_delay_ms: Option<u64>,
    /// Delay strategy: fixed, exponential or linear.
    #[arg(long)]
    pub backoff: Option<Backoff>,
    /// Give up once this many seconds have passed (checked before each attempt).
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
    /// Kill an attempt that runs longer than this; the attempt counts as a timeout.
    #[arg(long, value_name = "SECS")]
    pub attempt_timeout_secs: Option<u64>,
    /// Exit code that must not be retried. Repeatable.
    #[arg(long = "no-retry-exit", value_name = "CODE")]
    pub no_retry_exit: Vec<i32>,
    /// Do not print retry progress to stderr (it still goes to the log file).
    #[arg(long, short)]
    pub quiet: bool,
    /// Program to run, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true, value_name = "PROGRAM")]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Command-line flags layered over the config file values.
    pub fn apply_to(&self, cfg: &RetryConfig) -> RetryConfig {
        RetryConfig {
            max_attempts: self.attempts.unwrap_or(cfg.max_attempts),
            base_delay_ms: self.delay_ms.unwrap_or(cfg.base_delay_ms),
            max_delay_ms: self.max_delay_ms.unwrap_or(cfg.max_delay_ms),
            backoff: self.backoff.unwrap_or(cfg.backoff),
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run(args) => run_command(&cfg, &args).await?,
            CliCommand::Config => run_show_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
