//! CLI parse tests.

use super::{Cli, CliCommand, RunArgs};
use clap::Parser;
use reattempt_core::config::RetryConfig;
use reattempt_core::retry::Backoff;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

fn parse_run(args: &[&str]) -> RunArgs {
    match parse(args) {
        CliCommand::Run(run) => run,
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_minimal() {
    let run = parse_run(&["reattempt", "run", "--", "curl", "-fsS", "https://example.com"]);
    assert_eq!(run.command, vec!["curl", "-fsS", "https://example.com"]);
    assert!(run.attempts.is_none());
    assert!(run.backoff.is_none());
    assert!(run.no_retry_exit.is_empty());
    assert!(!run.quiet);
}

#[test]
fn cli_parse_run_options() {
    let run = parse_run(&[
        "reattempt",
        "run",
        "--attempts",
        "5",
        "--delay-ms",
        "200",
        "--max-delay-ms",
        "5000",
        "--backoff",
        "exponential",
        "--timeout-secs",
        "60",
        "--attempt-timeout-secs",
        "10",
        "--no-retry-exit",
        "2",
        "--no-retry-exit",
        "64",
        "-q",
        "--",
        "make",
        "deploy",
    ]);
    assert_eq!(run.attempts, Some(5));
    assert_eq!(run.delay_ms, Some(200));
    assert_eq!(run.max_delay_ms, Some(5000));
    assert_eq!(run.backoff, Some(Backoff::Exponential));
    assert_eq!(run.timeout_secs, Some(60));
    assert_eq!(run.attempt_timeout_secs, Some(10));
    assert_eq!(run.no_retry_exit, vec![2, 64]);
    assert!(run.quiet);
    assert_eq!(run.command, vec!["make", "deploy"]);
}

#[test]
fn cli_parse_run_requires_program() {
    assert!(Cli::try_parse_from(["reattempt", "run"]).is_err());
}

#[test]
fn cli_parse_run_rejects_unknown_backoff() {
    assert!(Cli::try_parse_from(["reattempt", "run", "--backoff", "random", "--", "true"]).is_err());
}

#[test]
fn cli_parse_config() {
    match parse(&["reattempt", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn flags_override_config_file() {
    let file = RetryConfig {
        max_attempts: 4,
        base_delay_ms: 250,
        max_delay_ms: 30_000,
        backoff: Backoff::Linear,
    };
    let run = parse_run(&["reattempt", "run", "--attempts", "9", "--", "true"]);
    let merged = run.apply_to(&file);
    assert_eq!(merged.max_attempts, 9);
    assert_eq!(merged.base_delay_ms, 250);
    assert_eq!(merged.max_delay_ms, 30_000);
    assert_eq!(merged.backoff, Backoff::Linear);
}
