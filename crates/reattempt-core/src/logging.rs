//! Retry log sinks, and tracing init: file under XDG state dir, or graceful fallback to stderr.

use anyhow::Result;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Sink for the executor's progress messages (printf-style).
///
/// Sinks must not fail: write errors are dropped inside the sink.
pub trait Logger: Send + Sync + fmt::Debug {
    fn log(&self, args: fmt::Arguments<'_>);
}

/// Discards everything. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn log(&self, _args: fmt::Arguments<'_>) {}
}

/// Forwards messages to `tracing` at info level under the `reattempt` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "reattempt", "{}", args);
    }
}

/// Writes one line per message, with an optional prefix.
#[derive(Debug)]
pub struct WriterLogger<W> {
    prefix: String,
    out: Mutex<W>,
}

impl<W: Write> WriterLogger<W> {
    pub fn new(out: W) -> Self {
        Self::with_prefix(out, "")
    }

    pub fn with_prefix(out: W, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send + fmt::Debug> Logger for WriterLogger<W> {
    fn log(&self, args: fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{}{}", self.prefix, args);
    }
}

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,reattempt=debug"))
}

/// Initialize structured logging to `~/.local/state/reattempt/reattempt.log`.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("reattempt")?;
    let log_dir = xdg_dirs.get_state_home();

    fs::create_dir_all(&log_dir)?;
    let log_file_path: PathBuf = log_dir.join("reattempt.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    struct FileMakeWriter(std::fs::File);

    impl<'a> MakeWriter<'a> for FileMakeWriter {
        type Writer = FileOrStderr;

        fn make_writer(&'a self) -> Self::Writer {
            self.0
                .try_clone()
                .map(FileOrStderr::File)
                .unwrap_or(FileOrStderr::Stderr)
        }
    }

    let writer: BoxMakeWriter = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::debug!("reattempt logging initialized at {}", log_file_path.display());

    Ok(log_file_path)
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_logger_writes_lines() {
        let logger = WriterLogger::with_prefix(Vec::new(), "[retry] ");
        logger.log(format_args!("Attempt {} failed: {}", 1, "boom"));
        logger.log(format_args!("done"));
        let out = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(out, "[retry] Attempt 1 failed: boom\n[retry] done\n");
    }

    #[test]
    fn nop_logger_accepts_anything() {
        NopLogger.log(format_args!("{} {:?}", 1, "x"));
    }
}
