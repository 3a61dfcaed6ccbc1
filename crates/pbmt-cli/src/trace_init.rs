//! Log output for `pbmttool`. With the `trace` feature, decoder spans and
//! events of one subcommand go to their own JSON-lines file; without it,
//! [`init_tracing`] does nothing.

use std::io;
use std::path::{Path, PathBuf};

/// Overrides the default filter, e.g. `PBMT_LOG=pbmt_core::hypothesis=trace`.
pub const FILTER_ENV: &str = "PBMT_LOG";

/// Filter used when [`FILTER_ENV`] is unset. Verbose mode adds the
/// per-hypothesis `trace!` events of the session.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "pbmt_core=trace,pbmt_cli=debug"
    } else {
        "pbmt_core=debug,pbmt_cli=debug"
    }
}

/// Log file of one subcommand run: `<log_dir>/pbmt-<command>.jsonl`.
pub fn trace_file(log_dir: &Path, command: &str) -> PathBuf {
    log_dir.join(format!("pbmt-{command}.jsonl"))
}

/// Keeps the background writer alive; buffered lines are flushed on drop.
#[must_use]
#[derive(Default)]
pub struct TraceGuard {
    #[cfg(feature = "trace")]
    _writer: Option<tracing_appender::non_blocking::WorkerGuard>,
    path: Option<PathBuf>,
}

impl TraceGuard {
    /// File receiving the log, if this call installed the subscriber.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Create `log_dir` if needed and truncate the subcommand's log file.
///
/// If a global subscriber is already installed the call leaves it in place
/// and returns an empty guard.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path, command: &str, verbose: bool) -> io::Result<TraceGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir)?;
    let path = trace_file(log_dir, command);
    let file = std::fs::File::create(&path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let installed = tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(filter)
        .try_init()
        .is_ok();
    if !installed {
        return Ok(TraceGuard::default());
    }
    Ok(TraceGuard {
        _writer: Some(guard),
        path: Some(path),
    })
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path, _command: &str, _verbose: bool) -> io::Result<TraceGuard> {
    Ok(TraceGuard::default())
}
