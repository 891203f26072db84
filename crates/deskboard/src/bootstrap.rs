use std::path::{Path, PathBuf};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use desk_core::error::{DeskError, Result};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.deskboard/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.deskboard/`
/// - `~/.deskboard/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let board_dir = home.join(".deskboard");
    std::fs::create_dir_all(&board_dir)?;
    std::fs::create_dir_all(board_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive and
/// falls back to `"info"` if the level string is not recognised. Stderr always
/// receives the log; a file additionally receives it when `log_file` is given,
/// or at `~/.deskboard/logs/deskboard.log` when `debug` is set without an
/// explicit file.
pub fn setup_logging(
    log_level: &str,
    log_file: Option<&PathBuf>,
    debug: bool,
) -> anyhow::Result<()> {
    // Map the CLI level names to tracing directives (tracing uses lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" | "CRITICAL" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_target(false).with_thread_ids(false);

    let target = log_file.cloned().or_else(|| debug.then(default_log_path));
    let file_layer = match target {
        Some(path) => {
            let (dir, name) = split_log_path(&path);
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // The guard owns the writer thread; it must live for the whole
            // process.
            std::mem::forget(guard);
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Default log destination used by `--debug` when no `--log-file` is given.
fn default_log_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".deskboard").join("logs").join("deskboard.log")
}

/// Split a log file path into the (directory, file name) pair the appender
/// expects. A bare file name logs into the current directory.
fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("deskboard.log"));
    (dir, name)
}

// ── Data-directory resolution ──────────────────────────────────────────────────

/// Resolve the directory holding the two source CSV files.
///
/// An explicit `--data-dir` is passed through untouched so the pipeline can
/// report precise errors against it. Otherwise the first existing candidate
/// wins:
/// 1. `./data`
/// 2. `~/.deskboard/data`
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let local = PathBuf::from("data");
    if local.is_dir() {
        return Ok(local);
    }

    if let Some(home) = dirs::home_dir() {
        let fallback = home.join(".deskboard").join("data");
        if fallback.is_dir() {
            return Ok(fallback);
        }
    }

    Err(DeskError::DataPathNotFound(local))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
