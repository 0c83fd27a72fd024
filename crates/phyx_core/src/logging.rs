//! Rolling file logging for the hosting application.
//!
//! # Responsibility
//! - Start the `flexi_logger` file backend once per process.
//! - Keep store diagnostics metadata-only (`event=... module=... status=...`).
//!
//! # Invariants
//! - Re-initializing with the same level and directory is a no-op.
//! - Re-initializing with a different level or directory is rejected.
//! - Initialization never panics; failures are returned as messages.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "phyx";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

/// Validated logging parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: &'static str,
    pub log_dir: PathBuf,
}

impl LogSettings {
    /// Validates a level name (`trace|debug|info|warn|error`, any case) and
    /// an absolute log directory.
    pub fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" => "error",
            other => {
                return Err(format!(
                    "unsupported log level `{other}`; expected trace|debug|info|warn|error"
                ))
            }
        };

        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        let log_dir = Path::new(trimmed);
        if !log_dir.is_absolute() {
            return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
        }

        Ok(Self {
            level,
            log_dir: log_dir.to_path_buf(),
        })
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging, or confirms it is already running with the same
/// settings.
///
/// # Errors
/// - Unsupported level, empty or relative directory.
/// - Directory creation or logger backend failure.
/// - A logger is already active with different settings.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(&requested))?;

    if active.settings != requested {
        return Err(format!(
            "logging already initialized with level `{}` at `{}`; refusing to switch to level `{}` at `{}`",
            active.settings.level,
            active.settings.log_dir.display(),
            requested.level,
            requested.log_dir.display()
        ));
    }
    Ok(())
}

/// Active settings, or `None` before `init_logging` succeeded.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE_LOGGER.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            settings.log_dir.display()
        )
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", settings.level))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=logging_init module=core status=ok level={} version={}",
        settings.level,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, LogSettings};

    #[test]
    fn parse_normalizes_level_names() {
        let settings = LogSettings::parse(" WARNING ", "/tmp/phyx-logs").expect("valid settings");
        assert_eq!(settings.level, "warn");
    }

    #[test]
    fn parse_rejects_relative_and_empty_dirs() {
        let relative = LogSettings::parse("info", "logs/dev").expect_err("relative dir");
        assert!(relative.contains("absolute"));
        let empty = LogSettings::parse("info", "  ").expect_err("empty dir");
        assert!(empty.contains("empty"));
    }

    #[test]
    fn parse_rejects_unknown_level() {
        let err = LogSettings::parse("verbose", "/tmp/phyx-logs").expect_err("unknown level");
        assert!(err.contains("unsupported log level"));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dir_str = dir.path().to_str().expect("utf-8 temp dir").to_string();

        init_logging("info", &dir_str).expect("first init");
        init_logging("INFO", &dir_str).expect("same config is idempotent");

        let level_err = init_logging("debug", &dir_str).expect_err("level conflict");
        assert!(level_err.contains("refusing to switch"));

        let other_dir = tempfile::tempdir().expect("second temp dir");
        let other_str = other_dir.path().to_str().expect("utf-8 temp dir");
        let dir_err = init_logging("info", other_str).expect_err("dir conflict");
        assert!(dir_err.contains("refusing to switch"));

        let active = logging_status().expect("logging active");
        assert_eq!(active.level, "info");
        assert_eq!(active.log_dir, dir.path());
    }
}
