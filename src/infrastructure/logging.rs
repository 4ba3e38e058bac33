use std::io;

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::LoggingConfig, infrastructure::directories::ResolvedPaths};

const LOG_FILE_PREFIX: &str = "link-guard.log";
const FALLBACK_LEVEL: &str = "info";

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Where the active filter directives came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    RustLog,
    LogLevel,
    Fallback,
}

/// `RUST_LOG` wins when set and valid, then `LOG_LEVEL`, then `info`.
pub fn build_filter(rust_log: Option<&str>, log_level: &str) -> (EnvFilter, FilterSource) {
    if let Some(filter) = rust_log
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
    {
        return (filter, FilterSource::RustLog);
    }
    match EnvFilter::try_new(log_level.trim()) {
        Ok(filter) if !log_level.trim().is_empty() => (filter, FilterSource::LogLevel),
        _ => (EnvFilter::new(FALLBACK_LEVEL), FilterSource::Fallback),
    }
}

pub fn init_tracing(config: &LoggingConfig, paths: &ResolvedPaths) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let (env_filter, source) = build_filter(rust_log.as_deref(), &config.level);

        let file_appender = tracing_appender::rolling::daily(&paths.logs_dir, LOG_FILE_PREFIX);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(io::stdout)
                    .with_target(true)
                    .with_ansi(true),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_ansi(false),
            )
            .try_init()?;

        if source == FilterSource::Fallback {
            tracing::warn!(
                target: "lifecycle",
                level = %config.level,
                "LOG_LEVEL is not a valid filter; using info"
            );
        }
        tracing::info!(
            target: "lifecycle",
            logs = %paths.logs_dir.display(),
            filter = ?source,
            "tracing initialized"
        );
        Ok(())
    })?;
    Ok(())
}
