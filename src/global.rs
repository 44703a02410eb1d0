//! Process-wide installation of a logger as the `tracing` default.

use crate::backend::Sink;
use crate::{Error, Level, Logger, Options, Result};

/// Build a logger from `options` and install its dispatcher as the global default.
///
/// Afterwards `tracing::info!` and friends reach the same sinks as the returned
/// logger. A non-empty `RUST_LOG` replaces the level filter of the global
/// dispatcher; the returned logger still applies `options.level` to its own calls.
///
/// # Errors
///
/// Returns an error if:
/// - the options do not produce any sink, or the log file cannot be opened
/// - `RUST_LOG` is not a valid filter directive
/// - a global default dispatcher is already installed
pub fn init_logging(options: Options) -> Result<Logger> {
    let log_spec = effective_log_spec(options.level);
    let backend = options.build_with(Sink::stdout(), &log_spec)?;

    tracing::dispatcher::set_global_default(backend.dispatch().clone())
        .map_err(|e| Error::Init(e.to_string()))?;

    Ok(Logger::from_backend(options, backend))
}

/// Determine the filter directive, letting `RUST_LOG` take precedence.
fn effective_log_spec(level: Level) -> String {
    log_spec_from(std::env::var("RUST_LOG").ok().as_deref(), level)
}

fn log_spec_from(rust_log: Option<&str>, level: Level) -> String {
    match rust_log {
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => level.as_filter().to_string(),
    }
}
