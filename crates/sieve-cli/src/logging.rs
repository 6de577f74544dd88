//! Tracing subscriber setup.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Crates whose events the CLI shows.
const TARGETS: [&str; 4] = ["sieve_cli", "sieve_config", "sieve_query", "sieve_discovery"];

/// Resolve the effective level: `--log-level`, then `--verbose`, then the
/// config value. Unparseable config values fall back to `warn`.
pub fn resolve_level(cli_level: Option<LogLevel>, verbose: bool, config_level: &str) -> LevelFilter {
    if let Some(level) = cli_level {
        return level.into();
    }
    if verbose {
        return LevelFilter::DEBUG;
    }
    config_level.parse().unwrap_or(LevelFilter::WARN)
}

/// Filter directive scoping `level` to the sieve crates.
pub fn directive(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` takes
/// precedence over everything else when set.
pub fn init(cli_level: Option<LogLevel>, verbose: bool, config_level: &str) {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(value) if !value.is_empty() => EnvFilter::new(value),
        _ => EnvFilter::new(directive(resolve_level(cli_level, verbose, config_level))),
    };

    // A subscriber may already be installed (e.g. under test harnesses).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
