//! Logging setup.
//!
//! Library code only emits `tracing` events and spans. Binaries and tests
//! that want output call [`init_tracing`] once at startup.

use crate::config::LoggingConfig;
use crate::errors::ConfigurationError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured level.
pub const LOG_ENV_VAR: &str = "RUST_LOG";

/// Parses a filter directive such as `info` or `ragflow=debug,warn`.
pub fn parse_filter(directives: &str) -> Result<EnvFilter, ConfigurationError> {
    EnvFilter::try_new(directives)
        .map_err(|err| ConfigurationError::invalid("logging.level", err.to_string()))
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Returns `false` if a
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, ConfigurationError> {
    let filter = match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => parse_filter(&directives)?,
        _ => parse_filter(&config.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        debug!(json = config.json, "Tracing initialized");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_accepts_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("ragflow=debug,warn").is_ok());
    }

    #[test]
    fn test_parse_filter_rejects_bad_level() {
        let err = parse_filter("ragflow=loud").unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config).unwrap());
    }
}
