// Logging - tracing-subscriber setup shared by binaries and tests

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Build the filter from the configured level with the driver kept quiet.
/// `RUST_LOG` overrides everything when present.
pub fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directives = format!("{},sqlx=warn", level);
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", directives, e))
}

/// Install the global fmt subscriber. Calling this again after a subscriber
/// is already set is a no-op.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_env_filter(&config.level)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }
}
