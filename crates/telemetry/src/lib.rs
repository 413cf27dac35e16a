//! Tracing subscriber bootstrap.

use anyhow::anyhow;
use shelfcheck_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Build the log filter: `RUST_LOG` wins over the configured directive.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_filter)
            .map_err(|e| anyhow!("invalid log filter '{}': {}", settings.log_filter, e)),
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// Calling this more than once is harmless; later calls keep the
/// subscriber installed first.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;

    let installed = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            target: "shelfcheck-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let settings = TelemetrySettings {
            log_filter: "shelfcheck=notalevel".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(env_filter(&settings).is_err());
    }

    #[test]
    fn init_twice_is_ok() {
        let settings = TelemetrySettings::default();
        init(&settings).unwrap();
        init(&settings).unwrap();
    }
}
