//! Logging setup.
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
//! Set `LOG_FORMAT=json` for one JSON object per event.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Builder for the process-wide subscriber.
#[derive(Debug, Clone)]
pub struct Telemetry {
    name: &'static str,
    version: &'static str,
    format: LogFormat,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            name: "aggregator-funding",
            version: "unknown",
            format: LogFormat::from_env(),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_version(mut self, version: &'static str) -> Self {
        self.version = version;
        self
    }

    /// Install the subscriber. Later calls (e.g. from tests) are no-ops.
    pub fn register(self) -> Self {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
        let installed = match self.format {
            LogFormat::Json => builder.json().try_init().is_ok(),
            LogFormat::Text => builder.try_init().is_ok(),
        };
        if installed {
            tracing::debug!(service = self.name, version = self.version, "telemetry registered");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_is_harmless() {
        let first = Telemetry::new().register();
        let second = first.clone().with_name("other").register();
        assert_eq!(second.name, "other");
    }
}
