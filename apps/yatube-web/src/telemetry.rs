//! Log subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "yatube-web";

/// Used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,yatube_web=debug,yatube_core=debug,yatube_infra=debug";

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// One JSON object per line instead of the human-readable format.
    pub json_logs: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            service_name: SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// `LOG_FORMAT=json` switches to JSON output; `SERVICE_NAME` tags the
    /// startup line.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("LOG_FORMAT").ok().as_deref(),
            std::env::var("SERVICE_NAME").ok(),
        )
    }

    fn from_vars(log_format: Option<&str>, service_name: Option<String>) -> Self {
        Self {
            json_logs: log_format.is_some_and(|v| v.eq_ignore_ascii_case("json")),
            service_name: service_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| SERVICE_NAME.to_string()),
        }
    }
}

pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Exactly one of the two formatting layers is present.
    let json = config.json_logs.then(|| fmt::layer().json());
    let pretty = (!config.json_logs).then(|| fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(pretty)
        .init();

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = TelemetryConfig::from_vars(None, None);
        assert!(!config.json_logs);
        assert_eq!(config.service_name, "yatube-web");
    }

    #[test]
    fn test_from_vars_json_and_name() {
        let config = TelemetryConfig::from_vars(Some("JSON"), Some("blog".into()));
        assert!(config.json_logs);
        assert_eq!(config.service_name, "blog");

        let config = TelemetryConfig::from_vars(Some("pretty"), Some("  ".into()));
        assert!(!config.json_logs);
        assert_eq!(config.service_name, "yatube-web");
    }
}
