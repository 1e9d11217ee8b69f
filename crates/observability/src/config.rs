//! Configuration for logging and trace export

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVICE_NAME: &str = "tutor";

/// Where formatted log lines go.
///
/// The stdio display surface owns stdout, so logs default to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stderr,
    Off,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Service name attached to exported spans
    #[serde(default = "default_service_name")]
    pub service_name: String,

    pub service_version: Option<String>,

    /// OTLP endpoint for trace export (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,

    #[serde(default)]
    pub log_target: LogTarget,

    /// Log level filter (e.g., "info", "tutor_runtime=debug").
    /// Falls back to `RUST_LOG`, then "warn".
    pub log_level: Option<String>,

    /// Emit ANSI colors in log lines
    #[serde(default)]
    pub ansi: bool,

    #[serde(default)]
    pub resource_attributes: Vec<(String, String)>,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: None,
            otlp_endpoint: None,
            log_target: LogTarget::default(),
            log_level: None,
            ansi: false,
            resource_attributes: Vec::new(),
        }
    }
}

impl ObservabilityConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = Some(version.into());
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_log_target(mut self, target: LogTarget) -> Self {
        self.log_target = target;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `OTEL_SERVICE_NAME` → service_name
    /// - `OTEL_SERVICE_VERSION` → service_version
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `TUTOR_LOG` or `RUST_LOG` → log_level
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            service_name: non_empty("OTEL_SERVICE_NAME").unwrap_or_else(default_service_name),
            service_version: non_empty("OTEL_SERVICE_VERSION"),
            // Only export when explicitly configured; avoids connection-refused noise.
            otlp_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            log_target: LogTarget::Stderr,
            log_level: non_empty("TUTOR_LOG").or_else(|| non_empty("RUST_LOG")),
            ansi: false,
            resource_attributes: Vec::new(),
        }
    }
}
