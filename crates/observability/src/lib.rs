//! Tutor observability: `tracing` setup shared by the tutor crates.
//!
//! Log lines go to stderr (stdout carries the stdio display protocol). Spans
//! are exported over OTLP when an endpoint is configured.
//!
//! # Quick Start
//!
//! ```no_run
//! use tutor_observability::{init, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::new("tutor")
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .with_log_level("info");
//!
//! init(config)?;
//! tracing::info!("tutor started");
//! # Ok::<(), tutor_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` - Service name
//! - `OTEL_SERVICE_VERSION` - Service version
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint
//! - `TUTOR_LOG` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::{LogTarget, ObservabilityConfig};
pub use error::ObservabilityError;
pub use telemetry::{init, shutdown};
pub use tracing::{record_duration, record_error};
