//! ## netvakt-telemetry::logging
//! **Structured logging with tracing and OpenTelemetry key/values**

use netvakt_config::TelemetryConfig;
use opentelemetry::KeyValue;
use tracing::{info_span, Instrument};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` overrides the configured level.
    ///
    /// Returns `false` when a subscriber was already installed, which keeps
    /// repeated calls from tests and embedding applications harmless.
    pub fn init(config: &TelemetryConfig) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

        let builder = fmt()
            .with_env_filter(filter)
            .with_thread_names(config.thread_names)
            .with_span_events(FmtSpan::NONE);

        let installed = if config.log_format == "pretty" {
            builder.pretty().try_init()
        } else {
            builder.compact().try_init()
        };
        installed.is_ok()
    }

    /// Emits one security event inside its own span.
    pub async fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "security_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );

        async {
            tracing::info!(
                metadata = ?metadata,
                "Security event occurred"
            );
        }
        .instrument(span)
        .await
    }
}
