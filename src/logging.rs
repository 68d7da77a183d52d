//! Tracing subscriber bootstrap.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! the embedding process's job. This helper covers binaries and tests
//! that want the standard setup without wiring layers by hand.
//! Initialization is idempotent: a second call is a no-op.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the tracing subscriber with JSON or pretty format.
///
/// `LOG_FORMAT=pretty` selects the human-readable layer; anything else
/// selects JSON. The filter comes from `RUST_LOG`, defaulting to
/// `claim_kernel=info`. Returns `false` when a subscriber was already
/// installed.
pub fn init_tracing() -> bool {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "claim_kernel=info".into());

    let result = if log_format == "pretty" {
        // Pretty format for local development
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        // JSON format for production (Cloud Logging compatible)
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .try_init()
    };

    result.is_ok()
}
