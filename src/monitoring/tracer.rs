/*!
 * Structured Tracing
 * Subscriber setup and per-primitive spans using the tracing crate
 *
 * Features:
 * - Trace ID generation for correlating a primitive call with its logs
 * - JSON-formatted logs for structured parsing
 * - Spans that follow a primitive call across await points
 */

use crate::core::config::RuntimeConfig;
use std::time::Instant;
use tracing::{debug, info, span, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured tracing
///
/// RUST_LOG takes precedence over the configured filter.
pub fn init_tracing(config: &RuntimeConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.trace_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique trace ID for call correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one primitive invocation
pub struct PrimitiveSpan {
    span: Span,
    start: Instant,
    primitive: String,
    trace_id: String,
}

impl PrimitiveSpan {
    pub fn new(primitive: &str, scope: &str, args_count: usize) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "primitive",
            trace_id = %trace_id,
            primitive = primitive,
            scope = scope,
            args_count = args_count,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            primitive: primitive.to_string(),
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// The span to instrument the primitive's future with
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_result(&self, success: bool) {
        self.span.record("result", if success { "success" } else { "error" });
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }
}

impl Drop for PrimitiveSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);

        let _entered = self.span.enter();
        debug!(
            trace_id = %self.trace_id,
            primitive = %self.primitive,
            duration_us = duration.as_micros() as u64,
            "primitive completed"
        );
    }
}
