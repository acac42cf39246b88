/*!
 * Structured Tracing
 * Subscriber setup and operation spans using the tracing crate
 *
 * Features:
 * - EnvFilter driven by RUST_LOG with a caller-supplied default
 * - JSON-formatted logs for structured parsing
 * - Timed spans around shell operations
 */

use std::time::Instant;
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable switching log output to JSON
pub const TRACE_JSON_ENV: &str = "SIM_TRACE_JSON";

/// Operations slower than this are logged at warn
const SLOW_OPERATION_MS: u128 = 100;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: `default_directive`)
/// - SIM_TRACE_JSON: Enable JSON output (default: false)
///
/// Logs go to stderr so shell output on stdout stays clean. Calling this
/// twice is harmless; the second call is ignored.
pub fn init_tracing(default_directive: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if use_json {
        // JSON output for parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        // Human-readable output
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!(json = use_json, "Structured tracing initialized");
    }
}

/// Span for operation tracing with structured fields
pub struct OperationSpan {
    span: tracing::Span,
    start: Instant,
    operation: String,
}

impl OperationSpan {
    pub fn new(operation: &str) -> Self {
        let span = span!(
            Level::DEBUG,
            "operation",
            operation = operation,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    /// Record the operation result
    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }

    /// Record an error
    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    /// Underlying span, for instrumenting futures
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration.as_millis() > SLOW_OPERATION_MS {
            warn!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow operation detected"
            );
        } else {
            debug!(
                operation = %self.operation,
                duration_us = duration.as_micros() as u64,
                "operation completed"
            );
        }
    }
}

/// Helper to create an operation span
#[inline]
pub fn span_operation(name: &str) -> OperationSpan {
    OperationSpan::new(name)
}
