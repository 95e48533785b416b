//! Telemetry for GuardianAI
//!
//! JSON structured logging and the per-request trace context that ties a
//! run's log events to the report it returns.

use std::fmt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Per-request correlation identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceContext {
    trace_id: String,
}

impl TraceContext {
    /// Fresh random trace id
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Reuse an id assigned upstream (e.g. by a gateway)
    pub fn from_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Span carrying the trace and user ids; everything logged inside it
    /// is tagged with both.
    pub fn span(&self, user_id: &str) -> tracing::Span {
        tracing::info_span!("compliance_run", trace_id = %self.trace_id, user_id = %user_id)
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trace_id)
    }
}

/// Install the global JSON subscriber
///
/// `RUST_LOG` wins over `default_level`. Calling this twice is harmless; the
/// second install is ignored.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
