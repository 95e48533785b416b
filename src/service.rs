//! Request-level entry point
//!
//! Wraps the pipeline the way a request handler would: assigns the trace id,
//! logs the outcome, and converts failures into caller-safe messages that
//! carry only the trace id.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, Instrument};

use crate::errors::PipelineError;
use crate::rag::CompliancePipeline;
use crate::telemetry::TraceContext;
use crate::types::{ComplianceQuery, ComplianceReport};

/// What the caller sees when a check fails
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceFailure {
    /// The request itself was malformed
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String, trace_id: String },

    /// Anything else; details stay in the logs
    #[error("Internal processing error. Trace ID: {trace_id}")]
    Internal { trace_id: String },
}

impl ServiceFailure {
    pub fn trace_id(&self) -> &str {
        match self {
            ServiceFailure::InvalidRequest { trace_id, .. } => trace_id,
            ServiceFailure::Internal { trace_id } => trace_id,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceFailure::InvalidRequest { .. })
    }
}

/// Compliance checking service shared by all requests
#[derive(Clone)]
pub struct ComplianceService {
    pipeline: Arc<CompliancePipeline>,
    deadline: Option<Duration>,
}

impl ComplianceService {
    pub fn new(pipeline: Arc<CompliancePipeline>) -> Self {
        Self {
            pipeline,
            deadline: None,
        }
    }

    /// Bound every request by `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Check one query under a freshly generated trace id
    pub async fn check_compliance(&self, query: ComplianceQuery) -> Result<ComplianceReport, ServiceFailure> {
        self.check_compliance_traced(query, TraceContext::new()).await
    }

    /// Check one query under a trace id assigned by the caller
    pub async fn check_compliance_traced(
        &self,
        query: ComplianceQuery,
        trace: TraceContext,
    ) -> Result<ComplianceReport, ServiceFailure> {
        let span = tracing::info_span!(
            "compliance_request",
            trace_id = %trace.trace_id(),
            user_id = %query.user_id
        );
        async {
            info!("compliance_check_initiated");

            let outcome = match self.deadline {
                Some(deadline) => self.pipeline.run_with_deadline(&query, &trace, deadline).await,
                None => self.pipeline.run(&query, &trace).await,
            };

            match outcome {
                Ok(report) => {
                    info!("compliance_check_successful");
                    Ok(report)
                }
                Err(PipelineError::Validation(message)) => {
                    info!(reason = %message, "compliance_check_rejected");
                    Err(ServiceFailure::InvalidRequest {
                        message,
                        trace_id: trace.trace_id().to_string(),
                    })
                }
                Err(err) => {
                    error!(
                        error = %err,
                        stage = err.stage().map(|s| s.as_str()).unwrap_or("none"),
                        "pipeline_execution_failed"
                    );
                    Err(ServiceFailure::Internal {
                        trace_id: trace.trace_id().to_string(),
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}
