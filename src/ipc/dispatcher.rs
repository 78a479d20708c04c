//! Request dispatch.
//!
//! # Responsibilities
//! - Validate a request envelope (route, then payload)
//! - Resolve the route through the registry and run the handler
//! - Build the response envelope for every outcome
//!
//! # Design Decisions
//! - `dispatch` never fails: every error becomes `{ success: false, ... }`
//! - Success values are sanitized; failure values are forwarded verbatim
//! - Only a missing or `null` payload is `MISSING_PAYLOAD`; `0`, `""` and
//!   `false` are ordinary payloads and reach the handler
//! - A panicking handler is reported as a handler failure
//! - No timeout and no cancellation: a handler that never finishes leaves
//!   its dispatch pending

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::Value;
use thiserror::Error;

use crate::ipc::envelope::{RequestEnvelope, ResponseEnvelope, MISSING_PAYLOAD, UNKNOWN_ROUTE};
use crate::ipc::handler::{HandlerFailure, HandlerResult};
use crate::ipc::registry::HandlerRegistry;
use crate::ipc::sanitize::sanitize;
use crate::observability::metrics;

/// Why a dispatch did not succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// No route given, or nothing registered under it.
    #[error("UNKNOWN_ROUTE")]
    UnknownRoute,

    /// Route given without a payload.
    #[error("MISSING_PAYLOAD")]
    MissingPayload,

    /// The handler ran and failed.
    #[error(transparent)]
    HandlerFailure(#[from] HandlerFailure),
}

impl DispatchError {
    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::UnknownRoute => "unknown_route",
            DispatchError::MissingPayload => "missing_payload",
            DispatchError::HandlerFailure(_) => "handler_failure",
        }
    }

    /// The envelope `message` for this error.
    pub fn into_message(self) -> Value {
        match self {
            DispatchError::UnknownRoute => Value::from(UNKNOWN_ROUTE),
            DispatchError::MissingPayload => Value::from(MISSING_PAYLOAD),
            DispatchError::HandlerFailure(failure) => failure.into_value(),
        }
    }
}

impl From<DispatchError> for ResponseEnvelope {
    fn from(err: DispatchError) -> Self {
        ResponseEnvelope::err(err.into_message())
    }
}

/// Routes request envelopes to registered handlers.
///
/// Owns the registry, so handlers can no longer be added once serving starts.
/// Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    metrics_enabled: bool,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        tracing::info!(routes = ?registry.names(), "Dispatcher ready");
        Self {
            registry: Arc::new(registry),
            metrics_enabled: true,
        }
    }

    /// Turn dispatch metrics on or off.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Handle one request envelope.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> ResponseEnvelope {
        let start = Instant::now();
        let route = envelope.route.clone().unwrap_or_default();

        let result = self.try_dispatch(envelope).await;
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.outcome(),
        };
        match &result {
            Err(DispatchError::HandlerFailure(failure)) => {
                tracing::warn!(route = %route, reason = %failure.0, "Handler failed");
            }
            _ => {
                tracing::debug!(route = %route, outcome, elapsed_ms = elapsed.as_millis() as u64, "Dispatch complete");
            }
        }
        if self.metrics_enabled {
            metrics::record_dispatch(outcome, elapsed);
        }

        match result {
            Ok(message) => ResponseEnvelope::ok(message),
            Err(err) => err.into(),
        }
    }

    /// Validate, resolve and run, returning the sanitized success value.
    pub async fn try_dispatch(&self, envelope: RequestEnvelope) -> Result<Value, DispatchError> {
        let route = match envelope.route {
            Some(route) if !route.is_empty() => route,
            _ => return Err(DispatchError::UnknownRoute),
        };
        let payload = envelope
            .payload
            .filter(|payload| !payload.is_null())
            .ok_or(DispatchError::MissingPayload)?;
        let handler = self
            .registry
            .lookup(&route)
            .ok_or(DispatchError::UnknownRoute)?;

        let run = AssertUnwindSafe(async move { handler.run(payload).await });
        let result: HandlerResult = match run.catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                tracing::error!(route = %route, "Handler panicked");
                Err(HandlerFailure::new(panic_message(panic.as_ref())))
            }
        };

        Ok(sanitize(result?))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
