//! Handler contract for name-routed requests.
//!
//! # Responsibilities
//! - Define the single async operation every handler exposes
//! - Model the values a handler may produce (`HandlerOutput`)
//! - Carry the raw failure value back to the dispatcher (`HandlerFailure`)
//!
//! # Design Decisions
//! - Handlers are trait objects keyed by name, not an enum of known routes
//! - `run` returns a boxed future so handlers stay object-safe
//! - Failures carry a JSON value, forwarded to the caller verbatim

use std::future::Future;

use futures_util::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

/// Outcome of one handler invocation.
pub type HandlerResult = Result<HandlerOutput, HandlerFailure>;

/// A value produced by a successful handler run.
///
/// JSON alone cannot express "no value" or "a function", so both are kept
/// as explicit variants and rendered by the sanitizer.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// The handler finished without producing a value.
    Undefined,
    /// A callable, represented by its source text.
    Callable(String),
    /// Any JSON value.
    Value(Value),
}

impl HandlerOutput {
    pub fn callable(source: impl Into<String>) -> Self {
        HandlerOutput::Callable(source.into())
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        HandlerOutput::Value(value)
    }
}

impl From<()> for HandlerOutput {
    fn from(_: ()) -> Self {
        HandlerOutput::Undefined
    }
}

impl From<&str> for HandlerOutput {
    fn from(value: &str) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

impl From<String> for HandlerOutput {
    fn from(value: String) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

impl From<i32> for HandlerOutput {
    fn from(value: i32) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

impl From<u64> for HandlerOutput {
    fn from(value: u64) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

impl From<i64> for HandlerOutput {
    fn from(value: i64) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

impl From<f64> for HandlerOutput {
    fn from(value: f64) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

impl From<bool> for HandlerOutput {
    fn from(value: bool) -> Self {
        HandlerOutput::Value(Value::from(value))
    }
}

/// The raw reason a handler failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("handler failed: {0}")]
pub struct HandlerFailure(pub Value);

impl HandlerFailure {
    pub fn new(reason: impl Into<Value>) -> Self {
        Self(reason.into())
    }

    /// Use an error's display text as the failure value.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self(Value::String(err.to_string()))
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for HandlerFailure {
    fn from(reason: Value) -> Self {
        Self(reason)
    }
}

impl From<&str> for HandlerFailure {
    fn from(reason: &str) -> Self {
        Self(Value::from(reason))
    }
}

impl From<String> for HandlerFailure {
    fn from(reason: String) -> Self {
        Self(Value::from(reason))
    }
}

/// A named unit of work invoked by route name.
pub trait Handler: Send + Sync {
    /// Route name this handler is registered under.
    fn name(&self) -> &str;

    /// Run once for one request payload.
    fn run(&self, payload: Value) -> BoxFuture<'_, HandlerResult>;
}

/// Handler backed by an async closure. Built with [`handler_fn`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, payload: Value) -> BoxFuture<'_, HandlerResult> {
        Box::pin((self.f)(payload))
    }
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

/// Build a handler from a name and an async closure.
///
/// ```
/// use route_bridge::ipc::{handler_fn, Handler, HandlerOutput, HandlerResult};
///
/// let ping = handler_fn("ping", |_payload| async {
///     HandlerResult::Ok(HandlerOutput::from(42))
/// });
/// assert_eq!(ping.name(), "ping");
/// ```
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    FnHandler {
        name: name.into(),
        f,
    }
}
