//! Name-routed request/response core.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     HandlerRegistry::new()
//!     → register(handler) for every route name
//!     → Dispatcher::new(registry)   (registry frozen from here on)
//!
//! Per request:
//!     RequestEnvelope { route, payload }
//!     → dispatcher.rs (route? payload? registered?)
//!     → handler.rs (run(payload), async)
//!     → sanitize.rs (success values only)
//!     → ResponseEnvelope { success, message }
//! ```
//!
//! # Design Decisions
//! - No global registry: it is built and passed in explicitly
//! - Error literals (`UNKNOWN_ROUTE`, `MISSING_PAYLOAD`) are part of the wire contract
//! - Failure values skip sanitization, so they are not size-bounded

pub mod builtin;
pub mod dispatcher;
pub mod envelope;
pub mod handler;
pub mod registry;
pub mod sanitize;

pub use dispatcher::{DispatchError, Dispatcher};
pub use envelope::{RequestEnvelope, ResponseEnvelope, MISSING_PAYLOAD, UNKNOWN_ROUTE};
pub use handler::{handler_fn, FnHandler, Handler, HandlerFailure, HandlerOutput, HandlerResult};
pub use registry::HandlerRegistry;
pub use sanitize::{render, sanitize};
