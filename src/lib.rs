//! Route bridge library.
//!
//! Two pieces shared by the HTTP-facing API and its worker process:
//! route-template matching (`routing`) and the name-routed request/response
//! protocol (`ipc`), plus the plumbing to serve it (`transport`).

pub mod config;
pub mod ipc;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod transport;

pub use config::BridgeConfig;
pub use ipc::{Dispatcher, HandlerRegistry, RequestEnvelope, ResponseEnvelope};
pub use lifecycle::Shutdown;
pub use routing::{compile, CompiledPattern, PatternPart, RouteTable};
