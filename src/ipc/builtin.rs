//! Handlers every worker registers.

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::ipc::handler::{Handler, HandlerOutput, HandlerResult};
use crate::ipc::registry::HandlerRegistry;

/// Liveness probe. Answers `"pong"` for any payload.
#[derive(Debug, Default)]
pub struct Ping;

impl Handler for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn run(&self, _payload: Value) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async { Ok(HandlerOutput::from("pong")) })
    }
}

/// Answers with the payload it was given.
#[derive(Debug, Default)]
pub struct Echo;

impl Handler for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn run(&self, payload: Value) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move { Ok(HandlerOutput::from(payload)) })
    }
}

/// Register the built-in handlers.
pub fn register_builtins(registry: &mut HandlerRegistry) {
    registry.register(Ping);
    registry.register(Echo);
}
