//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use route_bridge::ipc::{handler_fn, HandlerFailure, HandlerOutput, HandlerRegistry, HandlerResult};
use serde_json::{json, Value};

/// Registry with a small set of handlers covering every outcome.
///
/// - `ping` answers 42
/// - `user` answers a nested user record built from `payload.id`
/// - `reject` fails with the payload as the reason
/// - `sleep` waits `payload` milliseconds, then answers the same number
/// - `count` answers how many times it has been called
#[allow(dead_code)]
pub fn test_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    registry.register(handler_fn("ping", |_payload: Value| async {
        HandlerResult::Ok(HandlerOutput::from(42))
    }));

    registry.register(handler_fn("user", |payload: Value| async move {
        let Some(id) = payload.get("id").and_then(Value::as_str) else {
            return Err(HandlerFailure::new("MISSING_USERID"));
        };
        Ok(HandlerOutput::from(json!({
            "id": id,
            "name": format!("user-{}", id),
            "profile": { "bio": "hidden" },
        })))
    }));

    registry.register(handler_fn("reject", |payload: Value| async move {
        HandlerResult::Err(HandlerFailure::new(payload))
    }));

    registry.register(handler_fn("sleep", |payload: Value| async move {
        let ms = payload.as_u64().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(ms)).await;
        HandlerResult::Ok(HandlerOutput::from(ms))
    }));

    let calls = Arc::new(AtomicUsize::new(0));
    registry.register(handler_fn("count", move |_payload: Value| {
        let calls = Arc::clone(&calls);
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            HandlerResult::Ok(HandlerOutput::from(n as u64))
        }
    }));

    registry
}
