//! Name-keyed handler registry.
//!
//! # Responsibilities
//! - Store handlers under their own names
//! - Resolve a route name to its handler
//!
//! # Design Decisions
//! - Built explicitly at startup and moved into the dispatcher, so it is
//!   read-only while requests are served (no locks)
//! - Registering an existing name replaces the old handler (last write wins)
//!   and logs a warning
//! - No removal API

use std::collections::HashMap;
use std::sync::Arc;

use crate::ipc::handler::Handler;

/// Mapping from route name to handler.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `handler` under its name, replacing any previous entry.
    ///
    /// Returns the same handler so callers can keep a typed reference.
    pub fn register<H: Handler + 'static>(&mut self, handler: H) -> Arc<H> {
        let handler = Arc::new(handler);
        self.register_arc(handler.clone());
        handler
    }

    /// Insert an already shared handler, replacing any previous entry.
    pub fn register_arc(&mut self, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        let name = handler.name().to_string();
        if self.handlers.insert(name.clone(), handler.clone()).is_some() {
            tracing::warn!(route = %name, "Replacing previously registered handler");
        } else {
            tracing::debug!(route = %name, "Handler registered");
        }
        handler
    }

    /// Look up the handler registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered route names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("routes", &self.names())
            .finish()
    }
}
