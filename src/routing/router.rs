//! Route table lookup.
//!
//! # Responsibilities
//! - Store compiled routes, each prefixed with the API prefix
//! - Resolve a request path to the first matching route
//! - Return matched route with its params, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in insertion order (acceptable for typical route counts)
//! - First match wins
//! - Explicit `None` rather than silent default

use serde::Serialize;

use crate::config::schema::ApiConfig;
use crate::routing::matcher::Params;
use crate::routing::pattern::{split_path, CompiledPattern};

/// A named route with its compiled template.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Route identifier for logging.
    pub name: String,
    /// Full template, API prefix included.
    pub template: String,
    /// Compiled form of `template`.
    pub pattern: CompiledPattern,
}

impl Route {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        let template = template.into();
        let pattern = CompiledPattern::compile(&template);
        Self {
            name: name.into(),
            template,
            pattern,
        }
    }
}

/// A successful lookup.
#[derive(Debug, Serialize)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

/// Ordered collection of routes sharing one API prefix.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    prefix: String,
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty table. Every template added later is prefixed with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            routes: Vec::new(),
        }
    }

    /// Build the table from the `[api]` configuration section.
    pub fn from_config(config: &ApiConfig) -> Self {
        let mut table = Self::new(config.prefix.clone());
        for route in &config.routes {
            table.add(route.name.clone(), &route.template);
        }
        tracing::debug!(
            prefix = %table.prefix,
            routes = table.routes.len(),
            "Route table compiled"
        );
        table
    }

    /// Compile `template` under the table prefix and append it.
    pub fn add(&mut self, name: impl Into<String>, template: &str) -> &Route {
        let route = Route::new(name, format!("{}{}", self.prefix, template));
        let index = self.routes.len();
        self.routes.push(route);
        &self.routes[index]
    }

    /// Find the first route matching `path` and extract its params.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let split = split_path(path);
        let route = self.routes.iter().find(|r| r.pattern.matches(&split))?;

        tracing::trace!(route = %route.name, path, "Route matched");
        Some(RouteMatch {
            route,
            params: route.pattern.extract_params(&split),
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
