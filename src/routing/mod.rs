//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     [api] prefix + RouteConfig[]
//!     → pattern.rs (split template, classify segments)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Path (from the HTTP layer):
//!     → pattern.rs split_path (strip query, split on '/')
//!     → router.rs (first route whose pattern matches)
//!     → matcher.rs (literal comparison, param extraction)
//!     → Return: RouteMatch { route, params } or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (insertion order)

pub mod matcher;
pub mod pattern;
pub mod router;

pub use matcher::{extract_params, matches, Params};
pub use pattern::{compile, split_path, CompiledPattern, PatternPart};
pub use router::{Route, RouteMatch, RouteTable};
