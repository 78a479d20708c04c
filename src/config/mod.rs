//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!     → read once at startup by routing, transport, observability
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the handler registry is fixed at startup,
//!   so there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ApiConfig;
pub use schema::BridgeConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::WorkerConfig;
