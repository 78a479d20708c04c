//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Register handlers → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal or stdin EOF → Stop accepting → Drain in-flight → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then registry, then serving
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: stop waiting after the drain deadline

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
