//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// HTTP-facing route templates.
    pub api: ApiConfig,

    /// Worker serving limits.
    pub worker: WorkerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Route templates exposed by the HTTP layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix prepended to every route template (e.g., "/api").
    pub prefix: String,

    /// Route definitions, checked in order.
    pub routes: Vec<RouteConfig>,
}

/// A single named route template.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    pub name: String,

    /// Template relative to the prefix (e.g., "/users/:user").
    pub template: String,
}

/// Limits applied by the worker's serving loop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum dispatches running at once.
    pub max_in_flight: usize,

    /// Capacity of the request queue feeding the serving loop.
    pub queue_capacity: usize,

    /// How long shutdown waits for in-flight dispatches.
    pub drain_timeout_secs: u64,

    /// Longest accepted frame on the line codec, in bytes.
    pub max_frame_bytes: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 1024,
            queue_capacity: 256,
            drain_timeout_secs: 10,
            max_frame_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Emit logs as JSON lines instead of the human format.
    pub json_logs: bool,

    /// Record dispatch metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "route_bridge=info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.prefix, "");
        assert!(config.api.routes.is_empty());
        assert_eq!(config.worker.max_in_flight, 1024);
        assert_eq!(config.observability.log_filter, "route_bridge=info");
    }

    #[test]
    fn test_parse_full_config() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [api]
            prefix = "/api"

            [[api.routes]]
            name = "user"
            template = "/users/:user"

            [worker]
            max_in_flight = 8
            drain_timeout_secs = 2

            [observability]
            json_logs = true
            "#,
        )
        .unwrap();

        assert_eq!(config.api.prefix, "/api");
        assert_eq!(config.api.routes[0].template, "/users/:user");
        assert_eq!(config.worker.max_in_flight, 8);
        assert_eq!(config.worker.queue_capacity, 256);
        assert_eq!(config.worker.drain_timeout_secs, 2);
        assert!(config.observability.json_logs);
        assert!(config.observability.metrics_enabled);
    }
}
