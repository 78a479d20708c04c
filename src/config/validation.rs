//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0)
//! - Detect duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::BridgeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Prefix must be empty or start with '/'.
    InvalidPrefix(String),
    /// Route name is empty.
    EmptyRouteName { index: usize },
    /// Two routes share a name.
    DuplicateRouteName(String),
    /// Route template is empty.
    EmptyTemplate(String),
    /// A numeric limit that must be positive is zero.
    ZeroLimit(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPrefix(p) => {
                write!(f, "api.prefix '{}' must be empty or start with '/'", p)
            }
            ValidationError::EmptyRouteName { index } => {
                write!(f, "api.routes[{}] has an empty name", index)
            }
            ValidationError::DuplicateRouteName(name) => {
                write!(f, "route name '{}' is defined more than once", name)
            }
            ValidationError::EmptyTemplate(name) => {
                write!(f, "route '{}' has an empty template", name)
            }
            ValidationError::ZeroLimit(field) => write!(f, "{} must be greater than 0", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.api.prefix;
    if !prefix.is_empty() && !prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.api.routes.iter().enumerate() {
        if route.name.is_empty() {
            errors.push(ValidationError::EmptyRouteName { index });
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName(route.name.clone()));
        }
        if route.template.is_empty() {
            errors.push(ValidationError::EmptyTemplate(route.name.clone()));
        }
    }

    let worker = &config.worker;
    if worker.max_in_flight == 0 {
        errors.push(ValidationError::ZeroLimit("worker.max_in_flight"));
    }
    if worker.queue_capacity == 0 {
        errors.push(ValidationError::ZeroLimit("worker.queue_capacity"));
    }
    if worker.max_frame_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("worker.max_frame_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, template: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            template: template.into(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&BridgeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BridgeConfig::default();
        config.api.prefix = "api".into();
        config.api.routes = vec![
            route("user", "/users/:user"),
            route("user", "/members/:user"),
            route("", "/x"),
            route("blank", ""),
        ];
        config.worker.max_in_flight = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidPrefix("api".into()),
                ValidationError::DuplicateRouteName("user".into()),
                ValidationError::EmptyRouteName { index: 2 },
                ValidationError::EmptyTemplate("blank".into()),
                ValidationError::ZeroLimit("worker.max_in_flight"),
            ]
        );
    }
}
