//! Route template compilation.
//!
//! # Responsibilities
//! - Split a template into path segments
//! - Classify each segment as a literal or a named parameter
//!
//! # Design Decisions
//! - Compilation is total: every string is a valid template
//! - No wildcards, so a pattern only matches paths with the same segment count
//! - Templates and request paths share one splitting rule (`split_path`)

use std::fmt;

use serde::Serialize;

/// Prefix marking a parameter segment (`/users/:id`).
pub const PARAM_SIGIL: char = ':';

/// One segment of a compiled route template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PatternPart {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Accepts any segment and binds it under this name.
    Parameter(String),
}

impl PatternPart {
    /// Classify a single template segment.
    pub fn parse(segment: &str) -> Self {
        match segment.strip_prefix(PARAM_SIGIL) {
            Some(name) => PatternPart::Parameter(name.to_string()),
            None => PatternPart::Literal(segment.to_string()),
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, PatternPart::Parameter(_))
    }
}

/// Ordered segments of a route template.
///
/// Built once per template and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompiledPattern {
    parts: Vec<PatternPart>,
}

impl CompiledPattern {
    /// Compile a template such as `/users/:userId`.
    pub fn compile(template: &str) -> Self {
        let parts = split_path(template)
            .into_iter()
            .map(PatternPart::parse)
            .collect();
        Self { parts }
    }

    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    /// Number of path segments this pattern can match.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Names of all parameter segments, in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            PatternPart::Parameter(name) => Some(name.as_str()),
            PatternPart::Literal(_) => None,
        })
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            match part {
                PatternPart::Literal(value) => write!(f, "{}", value)?,
                PatternPart::Parameter(name) => write!(f, "{}{}", PARAM_SIGIL, name)?,
            }
        }
        Ok(())
    }
}

/// Compile a route template. Shorthand for [`CompiledPattern::compile`].
pub fn compile(template: &str) -> CompiledPattern {
    CompiledPattern::compile(template)
}

/// Split a template or request path into segments.
///
/// Anything from the first `?` or `#` is dropped. A bare `/` is kept as the
/// single segment `"/"`; otherwise one leading `/` is removed and the rest is
/// split on `/`, keeping empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = match path.find(|c: char| c == '?' || c == '#') {
        Some(end) => &path[..end],
        None => path,
    };

    if path == "/" {
        return vec![path];
    }

    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}
