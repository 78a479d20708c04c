//! Path matching against compiled templates.
//!
//! # Responsibilities
//! - Decide whether a split path fits a compiled pattern
//! - Extract named parameters from a matching path
//!
//! # Design Decisions
//! - Segment count must be equal (no wildcards)
//! - Literal comparison is exact and case-sensitive, no normalization
//! - Parameters accept any segment, including the empty string
//! - Extraction is positional and unguarded; call `matches` first

use std::collections::HashMap;

use crate::routing::pattern::{CompiledPattern, PatternPart};

/// Parameter name to captured segment.
pub type Params = HashMap<String, String>;

impl CompiledPattern {
    /// Returns true if every literal position of `split` equals the pattern.
    pub fn matches<S: AsRef<str>>(&self, split: &[S]) -> bool {
        if split.len() != self.len() {
            return false;
        }

        self.parts()
            .iter()
            .zip(split)
            .all(|(part, segment)| match part {
                PatternPart::Literal(value) => value.as_str() == segment.as_ref(),
                PatternPart::Parameter(_) => true,
            })
    }

    /// Bind every parameter to the segment at its position.
    ///
    /// Positions past the end of `split` are skipped. A name that appears
    /// twice keeps the later segment.
    pub fn extract_params<S: AsRef<str>>(&self, split: &[S]) -> Params {
        self.parts()
            .iter()
            .zip(split)
            .filter_map(|(part, segment)| match part {
                PatternPart::Parameter(name) => {
                    let segment: &str = segment.as_ref();
                    Some((name.clone(), segment.to_string()))
                }
                PatternPart::Literal(_) => None,
            })
            .collect()
    }
}

/// See [`CompiledPattern::matches`].
pub fn matches<S: AsRef<str>>(pattern: &CompiledPattern, split: &[S]) -> bool {
    pattern.matches(split)
}

/// See [`CompiledPattern::extract_params`].
pub fn extract_params<S: AsRef<str>>(pattern: &CompiledPattern, split: &[S]) -> Params {
    pattern.extract_params(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::{compile, split_path};

    #[test]
    fn test_matches_and_extracts() {
        let pattern = compile("/a/:b/c");
        let split = ["a", "x", "c"];
        assert!(matches(&pattern, &split));

        let params = extract_params(&pattern, &split);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("b").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_segment_count_mismatch() {
        let pattern = compile("/a/:b/c");
        assert!(!pattern.matches(&["a", "x"]));
        assert!(!pattern.matches(&["a", "x", "c", "d"]));
    }

    #[test]
    fn test_literal_mismatch() {
        let pattern = compile("/a/:b");
        assert!(!pattern.matches(&["z", "x"]));
    }

    #[test]
    fn test_literals_are_case_sensitive() {
        let pattern = compile("/Users/:id");
        assert!(pattern.matches(&["Users", "1"]));
        assert!(!pattern.matches(&["users", "1"]));
    }

    #[test]
    fn test_parameter_accepts_empty_segment() {
        let pattern = compile("/users/:id");
        let split = split_path("/users/");
        assert!(pattern.matches(&split));
        assert_eq!(pattern.extract_params(&split)["id"], "");
    }

    #[test]
    fn test_trailing_slash_needs_empty_segment() {
        let pattern = compile("/users/");
        assert!(pattern.matches(&split_path("/users/")));
        assert!(!pattern.matches(&split_path("/users")));
    }

    #[test]
    fn test_owned_segments() {
        let pattern = compile("/files/:name");
        let split: Vec<String> = vec!["files".into(), "a.txt".into()];
        assert!(pattern.matches(&split));
        assert_eq!(pattern.extract_params(&split)["name"], "a.txt");
    }

    #[test]
    fn test_extract_is_positional_without_match() {
        let pattern = compile("/a/:b");
        // Not a match, but extraction still aligns by position.
        let params = pattern.extract_params(&["z", "x"]);
        assert_eq!(params["b"], "x");

        let short = pattern.extract_params(&["a"]);
        assert!(short.is_empty());
    }

    #[test]
    fn test_duplicate_names_keep_last() {
        let pattern = compile("/:id/:id");
        assert_eq!(pattern.extract_params(&["1", "2"])["id"], "2");
    }
}
