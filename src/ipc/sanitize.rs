//! Result sanitization for response envelopes.
//!
//! # Responsibilities
//! - Turn any successful handler result into a transport-safe JSON value
//! - Bound the size of composite results with a shallow rendering
//!
//! # Design Decisions
//! - Numbers and strings pass through untouched
//! - `Undefined` becomes the string `"undefined"`, callables their source text
//! - Everything else (null, booleans, objects, arrays) is rendered to a
//!   single-line string in an inspect-like notation
//! - Objects and arrays show their own entries only; nested composites become
//!   `[Object]` / `[Array]`, so an array of objects is not expanded further
//! - Object keys keep the order the handler produced them in
//! - Only applied to successes; failure values are forwarded as-is

use std::fmt::Write;

use serde_json::{Map, Value};

use crate::ipc::handler::HandlerOutput;

/// Levels expanded below the top-level value.
pub const MAX_DEPTH: usize = 0;

/// Array entries shown before the remainder is summarized.
pub const MAX_ARRAY_ENTRIES: usize = 100;

/// Convert a handler result into the envelope's `message` value. Never fails.
pub fn sanitize(output: HandlerOutput) -> Value {
    match output {
        HandlerOutput::Undefined => Value::String("undefined".to_string()),
        HandlerOutput::Callable(source) => Value::String(source),
        HandlerOutput::Value(value @ (Value::Number(_) | Value::String(_))) => value,
        HandlerOutput::Value(value) => Value::String(render(&value)),
    }
}

/// Render a JSON value with the bounded depth used for responses.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, MAX_DEPTH);
    out
}

fn write_value(out: &mut String, value: &Value, level: usize, max_depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_quoted(out, s),
        Value::Array(items) => write_array(out, items, level, max_depth),
        Value::Object(map) => write_object(out, map, level, max_depth),
    }
}

fn write_array(out: &mut String, items: &[Value], level: usize, max_depth: usize) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    if level > max_depth {
        out.push_str("[Array]");
        return;
    }

    out.push_str("[ ");
    for (i, item) in items.iter().take(MAX_ARRAY_ENTRIES).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, item, level + 1, max_depth);
    }
    if items.len() > MAX_ARRAY_ENTRIES {
        let rest = items.len() - MAX_ARRAY_ENTRIES;
        let _ = write!(out, ", ... {} more item{}", rest, if rest == 1 { "" } else { "s" });
    }
    out.push_str(" ]");
}

fn write_object(out: &mut String, map: &Map<String, Value>, level: usize, max_depth: usize) {
    if map.is_empty() {
        out.push_str("{}");
        return;
    }
    if level > max_depth {
        out.push_str("[Object]");
        return;
    }

    out.push_str("{ ");
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if is_identifier(key) {
            out.push_str(key);
        } else {
            write_quoted(out, key);
        }
        out.push_str(": ");
        write_value(out, value, level + 1, max_depth);
    }
    out.push_str(" }");
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Single quotes unless the text contains one; then double quotes, then backticks.
fn write_quoted(out: &mut String, s: &str) {
    let quote = if !s.contains('\'') {
        '\''
    } else if !s.contains('"') {
        '"'
    } else if !s.contains('`') {
        '`'
    } else {
        '\''
    };

    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
