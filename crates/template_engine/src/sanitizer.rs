//! Neutralizes template syntax and HTML markup in untrusted text.
//!
//! Every character that belongs to a template delimiter pair (`{{`, `}}`,
//! `{%`, `%}`, `{#`, `#}`) is prefixed with a backslash, and `&`, `<`, `>`
//! are replaced by their HTML entities. After sanitization no opening
//! delimiter survives as two adjacent characters, and sanitizing again never
//! brings one back.
//!
//! ```rust
//! use template_engine::sanitizer::{contains_live_delimiter, sanitize_str};
//!
//! let cleaned = sanitize_str("{{ injection }} <b>");
//! assert_eq!(cleaned, r"\{\{ injection \}\} &lt;b&gt;");
//! assert!(!contains_live_delimiter(&cleaned));
//! ```

use serde_json::Value;

#[cfg(test)]
#[path = "sanitizer_tests.rs"]
mod tests;

const DELIMITER_PAIRS: [(char, char); 6] = [
    ('{', '{'),
    ('}', '}'),
    ('{', '%'),
    ('%', '}'),
    ('{', '#'),
    ('#', '}'),
];

const OPENING_DELIMITERS: [&str; 3] = ["{{", "{%", "{#"];

const ESCAPE: char = '\\';

fn is_delimiter_pair(first: char, second: char) -> bool {
    DELIMITER_PAIRS.contains(&(first, second))
}

/// Sanitize a single string.
pub fn sanitize_str(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    let mut marked = vec![false; chars.len()];
    for i in 1..chars.len() {
        if is_delimiter_pair(chars[i - 1], chars[i]) {
            marked[i - 1] = true;
            marked[i] = true;
        }
    }

    let mut result = String::with_capacity(text.len() + text.len() / 4);
    for (c, escape) in chars.into_iter().zip(marked) {
        if escape {
            result.push(ESCAPE);
            result.push(c);
            continue;
        }

        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            c => result.push(c),
        }
    }

    result
}

/// Sanitize every string inside `value`.
///
/// Objects keep their keys and have their values sanitized; arrays have
/// their elements sanitized. Numbers, booleans and null pass through.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Whether `text` contains an opening template delimiter as two adjacent
/// characters.
pub fn contains_live_delimiter(text: &str) -> bool {
    OPENING_DELIMITERS.iter().any(|d| text.contains(d))
}
