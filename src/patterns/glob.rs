// src/patterns/glob.rs
// =============================================================================
// Compiles pseudo-URL globs into regular expressions.
//
// Syntax:
//   https://example.com/products/[.*]
//   https://example.com/page/[\d+]?sort=[(asc|desc)]
//
// - Text outside square brackets matches literally
// - The content of each outermost [...] pair is a regular expression
// - `[.*]` is therefore "anything goes here"
//
// Brackets may nest inside a group so character classes work: `[[a-z]+]`.
// The whole URL has to match, so the result is anchored with ^...$.
// =============================================================================

use crate::error::ConfigError;
use regex::Regex;

pub fn glob_to_regex(glob: &str) -> Result<Regex, ConfigError> {
    // Surrounding whitespace is never part of a URL
    let glob = glob.trim();
    if glob.is_empty() {
        return Err(ConfigError::pattern(glob, "pattern is empty"));
    }

    let mut source = String::from("^");
    let mut literal = String::new();
    let mut group = String::new();
    let mut depth = 0usize;

    for ch in glob.chars() {
        match ch {
            '[' => {
                if depth == 0 {
                    source.push_str(&regex::escape(&literal));
                    literal.clear();
                } else {
                    group.push(ch);
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    group.push(ch);
                    continue;
                }
                if group.is_empty() {
                    return Err(ConfigError::pattern(glob, "empty [] group"));
                }
                source.push_str("(?:");
                source.push_str(&group);
                source.push(')');
                group.clear();
            }
            ']' => return Err(ConfigError::pattern(glob, "unmatched `]`")),
            _ if depth > 0 => group.push(ch),
            _ => literal.push(ch),
        }
    }

    if depth > 0 {
        return Err(ConfigError::pattern(glob, "unclosed `[`"));
    }

    source.push_str(&regex::escape(&literal));
    source.push('$');

    Regex::new(&source).map_err(|e| ConfigError::pattern(glob, e.to_string()))
}
