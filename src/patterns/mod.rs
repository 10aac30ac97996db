// src/patterns/mod.rs
// =============================================================================
// This module decides which extracted links are wanted.
//
// Submodules:
// - pattern: URL patterns as callers write them (exact, glob, regex, custom)
// - glob: pseudo-URL globs -> anchored regular expressions
// - matcher: compiled patterns and the first-match-wins policy
// =============================================================================

mod glob;
mod matcher;
mod pattern;

pub use glob::glob_to_regex;
pub use matcher::{CompiledMatcher, MatchOutcome, PatternSet};
pub use pattern::{PatternKind, PatternObject, PatternSpec, UrlMatcher, UrlPattern};
