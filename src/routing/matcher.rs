//! Path matching logic.
//!
//! # Responsibilities
//! - Match exact paths and path prefixes for the route table
//! - Match shell-style globs for `fn:` exemption rules
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Globs follow `fnmatch`: `*` and `?` also cross `/`
//! - Globs are compiled once; matching never allocates

use regex::Regex;
use thiserror::Error;

/// Trait for matching a raw request path.
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl PathMatcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathMatcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Build the matcher for a route path: a trailing `*` means prefix.
pub fn route_path_matcher(pattern: &str) -> Box<dyn PathMatcher> {
    match pattern.strip_suffix('*') {
        Some(prefix) => Box::new(PathPrefixMatcher::new(prefix)),
        None => Box::new(ExactPathMatcher::new(pattern)),
    }
}

/// Error returned when a glob cannot be compiled.
#[derive(Debug, Error)]
#[error("invalid glob '{pattern}': {reason}")]
pub struct GlobError {
    pub pattern: String,
    pub reason: String,
}

/// A compiled shell-style glob.
///
/// Supports `*`, `?`, `[seq]` and `[!seq]`. An unterminated `[` is a
/// literal bracket. The whole path must match.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    regex: Regex,
}

impl GlobMatcher {
    pub fn new(pattern: impl Into<String>) -> Result<Self, GlobError> {
        let pattern = pattern.into();
        let translated = translate_glob(&pattern);
        let regex = Regex::new(&translated).map_err(|e| GlobError {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern, regex })
    }

    /// The glob as written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PathMatcher for GlobMatcher {
    fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Translate a glob into an anchored regular expression.
fn translate_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^(?s:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // Consecutive stars collapse into one.
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match find_class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str("\\["),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push_str(")\\z");
    out
}

/// Index of the `]` closing a class whose body starts at `start`.
fn find_class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    // A leading `]` is part of the set.
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items = String::new();
    let mut i = 0;
    while i < body.len() {
        let lo = body[i];
        if i + 2 < body.len() && body[i + 1] == '-' {
            let hi = body[i + 2];
            // Reversed ranges match nothing.
            if lo <= hi {
                push_class_char(&mut items, lo);
                items.push('-');
                push_class_char(&mut items, hi);
            }
            i += 3;
        } else {
            push_class_char(&mut items, lo);
            i += 1;
        }
    }

    match (items.is_empty(), negated) {
        (true, false) => "[^\\s\\S]".to_string(),
        (true, true) => ".".to_string(),
        (false, false) => format!("[{items}]"),
        (false, true) => format!("[^{items}]"),
    }
}

fn push_class_char(out: &mut String, c: char) {
    if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
        out.push('\\');
    }
    out.push(c);
}
