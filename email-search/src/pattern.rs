//! Module dedicated to text patterns.
//!
//! The core concept of this module is the [`TextPattern`] structure,
//! shared by every search term matching text (addresses, subject,
//! body, headers and file names).

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::warn;

use crate::wildcard;

/// A text pattern, optionally containing wildcards.
///
/// Without wildcard, a text matches the pattern when it contains it,
/// case-insensitively. With wildcards, the whole text needs to match
/// the pattern (see [`wildcard::to_regex`]).
///
/// Derived values are memoized: the lower case version of the pattern
/// is computed at construction, the regular expression is compiled
/// once on first use.
#[derive(Clone)]
pub struct TextPattern {
    pattern: String,
    lowercase: String,
    wildcard: bool,
    matcher: OnceCell<Option<Regex>>,
}

impl TextPattern {
    pub fn new(pattern: impl ToString) -> Self {
        let pattern = pattern.to_string();
        let lowercase = pattern.to_lowercase();
        let wildcard = wildcard::contains_wildcard(&pattern);

        Self {
            pattern,
            lowercase,
            wildcard,
            matcher: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_ascii(&self) -> bool {
        self.pattern.is_ascii()
    }

    pub fn contains_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Returns the substring sent to remote servers.
    ///
    /// Remote servers do not understand wildcards: they receive the
    /// longest literal segment of the pattern, which selects a
    /// superset of the messages actually matching.
    pub fn narrowing(&self) -> &str {
        wildcard::non_wildcard_part(&self.pattern)
    }

    /// Returns `true` if the remote substring search selects exactly
    /// the texts matching the pattern.
    ///
    /// Wildcard patterns are narrowed, and an empty substring is not
    /// sent at all (which also selects messages without text).
    pub fn translates_exactly(&self) -> bool {
        !self.wildcard && !self.pattern.is_empty()
    }

    /// Returns `true` if the given text matches the pattern.
    ///
    /// An absent text never matches.
    pub fn matches(&self, text: Option<&str>) -> bool {
        let Some(text) = text else {
            return false;
        };

        if !self.wildcard {
            return text.to_lowercase().contains(&self.lowercase);
        }

        match self.matcher() {
            Some(matcher) => matcher.is_match(text),
            None => false,
        }
    }

    fn matcher(&self) -> Option<&Regex> {
        self.matcher
            .get_or_init(|| match wildcard::to_regex(&self.pattern) {
                Ok(matcher) => Some(matcher),
                Err(err) => {
                    warn!("cannot compile wildcard pattern {}: {err}", self.pattern);
                    None
                }
            })
            .as_ref()
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextPattern").field(&self.pattern).finish()
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Two patterns are considered equal when their source text are
/// equal.
impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for TextPattern {}

impl Hash for TextPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl From<&str> for TextPattern {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

impl From<String> for TextPattern {
    fn from(pattern: String) -> Self {
        Self::new(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::TextPattern;

    #[test]
    fn substring_is_case_insensitive() {
        let pattern = TextPattern::new("Invoice");
        assert!(pattern.matches(Some("Your INVOICE #1")));
        assert!(pattern.matches(Some("invoice")));
        assert!(!pattern.matches(Some("inv oice")));
    }

    #[test]
    fn absent_text_never_matches() {
        assert!(!TextPattern::new("x").matches(None));
        assert!(!TextPattern::new("*").matches(None));
    }

    #[test]
    fn empty_pattern_matches_present_text() {
        let pattern = TextPattern::new("");
        assert!(pattern.matches(Some("")));
        assert!(pattern.matches(Some("anything")));
    }

    #[test]
    fn wildcard_matches_whole_text() {
        let pattern = TextPattern::new("inv*");
        assert!(pattern.contains_wildcard());
        assert!(pattern.matches(Some("Invoice #1")));
        assert!(!pattern.matches(Some("Re: Invoice #1")));

        // the matcher is memoized, a second evaluation gives the same
        // result
        assert!(pattern.matches(Some("invoice #2")));
    }

    #[test]
    fn narrowing() {
        assert_eq!(TextPattern::new("foo*barit?it").narrowing(), "barit");
        assert_eq!(TextPattern::new("plain").narrowing(), "plain");
    }

    #[test]
    fn translates_exactly() {
        assert!(TextPattern::new("invoice").translates_exactly());
        assert!(!TextPattern::new("inv*").translates_exactly());
        assert!(!TextPattern::new("").translates_exactly());
    }

    #[test]
    fn is_ascii() {
        assert!(TextPattern::new("hello").is_ascii());
        assert!(!TextPattern::new("héllo").is_ascii());
    }
}
