//! Module dedicated to wildcard patterns.
//!
//! Search patterns support a minimal glob syntax, independent from
//! any regular expression dialect:
//!
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//!
//! Every other character is literal. This module exposes two
//! facilities working on that syntax: [`to_regex`] builds the exact
//! matcher used for local verification, and [`non_wildcard_part`]
//! extracts the literal substring sent to remote servers, which do
//! not understand wildcards.

use regex::{Regex, RegexBuilder};

/// The wildcard matching zero or more characters.
pub const ANY_SEQUENCE: char = '*';

/// The wildcard matching exactly one character.
pub const ANY_CHAR: char = '?';

/// Returns `true` if the given char is a wildcard.
pub fn is_wildcard(c: char) -> bool {
    c == ANY_SEQUENCE || c == ANY_CHAR
}

/// Returns `true` if the given pattern contains at least one
/// wildcard.
pub fn contains_wildcard(pattern: &str) -> bool {
    pattern.contains(is_wildcard)
}

/// Translates the given wildcard pattern into a regular expression
/// source.
///
/// The expression is anchored on both ends, and literal segments are
/// escaped so that regex meta characters lose their meaning.
pub fn to_regex_source(pattern: &str) -> String {
    let mut source = String::with_capacity(pattern.len() + 2);
    let mut literal = String::new();

    source.push('^');

    for c in pattern.chars() {
        match c {
            ANY_SEQUENCE => {
                source.push_str(&regex::escape(&literal));
                source.push_str(".*");
                literal.clear();
            }
            ANY_CHAR => {
                source.push_str(&regex::escape(&literal));
                source.push('.');
                literal.clear();
            }
            c => literal.push(c),
        }
    }

    source.push_str(&regex::escape(&literal));
    source.push('$');
    source
}

/// Compiles the given wildcard pattern into a case-insensitive
/// regular expression matching the whole target text.
///
/// `.` also matches new lines, so that a pattern can span over the
/// lines of a body.
pub fn to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&to_regex_source(pattern))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

/// Returns the longest literal segment of the given pattern.
///
/// A pattern without wildcard is returned as is, a pattern made of
/// wildcards only gives an empty string. When several segments share
/// the greatest length, the first one wins.
pub fn non_wildcard_part(pattern: &str) -> &str {
    pattern
        .split(is_wildcard)
        .fold("", |longest, segment| {
            if segment.chars().count() > longest.chars().count() {
                segment
            } else {
                longest
            }
        })
}
