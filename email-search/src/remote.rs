//! Module dedicated to remote search queries.
//!
//! The core concept of this module is the [`RemoteQuery`] enum, the
//! restricted query grammar search terms are translated into when
//! searching is delegated to a remote server. It is independent from
//! any transport library, and renders as an IMAP `SEARCH` criteria
//! string.

use std::fmt;

use chrono::NaiveDate;

use crate::{
    comparison::Discrete,
    message::{AddressField, Flag},
};

/// The comparison operators remote servers understand.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RemoteComparison {
    LessThan,
    GreaterThan,
}

/// The remote search query.
///
/// Text criteria are substring searches, without wildcard support.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RemoteQuery {
    /// Matches every message.
    All,
    And(Box<RemoteQuery>, Box<RemoteQuery>),
    Or(Box<RemoteQuery>, Box<RemoteQuery>),
    Not(Box<RemoteQuery>),
    Address(AddressField, String),
    Subject(String),
    Body(String),
    /// Matches messages having the given header containing the given
    /// value. An empty value matches messages having the header.
    Header(String, String),
    /// Matches messages having (or not) the given standard flag.
    Flag(Flag, bool),
    /// Matches messages having (or not) the given custom flag. The
    /// keyword is rendered as is, it needs to be an atom (see
    /// [`is_atom`]).
    Keyword(String, bool),
    Size(RemoteComparison, u64),
    SentDate(RemoteComparison, NaiveDate),
    ReceivedDate(RemoteComparison, NaiveDate),
}

impl RemoteQuery {
    /// Builds the query matching no message.
    pub fn nothing() -> Self {
        Self::Not(Box::new(Self::All))
    }

    /// Builds a conjunction. [`RemoteQuery::All`] being neutral, it
    /// is dropped.
    pub fn and(left: RemoteQuery, right: RemoteQuery) -> Self {
        match (left, right) {
            (Self::All, query) | (query, Self::All) => query,
            (left, _) if left.is_nothing() => left,
            (_, right) if right.is_nothing() => right,
            (left, right) => Self::And(Box::new(left), Box::new(right)),
        }
    }

    /// Builds a disjunction. [`RemoteQuery::nothing`] being neutral,
    /// it is dropped.
    pub fn or(left: RemoteQuery, right: RemoteQuery) -> Self {
        match (left, right) {
            (left, _) if left.is_all() => left,
            (_, right) if right.is_all() => right,
            (left, right) if left.is_nothing() => right,
            (left, right) if right.is_nothing() => left,
            (left, right) => Self::Or(Box::new(left), Box::new(right)),
        }
    }

    pub fn not(query: RemoteQuery) -> Self {
        match query {
            Self::Not(query) => *query,
            query => Self::Not(Box::new(query)),
        }
    }

    /// Builds a text query from the given substring. An empty
    /// substring constrains nothing and gives [`RemoteQuery::All`].
    pub fn text(text: &str, query: impl FnOnce(String) -> RemoteQuery) -> Self {
        if text.is_empty() {
            Self::All
        } else {
            query(text.to_owned())
        }
    }

    /// Returns `true` if the query matches every message.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns `true` if the query matches no message.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Not(query) if query.is_all())
    }
}

/// Returns `true` if the given text is an IMAP atom, which is the
/// only form keywords can take in search criteria.
pub fn is_atom(text: &str) -> bool {
    !text.is_empty()
        && text.chars().all(|c| {
            c.is_ascii_graphic() && !matches!(c, '(' | ')' | '{' | '%' | '*' | '"' | '\\' | ']')
        })
}

/// Renders the query as IMAP `SEARCH` criteria.
impl fmt::Display for RemoteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::And(left, right) => write!(f, "({left} {right})"),
            Self::Or(left, right) => write!(f, "OR {left} {right}"),
            Self::Not(query) => write!(f, "NOT {query}"),
            Self::Address(field, addr) => {
                let key = field.header_name().to_uppercase();
                write!(f, "{key} {}", Quoted(addr))
            }
            Self::Subject(subject) => write!(f, "SUBJECT {}", Quoted(subject)),
            Self::Body(body) => write!(f, "BODY {}", Quoted(body)),
            Self::Header(name, value) => write!(f, "HEADER {} {}", Quoted(name), Quoted(value)),
            Self::Flag(flag, wanted) => write_flag(f, flag, *wanted),
            Self::Keyword(keyword, true) => write!(f, "KEYWORD {keyword}"),
            Self::Keyword(keyword, false) => write!(f, "UNKEYWORD {keyword}"),
            Self::Size(RemoteComparison::LessThan, size) => write!(f, "SMALLER {size}"),
            Self::Size(RemoteComparison::GreaterThan, size) => write!(f, "LARGER {size}"),
            Self::SentDate(comparison, date) => {
                write_date(f, ("SENTBEFORE", "SENTSINCE"), *comparison, date)
            }
            Self::ReceivedDate(comparison, date) => {
                write_date(f, ("BEFORE", "SINCE"), *comparison, date)
            }
        }
    }
}

fn write_flag(f: &mut fmt::Formatter, flag: &Flag, wanted: bool) -> fmt::Result {
    match (flag, wanted) {
        (Flag::Seen, true) => write!(f, "SEEN"),
        (Flag::Seen, false) => write!(f, "UNSEEN"),
        (Flag::Answered, true) => write!(f, "ANSWERED"),
        (Flag::Answered, false) => write!(f, "UNANSWERED"),
        (Flag::Flagged, true) => write!(f, "FLAGGED"),
        (Flag::Flagged, false) => write!(f, "UNFLAGGED"),
        (Flag::Deleted, true) => write!(f, "DELETED"),
        (Flag::Deleted, false) => write!(f, "UNDELETED"),
        (Flag::Draft, true) => write!(f, "DRAFT"),
        (Flag::Draft, false) => write!(f, "UNDRAFT"),
        (Flag::Recent, true) => write!(f, "RECENT"),
        (Flag::Recent, false) => write!(f, "OLD"),
        (Flag::Custom(flag), true) => write!(f, "KEYWORD {flag}"),
        (Flag::Custom(flag), false) => write!(f, "UNKEYWORD {flag}"),
    }
}

/// IMAP date keys are inclusive on the lower bound (`SINCE` means
/// "on or after"), so a strict lower bound is shifted by one day.
fn write_date(
    f: &mut fmt::Formatter,
    (before, since): (&str, &str),
    comparison: RemoteComparison,
    date: &NaiveDate,
) -> fmt::Result {
    match comparison {
        RemoteComparison::LessThan => write!(f, "{before} {}", date.format("%-d-%b-%Y")),
        RemoteComparison::GreaterThan => match Discrete::succ(date) {
            Some(date) => write!(f, "{since} {}", date.format("%-d-%b-%Y")),
            None => write!(f, "NOT ALL"),
        },
    }
}

/// An IMAP quoted string.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"")?;
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                write!(f, "\\")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "\"")
    }
}
