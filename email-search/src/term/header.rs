//! Module dedicated to the header search terms.

use std::fmt;

use crate::{
    fetch::{FetchItem, FetchPlan},
    message::{parsed, MessageSource, MessageView},
    pattern::TextPattern,
    remote::RemoteQuery,
    term::{Term, TermKind},
    Error, Result,
};

/// The default separator used to join the values of a header
/// appearing several times.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// The pattern of the header search term: a header name and an
/// optional value pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderPattern {
    pub name: String,
    pub value: Option<TextPattern>,
}

impl fmt::Display for HeaderPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {value}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// The header search term.
///
/// All the values of the header are joined using the separator of
/// the term, then matched against the value pattern. Without value
/// pattern, the term matches messages having the header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderTerm {
    pattern: HeaderPattern,
    separator: String,
}

impl HeaderTerm {
    pub fn new(name: impl ToString, value: Option<impl ToString>) -> Result<Self> {
        let name = name.to_string().trim().to_owned();

        if name.is_empty() {
            return Err(Error::BuildHeaderTermEmptyNameError);
        }

        Ok(Self {
            pattern: HeaderPattern {
                name,
                value: value.map(TextPattern::new),
            },
            separator: DEFAULT_SEPARATOR.to_owned(),
        })
    }

    pub fn with_separator(mut self, separator: impl ToString) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.pattern.name
    }

    pub fn value(&self) -> Option<&TextPattern> {
        self.pattern.value.as_ref()
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    fn matches_value(&self, value: Option<&str>) -> bool {
        match &self.pattern.value {
            Some(pattern) => pattern.matches(value),
            None => value.is_some(),
        }
    }
}

impl Term for HeaderTerm {
    type Pattern = HeaderPattern;

    fn kind(&self) -> TermKind {
        TermKind::Header
    }

    fn pattern(&self) -> &HeaderPattern {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        let value = msg.header(&self.pattern.name, &self.separator);
        self.matches_value(value.as_deref())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let raw = msg.raw_headers()?;
        let parsed = parsed::parse(msg.id(), &raw)?;
        let values = parsed::header_values(&parsed, &self.pattern.name);

        if values.is_empty() {
            Ok(self.matches_value(None))
        } else {
            Ok(self.matches_value(Some(&values.join(&self.separator))))
        }
    }

    fn translate(&self) -> Result<RemoteQuery> {
        let name = self.pattern.name.clone();
        let value = self
            .pattern
            .value
            .as_ref()
            .map(|value| value.narrowing().to_owned())
            .unwrap_or_default();

        Ok(RemoteQuery::Header(name, value))
    }

    fn translates_exactly(&self) -> bool {
        self.pattern
            .value
            .as_ref()
            .map_or(true, |value| !value.contains_wildcard())
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::header(&self.pattern.name));
    }

    fn is_ascii(&self) -> bool {
        self.pattern.name.is_ascii()
            && self
                .pattern
                .value
                .as_ref()
                .map_or(true, TextPattern::is_ascii)
    }

    fn contains_wildcard(&self) -> bool {
        self.pattern
            .value
            .as_ref()
            .map_or(false, TextPattern::contains_wildcard)
    }
}

/// The header existence search term.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderExistsTerm {
    name: String,
}

impl HeaderExistsTerm {
    pub fn new(name: impl ToString) -> Result<Self> {
        let name = name.to_string().trim().to_owned();

        if name.is_empty() {
            return Err(Error::BuildHeaderTermEmptyNameError);
        }

        Ok(Self { name })
    }
}

impl Term for HeaderExistsTerm {
    type Pattern = str;

    fn kind(&self) -> TermKind {
        TermKind::HeaderExists
    }

    fn pattern(&self) -> &str {
        &self.name
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        msg.header(&self.name, DEFAULT_SEPARATOR).is_some()
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let raw = msg.raw_headers()?;
        let parsed = parsed::parse(msg.id(), &raw)?;
        Ok(!parsed::header_values(&parsed, &self.name).is_empty())
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Ok(RemoteQuery::Header(self.name.clone(), String::new()))
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::header(&self.name));
    }

    fn is_ascii(&self) -> bool {
        self.name.is_ascii()
    }
}
