//! Module dedicated to the ordered search terms: size and dates.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::{
    comparison::{ComparablePattern, ComparisonType, Discrete},
    fetch::{FetchItem, FetchPlan},
    message::{parsed, MessageSource, MessageView},
    remote::{RemoteComparison, RemoteQuery},
    term::{Term, TermKind},
    Result,
};

/// The size search term, in bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SizeTerm {
    pattern: ComparablePattern<u64>,
}

impl SizeTerm {
    pub fn new(pattern: ComparablePattern<u64>) -> Self {
        Self { pattern }
    }
}

impl Term for SizeTerm {
    type Pattern = ComparablePattern<u64>;

    fn kind(&self) -> TermKind {
        TermKind::Size
    }

    fn pattern(&self) -> &ComparablePattern<u64> {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        self.pattern.matches(&msg.size())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        Ok(self.pattern.matches(&msg.size()?))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Ok(strict_bounds(&self.pattern, RemoteQuery::Size))
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::Envelope);
    }

    fn is_ascii(&self) -> bool {
        true
    }
}

/// The date a date search term looks at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DateField {
    /// The date found in the `Date` header.
    Sent,
    /// The date the store received the message at.
    Received,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Received => write!(f, "received"),
        }
    }
}

/// The date search term.
///
/// Dates are compared by calendar day, in the time zone of the
/// message date. A message without date never matches.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DateTerm {
    field: DateField,
    pattern: ComparablePattern<NaiveDate>,
}

impl DateTerm {
    pub fn new(field: DateField, pattern: ComparablePattern<NaiveDate>) -> Self {
        Self { field, pattern }
    }

    pub fn field(&self) -> DateField {
        self.field
    }

    fn matches_date(&self, date: Option<DateTime<FixedOffset>>) -> bool {
        match date {
            Some(date) => self.pattern.matches(&date.date_naive()),
            None => false,
        }
    }
}

impl Term for DateTerm {
    type Pattern = ComparablePattern<NaiveDate>;

    fn kind(&self) -> TermKind {
        match self.field {
            DateField::Sent => TermKind::SentDate,
            DateField::Received => TermKind::ReceivedDate,
        }
    }

    fn pattern(&self) -> &ComparablePattern<NaiveDate> {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        match self.field {
            DateField::Sent => self.matches_date(msg.sent_date()),
            DateField::Received => self.matches_date(msg.received_date()),
        }
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let date = match self.field {
            DateField::Sent => {
                let raw = msg.raw_headers()?;
                let parsed = parsed::parse(msg.id(), &raw)?;
                parsed::sent_date(&parsed)
            }
            DateField::Received => msg.received_date()?,
        };

        Ok(self.matches_date(date))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        let query = match self.field {
            DateField::Sent => strict_bounds(&self.pattern, RemoteQuery::SentDate),
            DateField::Received => strict_bounds(&self.pattern, RemoteQuery::ReceivedDate),
        };

        Ok(query)
    }

    /// Messages without date never match, whereas a vacuous bound
    /// selects every message.
    fn translates_exactly(&self) -> bool {
        !has_vacuous_bound(&self.pattern)
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::Envelope);
    }

    fn is_ascii(&self) -> bool {
        true
    }
}

/// Expresses the given pattern using strict comparisons only.
///
/// Non-strict bounds are shifted to the adjacent value. A bound
/// falling outside of the domain of the value is vacuous and gives
/// [`RemoteQuery::All`].
fn strict_bounds<V: Discrete + Clone>(
    pattern: &ComparablePattern<V>,
    query: impl Fn(RemoteComparison, V) -> RemoteQuery,
) -> RemoteQuery {
    let lower_than = |value: Option<V>| match value {
        Some(value) => query(RemoteComparison::LessThan, value),
        None => RemoteQuery::All,
    };

    let greater_than = |value: Option<V>| match value {
        Some(value) => query(RemoteComparison::GreaterThan, value),
        None => RemoteQuery::All,
    };

    let value = pattern.value();

    match pattern.comparison() {
        ComparisonType::LessThan => lower_than(Some(value.clone())),
        ComparisonType::LessEquals => lower_than(value.succ()),
        ComparisonType::Equals => {
            RemoteQuery::and(greater_than(value.pred()), lower_than(value.succ()))
        }
        ComparisonType::GreaterEquals => greater_than(value.pred()),
        ComparisonType::GreaterThan => greater_than(Some(value.clone())),
    }
}

/// Returns `true` if a non-strict bound of the given pattern falls
/// outside of the domain of the value.
fn has_vacuous_bound<V: Discrete>(pattern: &ComparablePattern<V>) -> bool {
    let value = pattern.value();

    match pattern.comparison() {
        ComparisonType::LessThan | ComparisonType::GreaterThan => false,
        ComparisonType::LessEquals => value.succ().is_none(),
        ComparisonType::Equals => value.pred().is_none() || value.succ().is_none(),
        ComparisonType::GreaterEquals => value.pred().is_none(),
    }
}
