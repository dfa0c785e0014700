//! Module dedicated to ordered comparisons.
//!
//! The core concept of this module is the [`ComparablePattern`]
//! structure, which couples a [`ComparisonType`] with the value a
//! message property is compared against. It is used by the size and
//! date search terms.

use std::{fmt, str::FromStr};

use chrono::{Days, NaiveDate};

use crate::{Error, Result};

/// The comparison operator of an ordered search term.
///
/// Variants are declared from the smallest to the greatest
/// operator, so that the enum itself is totally ordered.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ComparisonType {
    LessThan,
    LessEquals,
    Equals,
    GreaterEquals,
    GreaterThan,
}

impl ComparisonType {
    /// Every comparison type, in order.
    pub const ALL: [ComparisonType; 5] = [
        Self::LessThan,
        Self::LessEquals,
        Self::Equals,
        Self::GreaterEquals,
        Self::GreaterThan,
    ];

    /// Returns `true` if `lhs <op> rhs` holds.
    pub fn compare<V: Ord + ?Sized>(&self, lhs: &V, rhs: &V) -> bool {
        match self {
            Self::LessThan => lhs < rhs,
            Self::LessEquals => lhs <= rhs,
            Self::Equals => lhs == rhs,
            Self::GreaterEquals => lhs >= rhs,
            Self::GreaterThan => lhs > rhs,
        }
    }

    /// Returns the mathematical symbol of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessEquals => "<=",
            Self::Equals => "=",
            Self::GreaterEquals => ">=",
            Self::GreaterThan => ">",
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Parse a comparison type either from its symbol or from its short
/// mnemonic (`lt`, `le`, `eq`, `ge`, `gt`).
impl FromStr for ComparisonType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "<" => Ok(Self::LessThan),
            "<=" => Ok(Self::LessEquals),
            "=" | "==" => Ok(Self::Equals),
            ">=" => Ok(Self::GreaterEquals),
            ">" => Ok(Self::GreaterThan),
            lt if lt.eq_ignore_ascii_case("lt") => Ok(Self::LessThan),
            le if le.eq_ignore_ascii_case("le") => Ok(Self::LessEquals),
            eq if eq.eq_ignore_ascii_case("eq") => Ok(Self::Equals),
            ge if ge.eq_ignore_ascii_case("ge") => Ok(Self::GreaterEquals),
            gt if gt.eq_ignore_ascii_case("gt") => Ok(Self::GreaterThan),
            unknown => Err(Error::ParseComparisonTypeError(unknown.to_owned())),
        }
    }
}

/// The pattern of an ordered search term.
///
/// A value `v` matches the pattern when `v <comparison> value`
/// holds. For example the pattern `< 100` matches every value
/// strictly lower than 100.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ComparablePattern<V> {
    comparison: ComparisonType,
    value: V,
}

impl<V> ComparablePattern<V> {
    pub fn new(comparison: ComparisonType, value: V) -> Self {
        Self { comparison, value }
    }

    pub fn comparison(&self) -> ComparisonType {
        self.comparison
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

impl<V: Ord> ComparablePattern<V> {
    /// Returns `true` if the given value satisfies the pattern.
    pub fn matches(&self, value: &V) -> bool {
        self.comparison.compare(value, &self.value)
    }
}

impl<V: fmt::Display> fmt::Display for ComparablePattern<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.comparison, self.value)
    }
}

/// A value living in a discrete, ordered domain.
///
/// Remote servers only understand strict comparisons, non-strict
/// ones are rewritten using the adjacent values. A missing adjacent
/// value means the bound falls outside of the domain.
pub trait Discrete: Sized {
    fn pred(&self) -> Option<Self>;
    fn succ(&self) -> Option<Self>;
}

impl Discrete for u64 {
    fn pred(&self) -> Option<Self> {
        self.checked_sub(1)
    }

    fn succ(&self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl Discrete for NaiveDate {
    fn pred(&self) -> Option<Self> {
        self.checked_sub_days(Days::new(1))
    }

    fn succ(&self) -> Option<Self> {
        self.checked_add_days(Days::new(1))
    }
}
