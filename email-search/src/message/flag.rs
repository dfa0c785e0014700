//! Module dedicated to message flags.
//!
//! This module contains the flag model shared by messages and by the
//! flag search terms.

use std::{
    collections::BTreeSet,
    fmt,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use tracing::debug;

use crate::Error;

/// The message flag.
///
/// A flag is like a tag that can be attached to a message. Standard
/// flags are the ones every backend knows about, custom flags (also
/// called user flags, labels or keywords) are free-form names.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Flag {
    /// Flag used when the message has been opened.
    Seen,

    /// Flag used when the message has been answered.
    Answered,

    /// Flag used as a bookmark. The meaning is specific to the user:
    /// it could be important, starred, to check etc.
    Flagged,

    /// Flag used when the message is marked for deletion.
    Deleted,

    /// Flag used when the message is a draft and is therefore not
    /// complete.
    Draft,

    /// Flag used when the message arrived since the last session.
    Recent,

    /// Flag used for all other use cases.
    Custom(String),
}

impl Flag {
    /// Creates a custom flag.
    pub fn custom(flag: impl ToString) -> Self {
        Self::Custom(flag.to_string())
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Returns `true` if the flag is the custom flag named after the
    /// given label, case-insensitively.
    pub fn is_label(&self, label: &str) -> bool {
        match self {
            Self::Custom(flag) => flag.eq_ignore_ascii_case(label),
            _ => false,
        }
    }
}

/// Parse a flag from a string. If the string does not match any of
/// the existing variant, it is considered as custom.
impl From<&str> for Flag {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(flag) => flag,
            Err(_) => Flag::Custom(s.trim().to_owned()),
        }
    }
}

/// Parse a flag from a string. If the string does not match any of
/// the existing variant, it returns an error.
impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().trim_start_matches('\\') {
            seen if seen.eq_ignore_ascii_case("seen") => Ok(Flag::Seen),
            answered if answered.eq_ignore_ascii_case("answered") => Ok(Flag::Answered),
            replied if replied.eq_ignore_ascii_case("replied") => Ok(Flag::Answered),
            flagged if flagged.eq_ignore_ascii_case("flagged") => Ok(Flag::Flagged),
            deleted if deleted.eq_ignore_ascii_case("deleted") => Ok(Flag::Deleted),
            trashed if trashed.eq_ignore_ascii_case("trashed") => Ok(Flag::Deleted),
            draft if draft.eq_ignore_ascii_case("draft") => Ok(Flag::Draft),
            recent if recent.eq_ignore_ascii_case("recent") => Ok(Flag::Recent),
            unknown => Err(Error::ParseFlagError(unknown.to_string())),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Seen => write!(f, "seen"),
            Flag::Answered => write!(f, "answered"),
            Flag::Flagged => write!(f, "flagged"),
            Flag::Deleted => write!(f, "deleted"),
            Flag::Draft => write!(f, "draft"),
            Flag::Recent => write!(f, "recent"),
            Flag::Custom(flag) => write!(f, "{flag}"),
        }
    }
}

/// The set of message flags.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Flags(BTreeSet<Flag>);

impl Flags {
    /// Returns `true` if the set contains the custom flag named after
    /// the given label.
    pub fn contains_label(&self, label: &str) -> bool {
        self.iter().any(|flag| flag.is_label(label))
    }

    /// Iterates over custom flags names.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.iter().filter_map(|flag| match flag {
            Flag::Custom(label) => Some(label.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{flag}")?;
        }
        Ok(())
    }
}

impl Deref for Flags {
    type Target = BTreeSet<Flag>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Flags {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<&str> for Flags {
    fn from(s: &str) -> Self {
        s.split_whitespace()
            .map(|flag| {
                let flag = Flag::from(flag);
                debug!("parsed flag {flag:?}");
                flag
            })
            .collect()
    }
}

impl From<Flag> for Flags {
    fn from(flag: Flag) -> Self {
        Flags::from_iter([flag])
    }
}

impl<const N: usize> From<[Flag; N]> for Flags {
    fn from(flags: [Flag; N]) -> Self {
        Flags::from_iter(flags)
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        Flags(iter.into_iter().collect())
    }
}

impl IntoIterator for Flags {
    type Item = Flag;
    type IntoIter = std::collections::btree_set::IntoIter<Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
