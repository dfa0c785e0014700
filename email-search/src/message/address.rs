//! Module dedicated to message addresses.
//!
//! This core concept of this module is the [Address] structure, which
//! represents a sender or a recipient of a message.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// The message address.
///
/// An address is composed of an optional name and an email address.
#[derive(Clone, Debug, Default, Eq, Ord, PartialOrd)]
pub struct Address {
    pub name: Option<String>,
    pub addr: String,
}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

/// Two addresses are considered equal when their email addresses are
/// equal.
impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.addr),
            None => write!(f, "{}", self.addr),
        }
    }
}

impl Address {
    /// Builds a new address from an optional name and an email
    /// address.
    pub fn new(name: Option<impl ToString>, address: impl ToString) -> Self {
        Self {
            name: name.map(|name| name.to_string()),
            addr: address.to_string(),
        }
    }

    /// Builds a new address from an email address only.
    pub fn new_nameless(address: impl ToString) -> Self {
        Self::new(Option::<String>::None, address)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Self::new_nameless(address)
    }
}

/// The address header a term looks at.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressField {
    From,
    To,
    Cc,
    Bcc,
}

impl AddressField {
    /// Returns the name of the header holding the addresses.
    pub fn header_name(&self) -> &'static str {
        match self {
            Self::From => "From",
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => write!(f, "from"),
            Self::To => write!(f, "to"),
            Self::Cc => write!(f, "cc"),
            Self::Bcc => write!(f, "bcc"),
        }
    }
}

/// Joins the given addresses into a single, comma separated string.
///
/// Returns `None` if the list is empty.
pub fn join(addrs: &[Address]) -> Option<String> {
    if addrs.is_empty() {
        return None;
    }

    let joined = addrs.iter().fold(String::new(), |mut joined, addr| {
        if !joined.is_empty() {
            joined.push_str(", ");
        }
        joined.push_str(&addr.to_string());
        joined
    });

    Some(joined)
}
