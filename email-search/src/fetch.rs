//! Module dedicated to fetch plans.
//!
//! Before evaluating a tree against many messages, callers can ask
//! the tree which message data it needs (see
//! [`SearchTerm::fetch_plan`](crate::term::SearchTerm::fetch_plan)),
//! then prefetch exactly that data in one pass.

use std::{collections::BTreeSet, fmt};

use tracing::trace;

/// A class of message data a search term needs.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum FetchItem {
    /// Addresses, subject, dates and size.
    Envelope,
    Flags,
    /// The header of the given (lower case) name.
    Header(String),
    /// The MIME structure: content types, dispositions and file
    /// names.
    ContentInfo,
    /// The whole message.
    FullBody,
}

impl FetchItem {
    pub fn header(name: impl AsRef<str>) -> Self {
        Self::Header(name.as_ref().trim().to_lowercase())
    }
}

impl fmt::Display for FetchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Envelope => write!(f, "envelope"),
            Self::Flags => write!(f, "flags"),
            Self::Header(name) => write!(f, "header {name}"),
            Self::ContentInfo => write!(f, "content info"),
            Self::FullBody => write!(f, "full body"),
        }
    }
}

/// The fetch plan.
///
/// Adding an item already present does nothing, so that every term
/// of a tree can contribute without coordination.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FetchPlan {
    items: BTreeSet<FetchItem>,
}

impl FetchPlan {
    /// Adds the given item to the plan. Returns `false` if the item
    /// was already present.
    pub fn add(&mut self, item: FetchItem) -> bool {
        trace!("adding {item} to fetch plan");
        self.items.insert(item)
    }

    pub fn contains(&self, item: &FetchItem) -> bool {
        self.items.contains(item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FetchItem> {
        self.items.iter()
    }

    /// Returns the names of the headers the plan needs.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            FetchItem::Header(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Renders the plan as IMAP `FETCH` data items.
    ///
    /// The UID is always fetched. Headers are fetched in a single
    /// `BODY.PEEK[HEADER.FIELDS (…)]` item, which is not needed when
    /// the whole message is fetched.
    pub fn to_imap_items(&self) -> String {
        let mut items = vec![String::from("UID")];

        if self.contains(&FetchItem::Envelope) {
            items.push(String::from("ENVELOPE RFC822.SIZE INTERNALDATE"));
        }

        if self.contains(&FetchItem::Flags) {
            items.push(String::from("FLAGS"));
        }

        if self.contains(&FetchItem::ContentInfo) {
            items.push(String::from("BODYSTRUCTURE"));
        }

        if self.contains(&FetchItem::FullBody) {
            items.push(String::from("BODY.PEEK[]"));
        } else {
            let headers: Vec<String> = self.headers().map(str::to_uppercase).collect();
            if !headers.is_empty() {
                items.push(format!("BODY.PEEK[HEADER.FIELDS ({})]", headers.join(" ")));
            }
        }

        format!("({})", items.join(" "))
    }
}

impl fmt::Display for FetchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}

impl Extend<FetchItem> for FetchPlan {
    fn extend<T: IntoIterator<Item = FetchItem>>(&mut self, iter: T) {
        for item in iter {
            self.add(item);
        }
    }
}

impl FromIterator<FetchItem> for FetchPlan {
    fn from_iter<T: IntoIterator<Item = FetchItem>>(iter: T) -> Self {
        let mut plan = FetchPlan::default();
        plan.extend(iter);
        plan
    }
}
