//! Module dedicated to search configuration.
//!
//! The core concept of this module is the [`SearchConfig`] structure,
//! which holds the few settings of the search engine. Every field is
//! optional, getters fall back to defaults.

use std::collections::{BTreeSet, HashSet};

use crate::{
    search::RemoteSearch,
    term::{header::DEFAULT_SEPARATOR, HeaderTerm, SearchTerm, TermKind},
    Result,
};

/// The search configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct SearchConfig {
    /// The separator used to join the values of a header appearing
    /// several times in a message.
    ///
    /// Defaults to `", "`.
    pub header_separator: Option<String>,

    /// The term kinds the remote server cannot evaluate. Those terms
    /// are filtered out of remote queries and verified locally.
    ///
    /// Defaults to attachment, mailbox and file name terms, which no
    /// remote query can express.
    pub remote_unsupported: Option<BTreeSet<TermKind>>,
}

impl SearchConfig {
    pub fn get_header_separator(&self) -> &str {
        self.header_separator
            .as_deref()
            .unwrap_or(DEFAULT_SEPARATOR)
    }

    pub fn get_remote_unsupported(&self) -> HashSet<TermKind> {
        match &self.remote_unsupported {
            Some(kinds) => kinds.iter().copied().collect(),
            None => HashSet::from_iter([
                TermKind::Attachment,
                TermKind::XMailbox,
                TermKind::FileName,
            ]),
        }
    }

    /// Builds a header search term joining header values with the
    /// configured separator.
    pub fn header_term(
        &self,
        name: impl ToString,
        value: Option<impl ToString>,
    ) -> Result<SearchTerm> {
        let term = HeaderTerm::new(name, value)?.with_separator(self.get_header_separator());
        Ok(SearchTerm::Header(term))
    }

    /// Builds the filter-then-verify plan of the given term, leaving
    /// the configured unsupported kinds out of the remote query.
    pub fn remote_search(&self, term: SearchTerm) -> Result<RemoteSearch> {
        RemoteSearch::new(term, &self.get_remote_unsupported())
    }
}
