//! Module dedicated to superset translations.
//!
//! Remote servers do not support every term kind, and some supported
//! terms are only approximated (wildcards are narrowed, empty
//! substrings are not sent). The query sent to a remote server must
//! nevertheless select at least every message matching the term, the
//! extra ones being discarded by a local verification.
//!
//! Approximations are monotonic for conjunctions and disjunctions, but
//! a negation turns a superset into a subset. The translation below
//! keeps track of the direction it approximates in, and flips it under
//! each negation.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    remote::RemoteQuery,
    term::{SearchTerm, TermKind},
    Result,
};

/// The remote approximation of a search term.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Approximation {
    /// The remote query.
    pub query: RemoteQuery,

    /// Whether the query selects exactly the messages matching the
    /// term. When `false`, the selected messages need to be verified
    /// locally.
    pub exact: bool,
}

impl Approximation {
    fn exact(query: RemoteQuery) -> Self {
        Self { query, exact: true }
    }

    fn inexact(query: RemoteQuery) -> Self {
        Self {
            query,
            exact: false,
        }
    }
}

/// The direction of an approximation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Direction {
    /// The query selects at least the matching messages.
    Superset,
    /// The query selects at most the matching messages.
    Subset,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Self::Superset => Self::Subset,
            Self::Subset => Self::Superset,
        }
    }

    /// The approximation of a term that cannot be sent at all.
    fn unconstrained(self) -> Approximation {
        match self {
            Self::Superset => Approximation::inexact(RemoteQuery::All),
            Self::Subset => Approximation::inexact(RemoteQuery::nothing()),
        }
    }
}

impl SearchTerm {
    /// Translates the tree into a remote query selecting a superset
    /// of the matching messages.
    ///
    /// Terms of the given kinds are not sent to the remote server.
    /// Contrary to [`SearchTerm::filter`], the translation remains a
    /// superset under negations and disjunctions, at the cost of a
    /// broader query.
    pub fn translate_superset(&self, unsupported: &HashSet<TermKind>) -> Result<Approximation> {
        let approx = self.approximate(unsupported, Direction::Superset)?;
        debug!(
            "remote superset of {self}: {} (exact: {})",
            approx.query, approx.exact
        );
        Ok(approx)
    }

    fn approximate(
        &self,
        unsupported: &HashSet<TermKind>,
        direction: Direction,
    ) -> Result<Approximation> {
        let kind = self.kind();

        match self {
            Self::Boolean(true) => Ok(Approximation::exact(RemoteQuery::All)),
            Self::Boolean(false) => Ok(Approximation::exact(RemoteQuery::nothing())),
            _ if unsupported.contains(&kind) => {
                debug!("cannot send {kind} term to remote server, approximating it");
                Ok(direction.unconstrained())
            }
            Self::And(left, right) => {
                let left = left.approximate(unsupported, direction)?;
                let right = right.approximate(unsupported, direction)?;

                Ok(Approximation {
                    query: RemoteQuery::and(left.query, right.query),
                    exact: left.exact && right.exact,
                })
            }
            Self::Or(left, right) => {
                let left = left.approximate(unsupported, direction)?;
                let right = right.approximate(unsupported, direction)?;

                Ok(Approximation {
                    query: RemoteQuery::or(left.query, right.query),
                    exact: left.exact && right.exact,
                })
            }
            Self::Not(term) => {
                let approx = term.approximate(unsupported, direction.flip())?;

                Ok(Approximation {
                    query: RemoteQuery::not(approx.query),
                    exact: approx.exact,
                })
            }
            leaf => {
                let query = leaf.translate()?;

                if leaf.leaf_translates_exactly() {
                    Ok(Approximation::exact(query))
                } else if direction == Direction::Superset {
                    Ok(Approximation::inexact(query))
                } else {
                    Ok(direction.unconstrained())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{
        message::Envelope,
        remote::RemoteQuery,
        term::{SearchTerm, TermKind},
    };

    fn unsupported<const N: usize>(kinds: [TermKind; N]) -> HashSet<TermKind> {
        HashSet::from_iter(kinds)
    }

    #[test]
    fn exact_tree() {
        let term = SearchTerm::and(
            SearchTerm::from_address("a@x"),
            SearchTerm::not(SearchTerm::subject("invoice")),
        );
        let approx = term.translate_superset(&HashSet::new()).unwrap();

        assert!(approx.exact);
        assert_eq!(
            approx.query.to_string(),
            r#"(FROM "a@x" NOT SUBJECT "invoice")"#,
        );
    }

    #[test]
    fn narrowed_pattern() {
        let approx = SearchTerm::subject("inv*")
            .translate_superset(&HashSet::new())
            .unwrap();

        assert!(!approx.exact);
        assert_eq!(approx.query, RemoteQuery::Subject(String::from("inv")));
    }

    #[test]
    fn narrowed_pattern_under_negation() {
        let term = SearchTerm::not(SearchTerm::subject("inv*"));
        let approx = term.translate_superset(&HashSet::new()).unwrap();

        assert!(!approx.exact);
        assert!(approx.query.is_all());

        // the narrowed query would have excluded this message
        let envelope = Envelope::new("1").with_subject("Re: Invoice #1");
        assert!(term.matches(&envelope));
    }

    #[test]
    fn empty_pattern_under_negation() {
        let term = SearchTerm::not(SearchTerm::subject(""));
        let approx = term.translate_superset(&HashSet::new()).unwrap();

        assert!(!approx.exact);
        assert!(approx.query.is_all());
        assert!(term.matches(&Envelope::new("1")));
    }

    #[test]
    fn unsupported_operand_of_and() {
        let term = SearchTerm::and(
            SearchTerm::subject("invoice"),
            SearchTerm::mailbox("INBOX").unwrap(),
        );
        let approx = term
            .translate_superset(&unsupported([TermKind::XMailbox]))
            .unwrap();

        assert!(!approx.exact);
        assert_eq!(approx.query.to_string(), r#"SUBJECT "invoice""#);
    }

    #[test]
    fn unsupported_operand_of_or() {
        let term = SearchTerm::or(
            SearchTerm::subject("invoice"),
            SearchTerm::mailbox("INBOX").unwrap(),
        );
        let approx = term
            .translate_superset(&unsupported([TermKind::XMailbox]))
            .unwrap();

        assert!(!approx.exact);
        assert!(approx.query.is_all());
    }

    #[test]
    fn unsupported_operand_under_negation() {
        let term = SearchTerm::not(SearchTerm::and(
            SearchTerm::subject("invoice"),
            SearchTerm::attachment("invoice"),
        ));
        let approx = term
            .translate_superset(&unsupported([TermKind::Attachment]))
            .unwrap();

        assert!(!approx.exact);
        assert!(approx.query.is_all());

        let term = SearchTerm::not(SearchTerm::or(
            SearchTerm::subject("invoice"),
            SearchTerm::attachment("invoice"),
        ));
        let approx = term
            .translate_superset(&unsupported([TermKind::Attachment]))
            .unwrap();

        assert!(!approx.exact);
        assert_eq!(approx.query.to_string(), r#"NOT SUBJECT "invoice""#);
    }

    #[test]
    fn unsupported_root() {
        let approx = SearchTerm::attachment("invoice")
            .translate_superset(&unsupported([TermKind::Attachment]))
            .unwrap();

        assert!(!approx.exact);
        assert!(approx.query.is_all());
    }

    #[test]
    fn untranslatable_leaf() {
        let term = SearchTerm::or(SearchTerm::subject("x"), SearchTerm::filename("x.pdf"));
        assert!(term.translate_superset(&HashSet::new()).is_err());
    }
}
