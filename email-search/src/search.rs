//! Module dedicated to batch searches.
//!
//! This module contains the functions applying a search term to a
//! sequence of messages, and the [`RemoteSearch`] plan used to
//! delegate a search to a remote server then verify its results
//! locally.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::{
    fetch::FetchPlan,
    message::{MessageSource, MessageView},
    remote::RemoteQuery,
    term::{SearchTerm, TermKind},
    Result,
};

/// Keeps the messages matching the given term.
///
/// Messages keep their original order, and are neither duplicated
/// nor dropped for any other reason than not matching.
pub fn search<M, I>(messages: I, term: &SearchTerm) -> Vec<M>
where
    M: MessageView,
    I: IntoIterator<Item = M>,
{
    messages
        .into_iter()
        .filter(|msg| {
            let matches = term.matches(msg);
            trace!("message matches search term {term}: {matches}");
            matches
        })
        .collect()
}

/// Keeps the message sources matching the given term.
///
/// Same as [`search`], for message sources. A message whose data
/// cannot be fetched is considered as not matching.
pub fn search_sources<S, I>(messages: I, term: &SearchTerm) -> Vec<S>
where
    S: MessageSource,
    I: IntoIterator<Item = S>,
{
    messages
        .into_iter()
        .filter(|msg| {
            let matches = term.matches_source(msg);
            trace!("message {} matches search term {term}: {matches}", msg.id());
            matches
        })
        .collect()
}

/// The filter-then-verify search plan.
///
/// The term is translated into a remote query selecting a superset of
/// the matching messages, without the kinds the remote server does
/// not support (see [`SearchTerm::translate_superset`]). Whenever the
/// query is not exact, remote candidates need to be verified locally
/// against the original term.
#[derive(Clone, Debug)]
pub struct RemoteSearch {
    term: SearchTerm,
    query: RemoteQuery,
    needs_verification: bool,
}

impl RemoteSearch {
    pub fn new(term: SearchTerm, unsupported: &HashSet<TermKind>) -> Result<Self> {
        let approx = term.translate_superset(unsupported)?;
        let needs_verification = !approx.exact;

        debug!("remote search query of {term}: {}", approx.query);
        debug!("remote search needs local verification: {needs_verification}");

        Ok(Self {
            term,
            query: approx.query,
            needs_verification,
        })
    }

    /// Returns the original term.
    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    pub fn query(&self) -> &RemoteQuery {
        &self.query
    }

    pub fn needs_verification(&self) -> bool {
        self.needs_verification
    }

    /// Returns the data needed to verify remote candidates, which is
    /// empty when no verification is needed.
    pub fn fetch_plan(&self) -> FetchPlan {
        if self.needs_verification {
            self.term.fetch_plan()
        } else {
            FetchPlan::default()
        }
    }

    /// Keeps the remote candidates matching the original term.
    pub fn verify<M, I>(&self, candidates: I) -> Vec<M>
    where
        M: MessageView,
        I: IntoIterator<Item = M>,
    {
        if self.needs_verification {
            search(candidates, &self.term)
        } else {
            candidates.into_iter().collect()
        }
    }

    /// Keeps the remote candidate sources matching the original
    /// term.
    pub fn verify_sources<S, I>(&self, candidates: I) -> Vec<S>
    where
        S: MessageSource,
        I: IntoIterator<Item = S>,
    {
        if self.needs_verification {
            search_sources(candidates, &self.term)
        } else {
            candidates.into_iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{
        message::{Envelope, RawMessage},
        remote::RemoteQuery,
        term::{SearchTerm, TermKind},
    };

    use super::RemoteSearch;

    fn envelopes() -> Vec<Envelope> {
        vec![
            Envelope::new("1")
                .with_from("a@x")
                .with_subject("Invoice #1"),
            Envelope::new("2").with_from("b@x").with_subject("Meeting"),
            Envelope::new("3")
                .with_from("a@x")
                .with_subject("Re: Invoice #1"),
        ]
    }

    #[test]
    fn search_is_stable() {
        let ids = |envelopes: Vec<Envelope>| -> Vec<String> {
            envelopes.into_iter().map(|envelope| envelope.id).collect()
        };

        assert_eq!(
            ids(super::search(envelopes(), &SearchTerm::Boolean(true))),
            ["1", "2", "3"],
        );
        assert!(super::search(envelopes(), &SearchTerm::Boolean(false)).is_empty());
        assert_eq!(
            ids(super::search(envelopes(), &SearchTerm::subject("invoice"))),
            ["1", "3"],
        );
    }

    #[test]
    fn search_by_reference() {
        let envelopes = envelopes();
        let found = super::search(&envelopes, &SearchTerm::from_address("b@x"));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");
    }

    #[test]
    fn search_sources() {
        let sources = [
            RawMessage::new("1", "Subject: hello\r\n\r\n"),
            RawMessage::new("2", "Subject: bye\r\n\r\n"),
        ];

        let found = super::search_sources(&sources, &SearchTerm::subject("hello"));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn fully_supported_term_needs_no_verification() {
        let term = SearchTerm::and(
            SearchTerm::from_address("a@x"),
            SearchTerm::subject("invoice"),
        );
        let search = RemoteSearch::new(term, &HashSet::new()).unwrap();

        assert!(!search.needs_verification());
        assert!(search.fetch_plan().is_empty());
        assert_eq!(search.verify(envelopes()).len(), 3);
    }

    #[test]
    fn wildcard_term_needs_verification() {
        let term = SearchTerm::subject("inv*");
        let search = RemoteSearch::new(term, &HashSet::new()).unwrap();

        assert!(search.needs_verification());
        assert_eq!(search.query(), &RemoteQuery::Subject(String::from("inv")));

        let verified = search.verify(envelopes());
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].id, "1");
    }

    #[test]
    fn unsupported_term_is_left_out() {
        let term = SearchTerm::and(
            SearchTerm::from_address("a@x"),
            SearchTerm::mailbox("INBOX").unwrap(),
        );
        let unsupported = HashSet::from_iter([TermKind::XMailbox]);
        let search = RemoteSearch::new(term, &unsupported).unwrap();

        assert!(search.needs_verification());
        assert_eq!(search.query().to_string(), r#"FROM "a@x""#);
    }

    #[test]
    fn negated_wildcard_term_keeps_every_match() {
        let term = SearchTerm::not(SearchTerm::subject("inv*"));
        let search = RemoteSearch::new(term, &HashSet::new()).unwrap();

        assert!(search.needs_verification());
        assert_eq!(search.query(), &RemoteQuery::All);

        let verified = search.verify(envelopes());
        let ids: Vec<_> = verified.iter().map(|envelope| envelope.id.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
    }

    #[test]
    fn negated_empty_term_keeps_every_match() {
        let term = SearchTerm::not(SearchTerm::subject(""));
        let search = RemoteSearch::new(term, &HashSet::new()).unwrap();

        assert!(search.needs_verification());
        assert_eq!(search.query(), &RemoteQuery::All);

        // messages without subject do not match the empty pattern
        let candidates = [Envelope::new("1"), Envelope::new("2").with_subject("x")];
        let verified = search.verify(candidates);
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].id, "1");
    }

    #[test]
    fn unsupported_disjunct_keeps_every_match() {
        let inbox = Envelope::new("4")
            .with_subject("Meeting")
            .with_mailbox("INBOX");
        let term = SearchTerm::or(
            SearchTerm::subject("invoice"),
            SearchTerm::mailbox("INBOX").unwrap(),
        );
        let unsupported = HashSet::from_iter([TermKind::XMailbox]);
        let search = RemoteSearch::new(term, &unsupported).unwrap();

        assert!(search.needs_verification());
        assert_eq!(search.query(), &RemoteQuery::All);

        let mut candidates = envelopes();
        candidates.push(inbox);
        let verified = search.verify(candidates);
        let ids: Vec<_> = verified.iter().map(|envelope| envelope.id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "4"]);
    }

    #[test]
    fn negated_exact_term_needs_no_verification() {
        let term = SearchTerm::not(SearchTerm::subject("invoice"));
        let search = RemoteSearch::new(term, &HashSet::new()).unwrap();

        assert!(!search.needs_verification());
        assert_eq!(search.query().to_string(), r#"NOT SUBJECT "invoice""#);
    }

    #[test]
    fn untranslatable_term_is_an_error() {
        let term = SearchTerm::attachment("invoice");
        assert!(RemoteSearch::new(term, &HashSet::new()).is_err());
    }
}
