use std::{borrow::Cow, cell::Cell, collections::HashSet, io};

use chrono::{DateTime, FixedOffset, NaiveDate};
use email_search::{
    comparison::ComparisonType::*,
    message::{Envelope, Flag, Flags, MessageSource, RawMessage},
    search_sources, Error, RemoteSearch, Result, SearchConfig, SearchTerm, TermKind,
};

const RAW: &str = concat!(
    "From: =?utf-8?q?J=C3=A9r=C3=B4me?= <jerome@localhost>\r\n",
    "To: Alice <alice@localhost>, bob@localhost\r\n",
    "Subject: =?iso-8859-1?q?Facture_impay=E9e?=\r\n",
    "Date: Tue, 5 Mar 2024 10:30:00 +0100\r\n",
    "List-Id: <dev.lists.localhost>\r\n",
    "Content-Type: multipart/mixed; boundary=\"b\"\r\n",
    "\r\n",
    "--b\r\n",
    "Content-Type: text/plain; charset=iso-8859-1\r\n",
    "Content-Transfer-Encoding: quoted-printable\r\n",
    "\r\n",
    "Merci de r=E9gler la facture.\r\n",
    "--b\r\n",
    "Content-Type: application/pdf\r\n",
    "Content-Disposition: attachment; filename=\"facture-42.pdf\"\r\n",
    "Content-Transfer-Encoding: base64\r\n",
    "\r\n",
    "JVBERg==\r\n",
    "--b--\r\n",
);

fn raw() -> RawMessage {
    RawMessage::new("42", RAW)
        .with_flags("seen $Invoice")
        .with_mailbox("INBOX")
}

#[test_log::test]
fn raw_message_is_decoded() {
    let raw = raw();
    let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

    for term in [
        SearchTerm::from_address("jérôme"),
        SearchTerm::to_address("alice <alice@*"),
        SearchTerm::subject("facture impayée"),
        SearchTerm::body("régler"),
        SearchTerm::filename("*.pdf"),
        SearchTerm::attachment("facture"),
        SearchTerm::header_exists("list-id").unwrap(),
        SearchTerm::flag([Flag::Seen], true).unwrap(),
        SearchTerm::user_flag(["$invoice"], true).unwrap(),
        SearchTerm::size(GreaterThan, 100),
        SearchTerm::sent_date(Equals, day),
        SearchTerm::mailbox("inbox").unwrap(),
    ] {
        assert!(term.matches_source(&raw), "{term}");
        let not = SearchTerm::not(term.clone());
        assert!(!not.matches_source(&raw), "not {term}");
    }
}

#[test_log::test]
fn envelope_and_source_agree() {
    let raw = raw();
    let envelope = Envelope::from_bytes("42", RAW).unwrap();

    for term in [
        SearchTerm::from_address("jerome@localhost"),
        SearchTerm::to_address("bob"),
        SearchTerm::cc_address("bob"),
        SearchTerm::subject("facture*"),
        SearchTerm::body("facture"),
        SearchTerm::body("*pdf*"),
        SearchTerm::attachment("facture"),
        SearchTerm::size(LessThan, 10),
    ] {
        assert_eq!(term.matches(&envelope), term.matches_source(&raw), "{term}");
    }
}

/// A message source whose store fails after a given number of
/// accesses.
struct FlakySource {
    raw: RawMessage,
    accesses: Cell<usize>,
    limit: usize,
}

impl FlakySource {
    fn new(limit: usize) -> Self {
        Self {
            raw: raw(),
            accesses: Cell::new(0),
            limit,
        }
    }

    fn access(&self) -> Result<()> {
        let accesses = self.accesses.get() + 1;
        self.accesses.set(accesses);

        if accesses > self.limit {
            let err = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset");
            Err(Error::FetchMessageDataError(Box::new(err), self.id().to_owned()))
        } else {
            Ok(())
        }
    }
}

impl MessageSource for FlakySource {
    fn id(&self) -> &str {
        self.raw.id()
    }

    fn raw_message(&self) -> Result<Cow<'_, [u8]>> {
        self.access()?;
        self.raw.raw_message()
    }

    fn flags(&self) -> Result<Flags> {
        self.access()?;
        self.raw.flags()
    }

    fn received_date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.access()?;
        self.raw.received_date()
    }

    fn mailbox(&self) -> Result<Option<String>> {
        Err(Error::MessageExpungedError(self.id().to_owned()))
    }
}

#[test_log::test]
fn failing_leaf_does_not_match() {
    let source = FlakySource::new(0);

    assert!(!SearchTerm::subject("facture").matches_source(&source));
    let mailbox = SearchTerm::mailbox("INBOX").unwrap();
    assert!(!mailbox.matches_source(&source));
    let subject = SearchTerm::subject("facture");
    assert!(subject.try_matches_source(&source).is_err());
}

#[test_log::test]
fn failing_leaf_does_not_abort_the_tree() {
    // the first access succeeds, the second one fails
    let source = FlakySource::new(1);
    let term = SearchTerm::or(
        SearchTerm::subject("nothing like this"),
        SearchTerm::or(
            SearchTerm::flag([Flag::Seen], true).unwrap(),
            SearchTerm::mailbox("INBOX").unwrap(),
        ),
    );

    assert!(!term.matches_source(&source));

    let source = FlakySource::new(1);
    let term = SearchTerm::or(
        SearchTerm::mailbox("INBOX").unwrap(),
        SearchTerm::subject("facture"),
    );

    assert!(term.matches_source(&source));
}

#[test_log::test]
fn batch_skips_failing_sources() {
    let sources = [
        FlakySource::new(usize::MAX),
        FlakySource::new(0),
        FlakySource::new(usize::MAX),
    ];

    let found = search_sources(&sources, &SearchTerm::body("facture"));
    assert_eq!(found.len(), 2);
}

#[test_log::test]
fn filter_then_verify() {
    let envelope = Envelope::from_bytes("42", RAW)
        .unwrap()
        .with_mailbox("INBOX");
    let other = Envelope::new("43")
        .with_subject("Facture payée")
        .with_mailbox("Archives");

    let term = SearchTerm::and(
        SearchTerm::subject("facture*"),
        SearchTerm::mailbox("INBOX").unwrap(),
    );

    let search = SearchConfig::default().remote_search(term).unwrap();
    assert_eq!(search.query().to_string(), r#"SUBJECT "facture""#);
    assert!(search.needs_verification());
    assert!(search.fetch_plan().iter().count() > 0);

    // the remote server returns both messages, only one really
    // matches
    let verified = search.verify([envelope, other]);
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].id, "42");
}

#[test_log::test]
fn untranslatable_without_filter() {
    let term = SearchTerm::or(SearchTerm::subject("x"), SearchTerm::filename("x.pdf"));

    assert!(matches!(
        term.translate().unwrap_err(),
        Error::TranslateUnsupportedTermError(TermKind::FileName),
    ));
    assert!(RemoteSearch::new(term, &HashSet::new()).is_err());
}
