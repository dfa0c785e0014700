use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate, TimeZone};
use email_search::{
    comparison::ComparisonType::*,
    message::{Address, Envelope, Flag, MimePart},
    search, wildcard, RemoteSearch, SearchTerm, TermKind,
};

fn envelopes() -> Vec<Envelope> {
    vec![
        Envelope::new("1")
            .with_from("a@x")
            .with_subject("Invoice #1"),
        Envelope::new("2").with_from("b@x").with_subject("Meeting"),
    ]
}

#[test_log::test]
fn end_to_end() {
    let term = SearchTerm::and(SearchTerm::from_address("a@x"), SearchTerm::subject("inv*"));
    let found = search(envelopes(), &term);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "1");
    assert_eq!(found[0].subject.as_deref(), Some("Invoice #1"));
}

#[test_log::test]
fn search_with_literals() {
    let all = search(envelopes(), &SearchTerm::Boolean(true));
    assert_eq!(all, envelopes());

    let none = search(envelopes(), &SearchTerm::Boolean(false));
    assert!(none.is_empty());
}

#[test_log::test]
fn composite_terms_follow_boolean_algebra() {
    let date = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 5, 12, 0, 0)
        .unwrap();

    let messages = [
        Envelope::new("1")
            .with_from(Address::new(Some("Alice"), "alice@localhost"))
            .with_subject("Invoice #1")
            .with_flags("seen")
            .with_size(2048)
            .with_sent_date(date),
        Envelope::new("2")
            .with_to("bob@localhost")
            .with_subject("Meeting")
            .with_flags("flagged work")
            .with_size(512)
            .with_part(MimePart::text("text/plain", "Agenda attached")),
        Envelope::new("3"),
    ];

    let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let terms = [
        SearchTerm::from_address("alice"),
        SearchTerm::to_address("bob@*"),
        SearchTerm::subject("meet?ng"),
        SearchTerm::body("agenda"),
        SearchTerm::flag([Flag::Seen], true).unwrap(),
        SearchTerm::user_flag(["work"], false).unwrap(),
        SearchTerm::size(GreaterEquals, 1024),
        SearchTerm::sent_date(Equals, day),
        SearchTerm::Boolean(true),
        SearchTerm::Boolean(false),
    ];

    for msg in &messages {
        for a in &terms {
            for b in &terms {
                let (ma, mb) = (a.matches(msg), b.matches(msg));

                assert_eq!(SearchTerm::and(a.clone(), b.clone()).matches(msg), ma && mb);
                assert_eq!(SearchTerm::or(a.clone(), b.clone()).matches(msg), ma || mb);
            }
            assert_eq!(SearchTerm::not(a.clone()).matches(msg), !a.matches(msg));
        }
    }
}

#[test_log::test]
fn wildcards() {
    let matches = |pattern: &str, text: &str| {
        let envelope = Envelope::new("1").with_subject(text);
        SearchTerm::subject(pattern).matches(&envelope)
    };

    assert!(matches("inv*ce", "invoice"));
    assert!(matches("inv*ce", "invce"));
    assert!(!matches("inv*ce", "invoicex"));
    assert!(matches("a?c", "abc"));
    assert!(!matches("a?c", "ac"));
    assert!(!matches("a?c", "abbc"));

    assert_eq!(wildcard::non_wildcard_part("foo*barit?it"), "barit");
    assert_eq!(wildcard::non_wildcard_part("**?"), "");
    assert_eq!(wildcard::non_wildcard_part("plain"), "plain");
}

#[test_log::test]
fn filtering_never_broadens_conjunctions() {
    let term = SearchTerm::and(SearchTerm::subject("invoice"), SearchTerm::body("overdue"));

    let filtered = term.filter(&HashSet::from_iter([TermKind::Body]));
    assert_eq!(filtered.simplify(), SearchTerm::subject("invoice"));

    let filtered = term.filter(&HashSet::from_iter([TermKind::Subject, TermKind::Body]));
    assert_eq!(filtered.simplify(), SearchTerm::Boolean(false));
    assert!(search(envelopes(), &filtered).is_empty());
}

#[test_log::test]
fn filtering_under_negation_is_preserved() {
    let term = SearchTerm::not(SearchTerm::attachment("invoice"));
    let filtered = term.filter(&HashSet::from_iter([TermKind::Attachment]));

    assert_eq!(filtered, SearchTerm::not(SearchTerm::Boolean(false)));
    assert_eq!(filtered.simplify(), SearchTerm::Boolean(true));
}

#[test_log::test]
fn remote_search_keeps_every_match() {
    let unsupported = HashSet::from_iter([TermKind::Attachment]);
    let terms = [
        SearchTerm::not(SearchTerm::subject("inv*")),
        SearchTerm::not(SearchTerm::subject("")),
        SearchTerm::or(
            SearchTerm::subject("meeting"),
            SearchTerm::attachment("invoice"),
        ),
        SearchTerm::not(SearchTerm::and(
            SearchTerm::from_address("a@x"),
            SearchTerm::attachment("invoice"),
        )),
    ];

    for term in terms {
        let expected = search(envelopes(), &term);
        let remote = RemoteSearch::new(term.clone(), &unsupported).unwrap();

        // every message is a candidate once the query selects them all
        assert!(remote.query().is_all(), "{term}");
        assert!(remote.needs_verification(), "{term}");
        assert_eq!(remote.verify(envelopes()), expected, "{term}");
    }
}

#[test_log::test]
fn size_equals_translation() {
    let query = SearchTerm::size(Equals, 100).translate().unwrap();
    assert_eq!(query.to_string(), "(LARGER 99 SMALLER 101)");
}
