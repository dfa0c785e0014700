//! Module dedicated to the text search terms: subject, body and file
//! name.

use tracing::trace;

use crate::{
    fetch::{FetchItem, FetchPlan},
    message::{parsed, MessageSource, MessageView, MimePart},
    pattern::TextPattern,
    remote::RemoteQuery,
    term::{Term, TermKind},
    Error, Result,
};

/// The subject search term.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectTerm {
    pattern: TextPattern,
}

impl SubjectTerm {
    pub fn new(pattern: impl ToString) -> Self {
        Self {
            pattern: TextPattern::new(pattern),
        }
    }
}

impl Term for SubjectTerm {
    type Pattern = TextPattern;

    fn kind(&self) -> TermKind {
        TermKind::Subject
    }

    fn pattern(&self) -> &TextPattern {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        self.pattern.matches(msg.subject())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let raw = msg.raw_headers()?;
        let parsed = parsed::parse(msg.id(), &raw)?;
        Ok(self.pattern.matches(parsed.subject()))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Ok(RemoteQuery::text(self.pattern.narrowing(), RemoteQuery::Subject))
    }

    fn translates_exactly(&self) -> bool {
        self.pattern.translates_exactly()
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::Envelope);
    }

    fn is_ascii(&self) -> bool {
        self.pattern.is_ascii()
    }

    fn contains_wildcard(&self) -> bool {
        self.pattern.contains_wildcard()
    }
}

/// The body search term.
///
/// The body is the text of the first textual part of the MIME tree,
/// HTML being converted to plain text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BodyTerm {
    pattern: TextPattern,
}

impl BodyTerm {
    pub fn new(pattern: impl ToString) -> Self {
        Self {
            pattern: TextPattern::new(pattern),
        }
    }
}

impl Term for BodyTerm {
    type Pattern = TextPattern;

    fn kind(&self) -> TermKind {
        TermKind::Body
    }

    fn pattern(&self) -> &TextPattern {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        let text = msg.part().and_then(MimePart::body_text);
        self.pattern.matches(text.as_deref())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let tree = parse_mime_tree(msg)?;
        let text = tree.body_text();
        trace!("body of message {} found: {}", msg.id(), text.is_some());
        Ok(self.pattern.matches(text.as_deref()))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Ok(RemoteQuery::text(self.pattern.narrowing(), RemoteQuery::Body))
    }

    /// Remote servers search the text of every part, not only the
    /// first textual one.
    fn translates_exactly(&self) -> bool {
        false
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::FullBody);
    }

    fn is_ascii(&self) -> bool {
        self.pattern.is_ascii()
    }

    fn contains_wildcard(&self) -> bool {
        self.pattern.contains_wildcard()
    }
}

/// The file name search term.
///
/// Matches messages having at least one part whose file name matches
/// the pattern, whatever its disposition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileNameTerm {
    pattern: TextPattern,
}

impl FileNameTerm {
    pub fn new(pattern: impl ToString) -> Self {
        Self {
            pattern: TextPattern::new(pattern),
        }
    }

    fn matches_tree(&self, tree: &MimePart) -> bool {
        tree.walk()
            .any(|part| self.pattern.matches(part.filename.as_deref()))
    }
}

impl Term for FileNameTerm {
    type Pattern = TextPattern;

    fn kind(&self) -> TermKind {
        TermKind::FileName
    }

    fn pattern(&self) -> &TextPattern {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        match msg.part() {
            Some(tree) => self.matches_tree(tree),
            None => false,
        }
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let tree = parse_mime_tree(msg)?;
        Ok(self.matches_tree(&tree))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Err(Error::TranslateUnsupportedTermError(self.kind()))
    }

    fn translates_exactly(&self) -> bool {
        false
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::ContentInfo);
    }

    fn is_ascii(&self) -> bool {
        self.pattern.is_ascii()
    }

    fn contains_wildcard(&self) -> bool {
        self.pattern.contains_wildcard()
    }
}

/// Fetches then parses the whole message into a MIME tree.
pub(crate) fn parse_mime_tree<S: MessageSource + ?Sized>(msg: &S) -> Result<MimePart> {
    let raw = msg.raw_message()?;
    let parsed = parsed::parse(msg.id(), &raw)?;
    Ok(MimePart::from_parsed(&parsed))
}

#[cfg(test)]
mod tests {
    use crate::{
        message::{Envelope, MimePart, RawMessage},
        remote::RemoteQuery,
        term::Term,
        Error,
    };

    use super::{BodyTerm, FileNameTerm, SubjectTerm};

    const RAW: &str = concat!(
        "Subject: =?utf-8?q?Caf=C3=A9?= meeting\r\n",
        "Content-Type: multipart/alternative; boundary=\"b\"\r\n",
        "\r\n",
        "--b\r\n",
        "Content-Type: text/html; charset=utf-8\r\n",
        "\r\n",
        "<p>The <b>agenda</b> is attached</p>\r\n",
        "--b\r\n",
        "Content-Type: application/pdf; name=\"agenda.pdf\"\r\n",
        "\r\n",
        "%PDF\r\n",
        "--b--\r\n",
    );

    #[test]
    fn subject() {
        let envelope = Envelope::new("1").with_subject("Invoice #1");

        assert!(SubjectTerm::new("invoice").matches(&envelope));
        assert!(SubjectTerm::new("inv*").matches(&envelope));
        assert!(!SubjectTerm::new("meeting").matches(&envelope));
        assert!(!SubjectTerm::new("").matches(&Envelope::new("2")));

        let raw = RawMessage::new("1", RAW);
        assert!(SubjectTerm::new("café").matches_source(&raw));
    }

    #[test]
    fn body_converts_html() {
        let raw = RawMessage::new("1", RAW);

        assert!(BodyTerm::new("the agenda").matches_source(&raw));
        assert!(!BodyTerm::new("<b>").matches_source(&raw));

        let envelope = Envelope::from_bytes("1", RAW).unwrap();
        assert!(BodyTerm::new("*agenda*attached*").matches(&envelope));
        assert!(!BodyTerm::new("agenda").matches(&Envelope::new("2")));
    }

    #[test]
    fn file_name() {
        let tree = MimePart::multipart(
            "mixed",
            [
                MimePart::text("text/plain", "hi"),
                MimePart::new("image/png").with_filename("Photo.PNG"),
            ],
        );
        let envelope = Envelope::new("1").with_part(tree);

        assert!(FileNameTerm::new("photo").matches(&envelope));
        assert!(FileNameTerm::new("*.png").matches(&envelope));
        assert!(!FileNameTerm::new("*.pdf").matches(&envelope));
        assert!(!FileNameTerm::new("photo").matches(&Envelope::new("2")));

        let raw = RawMessage::new("1", RAW);
        assert!(FileNameTerm::new("agenda.pdf").matches_source(&raw));
    }

    #[test]
    fn translate() {
        assert_eq!(
            SubjectTerm::new("inv?ice #*").translate().unwrap(),
            RemoteQuery::Subject(String::from("ice #")),
        );
        assert_eq!(
            BodyTerm::new("overdue").translate().unwrap(),
            RemoteQuery::Body(String::from("overdue")),
        );
        assert!(matches!(
            FileNameTerm::new("x").translate().unwrap_err(),
            Error::TranslateUnsupportedTermError(_),
        ));
    }
}
