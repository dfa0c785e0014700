//! Module dedicated to the attachment search term.

use crate::{
    fetch::{FetchItem, FetchPlan},
    message::{MessageSource, MessageView, MimePart},
    pattern::TextPattern,
    remote::RemoteQuery,
    term::{text::parse_mime_tree, Term, TermKind},
    Error, Result,
};

/// The attachment search term.
///
/// Matches messages having at least one part disposed as attachment
/// whose file name matches the pattern. Without MIME tree, the term
/// cannot decide and does not match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttachmentTerm {
    pattern: TextPattern,
}

impl AttachmentTerm {
    pub fn new(pattern: impl ToString) -> Self {
        Self {
            pattern: TextPattern::new(pattern),
        }
    }

    fn matches_tree(&self, tree: &MimePart) -> bool {
        tree.walk()
            .filter(|part| part.attachment)
            .any(|part| self.pattern.matches(part.filename.as_deref()))
    }
}

impl Term for AttachmentTerm {
    type Pattern = TextPattern;

    fn kind(&self) -> TermKind {
        TermKind::Attachment
    }

    fn pattern(&self) -> &TextPattern {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        msg.part().map_or(false, |tree| self.matches_tree(tree))
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
