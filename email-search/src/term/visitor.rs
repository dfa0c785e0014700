//! Module dedicated to search term visitors.
//!
//! Visitors let code outside of this module process a tree by
//! concrete kind, without the tree exposing its internals.

use std::collections::BTreeSet;

use crate::term::{
    AddressTerm, AttachmentTerm, BodyTerm, DateTerm, FileNameTerm, FlagTerm, HeaderExistsTerm,
    HeaderTerm, MailboxTerm, SearchTerm, SizeTerm, SubjectTerm, Term, TermKind, UserFlagTerm,
};

/// The search term visitor.
///
/// Composite terms hand their children over to the visitor, which
/// decides whether and in which order to visit them.
pub trait SearchTermVisitor {
    type Output;

    fn visit_address(&mut self, term: &AddressTerm) -> Self::Output;
    fn visit_subject(&mut self, term: &SubjectTerm) -> Self::Output;
    fn visit_body(&mut self, term: &BodyTerm) -> Self::Output;
    fn visit_filename(&mut self, term: &FileNameTerm) -> Self::Output;
    fn visit_header(&mut self, term: &HeaderTerm) -> Self::Output;
    fn visit_header_exists(&mut self, term: &HeaderExistsTerm) -> Self::Output;
    fn visit_flag(&mut self, term: &FlagTerm) -> Self::Output;
    fn visit_user_flag(&mut self, term: &UserFlagTerm) -> Self::Output;
    fn visit_size(&mut self, term: &SizeTerm) -> Self::Output;
    fn visit_date(&mut self, term: &DateTerm) -> Self::Output;
    fn visit_attachment(&mut self, term: &AttachmentTerm) -> Self::Output;
    fn visit_mailbox(&mut self, term: &MailboxTerm) -> Self::Output;
    fn visit_boolean(&mut self, value: bool) -> Self::Output;
    fn visit_and(&mut self, left: &SearchTerm, right: &SearchTerm) -> Self::Output;
    fn visit_or(&mut self, left: &SearchTerm, right: &SearchTerm) -> Self::Output;
    fn visit_not(&mut self, term: &SearchTerm) -> Self::Output;
}

impl SearchTerm {
    /// Dispatches the term to the matching method of the given
    /// visitor.
    pub fn accept<V: SearchTermVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Address(term) => visitor.visit_address(term),
            Self::Subject(term) => visitor.visit_subject(term),
            Self::Body(term) => visitor.visit_body(term),
            Self::FileName(term) => visitor.visit_filename(term),
            Self::Header(term) => visitor.visit_header(term),
            Self::HeaderExists(term) => visitor.visit_header_exists(term),
            Self::Flag(term) => visitor.visit_flag(term),
            Self::UserFlag(term) => visitor.visit_user_flag(term),
            Self::Size(term) => visitor.visit_size(term),
            Self::Date(term) => visitor.visit_date(term),
            Self::Attachment(term) => visitor.visit_attachment(term),
            Self::XMailbox(term) => visitor.visit_mailbox(term),
            Self::Boolean(value) => visitor.visit_boolean(*value),
            Self::And(left, right) => visitor.visit_and(left, right),
            Self::Or(left, right) => visitor.visit_or(left, right),
            Self::Not(term) => visitor.visit_not(term),
        }
    }
}

/// Visitor collecting the kinds of every term of a tree.
#[derive(Debug, Default)]
pub(crate) struct KindCollector {
    kinds: BTreeSet<TermKind>,
}

impl KindCollector {
    pub(crate) fn into_kinds(self) -> BTreeSet<TermKind> {
        self.kinds
    }

    fn add(&mut self, kind: TermKind) {
        self.kinds.insert(kind);
    }
}

impl SearchTermVisitor for KindCollector {
    type Output = ();

    fn visit_address(&mut self, term: &AddressTerm) {
        self.add(term.kind())
    }

    fn visit_subject(&mut self, term: &SubjectTerm) {
        self.add(term.kind())
    }

    fn visit_body(&mut self, term: &BodyTerm) {
        self.add(term.kind())
    }

    fn visit_filename(&mut self, term: &FileNameTerm) {
        self.add(term.kind())
    }

    fn visit_header(&mut self, term: &HeaderTerm) {
        self.add(term.kind())
    }

    fn visit_header_exists(&mut self, term: &HeaderExistsTerm) {
        self.add(term.kind())
    }

    fn visit_flag(&mut self, term: &FlagTerm) {
        self.add(term.kind())
    }

    fn visit_user_flag(&mut self, term: &UserFlagTerm) {
        self.add(term.kind())
    }

    fn visit_size(&mut self, term: &SizeTerm) {
        self.add(term.kind())
    }

    fn visit_date(&mut self, term: &DateTerm) {
        self.add(term.kind())
    }

    fn visit_attachment(&mut self, term: &AttachmentTerm) {
        self.add(term.kind())
    }

    fn visit_mailbox(&mut self, term: &MailboxTerm) {
        self.add(term.kind())
    }

    fn visit_boolean(&mut self, _value: bool) {
        self.add(TermKind::Boolean)
    }

    fn visit_and(&mut self, left: &SearchTerm, right: &SearchTerm) {
        self.add(TermKind::And);
        left.accept(self);
        right.accept(self);
    }

    fn visit_or(&mut self, left: &SearchTerm, right: &SearchTerm) {
        self.add(TermKind::Or);
        left.accept(self);
        right.accept(self);
    }

    fn visit_not(&mut self, term: &SearchTerm) {
        self.add(TermKind::Not);
        term.accept(self);
    }
}
