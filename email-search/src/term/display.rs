//! Module dedicated to the human-readable rendering of search terms.
//!
//! Terms are rendered using the search query syntax: `from "a@x" and
//! not (subject "x" or body "y")`.

use std::fmt;

use crate::{
    comparison::ComparablePattern,
    term::{
        AddressTerm, AttachmentTerm, BodyTerm, DateField, DateTerm, FileNameTerm, FlagTerm,
        HeaderExistsTerm, HeaderTerm, MailboxTerm, SearchTerm, SearchTermVisitor, SizeTerm,
        SubjectTerm, Term, UserFlagTerm,
    },
};

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.accept(&mut Printer { f })
    }
}

struct Printer<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl Printer<'_, '_> {
    /// Writes the given operand, surrounded by parenthesis when it
    /// is a binary term.
    fn operand(&mut self, term: &SearchTerm) -> fmt::Result {
        match term {
            SearchTerm::And(_, _) | SearchTerm::Or(_, _) => {
                write!(self.f, "(")?;
                term.accept(self)?;
                write!(self.f, ")")
            }
            term => term.accept(self),
        }
    }

    fn binary(&mut self, left: &SearchTerm, op: &str, right: &SearchTerm) -> fmt::Result {
        self.operand(left)?;
        write!(self.f, " {op} ")?;
        self.operand(right)
    }

    fn list<'a>(&mut self, name: &str, items: impl IntoIterator<Item = &'a str>) -> fmt::Result {
        write!(self.f, "{name}")?;
        for item in items {
            write!(self.f, " {item}")?;
        }
        Ok(())
    }

    fn comparison<V: fmt::Display>(
        &mut self,
        name: &str,
        pattern: &ComparablePattern<V>,
    ) -> fmt::Result {
        write!(
            self.f,
            "{name} {} {}",
            pattern.comparison(),
            pattern.value()
        )
    }
}

impl SearchTermVisitor for Printer<'_, '_> {
    type Output = fmt::Result;

    fn visit_address(&mut self, term: &AddressTerm) -> fmt::Result {
        write!(self.f, "{} {:?}", term.field(), term.pattern().as_str())
    }

    fn visit_subject(&mut self, term: &SubjectTerm) -> fmt::Result {
        write!(self.f, "subject {:?}", term.pattern().as_str())
    }

    fn visit_body(&mut self, term: &BodyTerm) -> fmt::Result {
        write!(self.f, "body {:?}", term.pattern().as_str())
    }

    fn visit_filename(&mut self, term: &FileNameTerm) -> fmt::Result {
        write!(self.f, "filename {:?}", term.pattern().as_str())
    }

    fn visit_header(&mut self, term: &HeaderTerm) -> fmt::Result {
        match term.value() {
            Some(value) => write!(self.f, "header {:?} {:?}", term.name(), value.as_str()),
            None => write!(self.f, "header {:?}", term.name()),
        }
    }

    fn visit_header_exists(&mut self, term: &HeaderExistsTerm) -> fmt::Result {
        write!(self.f, "header {:?}", term.pattern())
    }

    fn visit_flag(&mut self, term: &FlagTerm) -> fmt::Result {
        let name = if term.is_wanted() { "flag" } else { "unflag" };
        let flags: Vec<String> = term.pattern().iter().map(ToString::to_string).collect();
        self.list(name, flags.iter().map(String::as_str))
    }

    fn visit_user_flag(&mut self, term: &UserFlagTerm) -> fmt::Result {
        let name = if term.is_wanted() { "keyword" } else { "unkeyword" };
        self.list(name, term.pattern().iter().map(String::as_str))
    }

    fn visit_size(&mut self, term: &SizeTerm) -> fmt::Result {
        self.comparison("size", term.pattern())
    }

    fn visit_date(&mut self, term: &DateTerm) -> fmt::Result {
        match term.field() {
            DateField::Sent => self.comparison("date", term.pattern()),
            DateField::Received => self.comparison("received", term.pattern()),
        }
    }

    fn visit_attachment(&mut self, term: &AttachmentTerm) -> fmt::Result {
        write!(self.f, "attachment {:?}", term.pattern().as_str())
    }

    fn visit_mailbox(&mut self, term: &MailboxTerm) -> fmt::Result {
        write!(self.f, "mailbox {:?}", term.pattern())
    }

    fn visit_boolean(&mut self, value: bool) -> fmt::Result {
        write!(self.f, "{value}")
    }

    fn visit_and(&mut self, left: &SearchTerm, right: &SearchTerm) -> fmt::Result {
        self.binary(left, "and", right)
    }

    fn visit_or(&mut self, left: &SearchTerm, right: &SearchTerm) -> fmt::Result {
        self.binary(left, "or", right)
    }

    fn visit_not(&mut self, term: &SearchTerm) -> fmt::Result {
        write!(self.f, "not ")?;
        self.operand(term)
    }
}
