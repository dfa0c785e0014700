//! Module dedicated to the address search term.

use tracing::trace;

use crate::{
    fetch::{FetchItem, FetchPlan},
    message::{address, parsed, AddressField, MessageSource, MessageView},
    pattern::TextPattern,
    remote::RemoteQuery,
    term::{Term, TermKind},
    Result,
};

/// The address search term.
///
/// Matches messages whose addresses of the given field, joined
/// together (`Name <addr>, addr`), match the pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressTerm {
    field: AddressField,
    pattern: TextPattern,
}

impl AddressTerm {
    pub fn new(field: AddressField, pattern: impl ToString) -> Self {
        Self {
            field,
            pattern: TextPattern::new(pattern),
        }
    }

    pub fn field(&self) -> AddressField {
        self.field
    }
}

impl Term for AddressTerm {
    type Pattern = TextPattern;

    fn kind(&self) -> TermKind {
        match self.field {
            AddressField::From => TermKind::From,
            AddressField::To => TermKind::To,
            AddressField::Cc => TermKind::Cc,
            AddressField::Bcc => TermKind::Bcc,
        }
    }

    fn pattern(&self) -> &TextPattern {
        &self.pattern
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        let addrs = address::join(msg.addresses(self.field));
        self.pattern.matches(addrs.as_deref())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        let raw = msg.raw_headers()?;
        let parsed = parsed::parse(msg.id(), &raw)?;
        let addrs = address::join(&parsed::addresses(&parsed, self.field));
        trace!(
            "{} addresses of message {}: {addrs:?}",
            self.field,
            msg.id()
        );
        Ok(self.pattern.matches(addrs.as_deref()))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Ok(RemoteQuery::text(self.pattern.narrowing(), |text| {
            RemoteQuery::Address(self.field, text)
        }))
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
