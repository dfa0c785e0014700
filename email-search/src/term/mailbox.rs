//! Module dedicated to the mailbox search term.

use crate::{
    fetch::FetchPlan,
    message::{MessageSource, MessageView},
    remote::RemoteQuery,
    term::{Term, TermKind},
    Error, Result,
};

/// The mailbox search term.
///
/// Matches messages living in the mailbox of the given name, compared
/// case-insensitively. Remote servers search one mailbox at a time,
/// which is why this term cannot be translated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MailboxTerm {
    name: String,
}

impl MailboxTerm {
    pub fn new(name: impl ToString) -> Result<Self> {
        let name = name.to_string();

        if name.trim().is_empty() {
            return Err(Error::BuildMailboxTermEmptyNameError);
        }

        Ok(Self { name })
    }

    fn matches_name(&self, name: Option<&str>) -> bool {
        name.map_or(false, |name| name.to_lowercase() == self.name.to_lowercase())
    }
}

impl Term for MailboxTerm {
    type Pattern = str;

    fn kind(&self) -> TermKind {
        TermKind::XMailbox
    }

    fn pattern(&self) -> &str {
        &self.name
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        self.matches_name(msg.mailbox())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        Ok(self.matches_name(msg.mailbox()?.as_deref()))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        Err(Error::TranslateUnsupportedTermError(self.kind()))
    }

    fn translates_exactly(&self) -> bool {
        false
    }

    fn contribute_fetch(&self, _plan: &mut FetchPlan) {
        // the mailbox is known before fetching anything
    }

    fn is_ascii(&self) -> bool {
        self.name.is_ascii()
    }
}
