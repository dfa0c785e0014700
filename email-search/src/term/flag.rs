//! Module dedicated to the flag search terms.
//!
//! Standard flags and user flags (labels) are matched by two
//! distinct terms, because remote servers search them using distinct
//! keys.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    fetch::{FetchItem, FetchPlan},
    message::{Flag, Flags, MessageSource, MessageView},
    remote::{self, RemoteQuery},
    term::{Term, TermKind},
    Error, Result,
};

/// The standard flag search term.
///
/// When wanted, every flag of the term needs to be set on the
/// message. When not wanted, none of them can be set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlagTerm {
    flags: Flags,
    wanted: bool,
}

impl FlagTerm {
    pub fn new(flags: impl IntoIterator<Item = Flag>, wanted: bool) -> Result<Self> {
        let flags = Flags::from_iter(flags);

        if flags.is_empty() {
            return Err(Error::BuildFlagTermEmptyError);
        }

        if let Some(flag) = flags.iter().find(|flag| flag.is_custom()) {
            return Err(Error::BuildFlagTermCustomFlagError(flag.to_string()));
        }

        Ok(Self { flags, wanted })
    }

    pub fn is_wanted(&self) -> bool {
        self.wanted
    }

    fn matches_flags(&self, flags: &Flags) -> bool {
        if self.wanted {
            self.flags.iter().all(|flag| flags.contains(flag))
        } else {
            !self.flags.iter().any(|flag| flags.contains(flag))
        }
    }
}

impl Term for FlagTerm {
    type Pattern = Flags;

    fn kind(&self) -> TermKind {
        TermKind::Flag
    }

    fn pattern(&self) -> &Flags {
        &self.flags
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        self.matches_flags(msg.flags())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        Ok(self.matches_flags(&msg.flags()?))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        let query = self
            .flags
            .iter()
            .map(|flag| RemoteQuery::Flag(flag.clone(), self.wanted))
            .reduce(RemoteQuery::and)
            .unwrap_or(RemoteQuery::All);

        Ok(query)
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::Flags);
    }

    fn is_ascii(&self) -> bool {
        true
    }
}

/// The user flag search term.
///
/// Same semantics as [`FlagTerm`], over custom flags. Labels are
/// compared case-insensitively.
///
/// Labels which are not IMAP atoms (see [`remote::is_atom`]) cannot
/// be sent to remote servers: they are left out of the remote query,
/// which then selects a superset of the matching messages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserFlagTerm {
    labels: BTreeSet<String>,
    wanted: bool,
}

impl UserFlagTerm {
    pub fn new(labels: impl IntoIterator<Item = impl ToString>, wanted: bool) -> Result<Self> {
        let mut set = BTreeSet::new();

        for label in labels {
            let label = label.to_string().trim().to_owned();
            if label.is_empty() {
                return Err(Error::BuildUserFlagTermEmptyLabelError);
            }
            set.insert(label);
        }

        if set.is_empty() {
            return Err(Error::BuildUserFlagTermEmptyError);
        }

        Ok(Self {
            labels: set,
            wanted,
        })
    }

    pub fn is_wanted(&self) -> bool {
        self.wanted
    }

    fn matches_flags(&self, flags: &Flags) -> bool {
        if self.wanted {
            self.labels.iter().all(|label| flags.contains_label(label))
        } else {
            !self.labels.iter().any(|label| flags.contains_label(label))
        }
    }
}

impl Term for UserFlagTerm {
    type Pattern = BTreeSet<String>;

    fn kind(&self) -> TermKind {
        TermKind::UserFlag
    }

    fn pattern(&self) -> &BTreeSet<String> {
        &self.labels
    }

    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        self.matches_flags(msg.flags())
    }

    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        Ok(self.matches_flags(&msg.flags()?))
    }

    fn translate(&self) -> Result<RemoteQuery> {
        let query = self
            .labels
            .iter()
            .filter(|label| {
                let atom = remote::is_atom(label);
                if !atom {
                    debug!("cannot send label {label:?} to remote server, skipping it");
                }
                atom
            })
            .map(|label| RemoteQuery::Keyword(label.clone(), self.wanted))
            .reduce(RemoteQuery::and)
            .unwrap_or(RemoteQuery::All);

        Ok(query)
    }

    fn translates_exactly(&self) -> bool {
        self.labels.iter().all(|label| remote::is_atom(label))
    }

    fn contribute_fetch(&self, plan: &mut FetchPlan) {
        plan.add(FetchItem::Flags);
    }

    fn is_ascii(&self) -> bool {
        self.labels.iter().all(|label| label.is_ascii())
    }
}
