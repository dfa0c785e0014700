//! Module dedicated to search terms.
//!
//! The core concept of this module is the [`SearchTerm`] enum, a
//! tree of predicates deciding whether a message matches a query.
//! The same tree can be:
//!
//! - evaluated against an in-memory [`MessageView`], see
//!   [`SearchTerm::matches`]
//! - evaluated against a possibly-lazy [`MessageSource`], see
//!   [`SearchTerm::matches_source`]
//! - translated into a [`RemoteQuery`], see [`SearchTerm::translate`]
//! - rewritten without the term kinds a remote server does not
//!   support, see [`SearchTerm::filter`]
//! - approximated by a remote query selecting a superset of the
//!   matching messages, see [`SearchTerm::translate_superset`]
//!
//! Leaf terms live in their own modules and share the [`Term`]
//! contract.

pub mod address;
pub mod attachment;
pub mod comparable;
mod display;
pub mod filter;
pub mod flag;
pub mod header;
pub mod mailbox;
pub mod superset;
pub mod text;
pub mod visitor;

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::NaiveDate;
use tracing::{debug, warn};

#[doc(inline)]
pub use self::{
    address::AddressTerm,
    attachment::AttachmentTerm,
    comparable::{DateField, DateTerm, SizeTerm},
    flag::{FlagTerm, UserFlagTerm},
    header::{HeaderExistsTerm, HeaderPattern, HeaderTerm},
    mailbox::MailboxTerm,
    superset::Approximation,
    text::{BodyTerm, FileNameTerm, SubjectTerm},
    visitor::SearchTermVisitor,
};
use crate::{
    comparison::{ComparablePattern, ComparisonType},
    fetch::FetchPlan,
    message::{AddressField, Flag, MessageSource, MessageView},
    remote::RemoteQuery,
    Error, Result,
};

/// The kind of a search term.
///
/// Kinds are used to tell the filter which terms a remote server
/// cannot evaluate.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum TermKind {
    From,
    To,
    Cc,
    Bcc,
    Subject,
    Body,
    FileName,
    Header,
    HeaderExists,
    Flag,
    UserFlag,
    Size,
    SentDate,
    ReceivedDate,
    Attachment,
    XMailbox,
    Boolean,
    And,
    Or,
    Not,
}

impl TermKind {
    /// Every term kind, leaves first.
    pub const ALL: [TermKind; 20] = [
        Self::From,
        Self::To,
        Self::Cc,
        Self::Bcc,
        Self::Subject,
        Self::Body,
        Self::FileName,
        Self::Header,
        Self::HeaderExists,
        Self::Flag,
        Self::UserFlag,
        Self::Size,
        Self::SentDate,
        Self::ReceivedDate,
        Self::Attachment,
        Self::XMailbox,
        Self::Boolean,
        Self::And,
        Self::Or,
        Self::Not,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::From => "from",
            Self::To => "to",
            Self::Cc => "cc",
            Self::Bcc => "bcc",
            Self::Subject => "subject",
            Self::Body => "body",
            Self::FileName => "file-name",
            Self::Header => "header",
            Self::HeaderExists => "header-exists",
            Self::Flag => "flag",
            Self::UserFlag => "user-flag",
            Self::Size => "size",
            Self::SentDate => "sent-date",
            Self::ReceivedDate => "received-date",
            Self::Attachment => "attachment",
            Self::XMailbox => "x-mailbox",
            Self::Boolean => "boolean",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TermKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();

        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str().eq_ignore_ascii_case(name)
                    || kind.as_str().replace('-', "_").eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| Error::ParseTermKindError(name.to_owned()))
    }
}

/// The contract shared by every leaf search term.
pub trait Term {
    /// The value the term matches against.
    type Pattern: ?Sized;

    fn kind(&self) -> TermKind;

    fn pattern(&self) -> &Self::Pattern;

    /// Evaluates the term against an in-memory message view.
    fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool;

    /// Evaluates the term against a message source, propagating
    /// source errors.
    fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool>;

    /// Evaluates the term against a message source.
    ///
    /// Errors are logged then considered as a mismatch.
    fn matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> bool {
        match self.try_matches_source(msg) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(
                    "cannot evaluate {} term against message {}, skipping it: {err}",
                    self.kind(),
                    msg.id()
                );
                debug!("{err:?}");
                false
            }
        }
    }

    /// Translates the term into a remote query.
    ///
    /// The query selects at least every message matching the term.
    fn translate(&self) -> Result<RemoteQuery>;

    /// Returns `true` if the remote query selects exactly the
    /// messages matching the term, `false` if it selects a superset.
    fn translates_exactly(&self) -> bool {
        !self.contains_wildcard()
    }

    /// Declares the message data the term needs.
    fn contribute_fetch(&self, plan: &mut FetchPlan);

    fn is_ascii(&self) -> bool;

    fn contains_wildcard(&self) -> bool {
        false
    }
}

/// The search term.
///
/// Composite terms own their children, and the whole tree is
/// immutable: rewriting a tree (see [`SearchTerm::filter`]) always
/// builds a new one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SearchTerm {
    Address(AddressTerm),
    Subject(SubjectTerm),
    Body(BodyTerm),
    FileName(FileNameTerm),
    Header(HeaderTerm),
    HeaderExists(HeaderExistsTerm),
    Flag(FlagTerm),
    UserFlag(UserFlagTerm),
    Size(SizeTerm),
    Date(DateTerm),
    Attachment(AttachmentTerm),
    XMailbox(MailboxTerm),
    /// Literal term, used as neutral or failing element when
    /// rewriting trees.
    Boolean(bool),
    And(Box<SearchTerm>, Box<SearchTerm>),
    Or(Box<SearchTerm>, Box<SearchTerm>),
    Not(Box<SearchTerm>),
}

impl SearchTerm {
    pub fn address(field: AddressField, pattern: impl ToString) -> Self {
        Self::Address(AddressTerm::new(field, pattern))
    }

    pub fn from_address(pattern: impl ToString) -> Self {
        Self::address(AddressField::From, pattern)
    }

    pub fn to_address(pattern: impl ToString) -> Self {
        Self::address(AddressField::To, pattern)
    }

    pub fn cc_address(pattern: impl ToString) -> Self {
        Self::address(AddressField::Cc, pattern)
    }

    pub fn bcc_address(pattern: impl ToString) -> Self {
        Self::address(AddressField::Bcc, pattern)
    }

    pub fn subject(pattern: impl ToString) -> Self {
        Self::Subject(SubjectTerm::new(pattern))
    }

    pub fn body(pattern: impl ToString) -> Self {
        Self::Body(BodyTerm::new(pattern))
    }

    pub fn filename(pattern: impl ToString) -> Self {
        Self::FileName(FileNameTerm::new(pattern))
    }

    /// Builds a header term. A `None` value matches messages having
    /// the header, whatever its value.
    pub fn header(name: impl ToString, value: Option<impl ToString>) -> Result<Self> {
        Ok(Self::Header(HeaderTerm::new(name, value)?))
    }

    pub fn header_exists(name: impl ToString) -> Result<Self> {
        Ok(Self::HeaderExists(HeaderExistsTerm::new(name)?))
    }

    /// Builds a standard flag term. When `wanted` is `true`, every
    /// flag needs to be set, otherwise none of them can be set.
    pub fn flag(flags: impl IntoIterator<Item = Flag>, wanted: bool) -> Result<Self> {
        Ok(Self::Flag(FlagTerm::new(flags, wanted)?))
    }

    /// Builds a user flag term, same semantics as [`Self::flag`] over
    /// custom flags.
    pub fn user_flag(
        labels: impl IntoIterator<Item = impl ToString>,
        wanted: bool,
    ) -> Result<Self> {
        Ok(Self::UserFlag(UserFlagTerm::new(labels, wanted)?))
    }

    pub fn size(comparison: ComparisonType, size: u64) -> Self {
        Self::Size(SizeTerm::new(ComparablePattern::new(comparison, size)))
    }

    pub fn sent_date(comparison: ComparisonType, date: NaiveDate) -> Self {
        let pattern = ComparablePattern::new(comparison, date);
        Self::Date(DateTerm::new(DateField::Sent, pattern))
    }

    pub fn received_date(comparison: ComparisonType, date: NaiveDate) -> Self {
        let pattern = ComparablePattern::new(comparison, date);
        Self::Date(DateTerm::new(DateField::Received, pattern))
    }

    pub fn attachment(pattern: impl ToString) -> Self {
        Self::Attachment(AttachmentTerm::new(pattern))
    }

    pub fn mailbox(name: impl ToString) -> Result<Self> {
        Ok(Self::XMailbox(MailboxTerm::new(name)?))
    }

    pub fn and(left: SearchTerm, right: SearchTerm) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: SearchTerm, right: SearchTerm) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn not(term: SearchTerm) -> Self {
        Self::Not(Box::new(term))
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Self::Address(term) => term.kind(),
            Self::Subject(term) => term.kind(),
            Self::Body(term) => term.kind(),
            Self::FileName(term) => term.kind(),
            Self::Header(term) => term.kind(),
            Self::HeaderExists(term) => term.kind(),
            Self::Flag(term) => term.kind(),
            Self::UserFlag(term) => term.kind(),
            Self::Size(term) => term.kind(),
            Self::Date(term) => term.kind(),
            Self::Attachment(term) => term.kind(),
            Self::XMailbox(term) => term.kind(),
            Self::Boolean(_) => TermKind::Boolean,
            Self::And(_, _) => TermKind::And,
            Self::Or(_, _) => TermKind::Or,
            Self::Not(_) => TermKind::Not,
        }
    }

    /// Evaluates the tree against an in-memory message view.
    ///
    /// Composite terms short-circuit: the right side of a conjunction
    /// (resp. disjunction) is not evaluated when the left side does
    /// not match (resp. matches).
    pub fn matches<M: MessageView + ?Sized>(&self, msg: &M) -> bool {
        match self {
            Self::Address(term) => term.matches(msg),
            Self::Subject(term) => term.matches(msg),
            Self::Body(term) => term.matches(msg),
            Self::FileName(term) => term.matches(msg),
            Self::Header(term) => term.matches(msg),
            Self::HeaderExists(term) => term.matches(msg),
            Self::Flag(term) => term.matches(msg),
            Self::UserFlag(term) => term.matches(msg),
            Self::Size(term) => term.matches(msg),
            Self::Date(term) => term.matches(msg),
            Self::Attachment(term) => term.matches(msg),
            Self::XMailbox(term) => term.matches(msg),
            Self::Boolean(value) => *value,
            Self::And(left, right) => left.matches(msg) && right.matches(msg),
            Self::Or(left, right) => left.matches(msg) || right.matches(msg),
            Self::Not(term) => !term.matches(msg),
        }
    }

    /// Evaluates the tree against a message source.
    ///
    /// Errors are caught at the leaf level: a leaf that cannot be
    /// evaluated is logged and considered as a mismatch, the rest of
    /// the tree is still evaluated.
    pub fn matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> bool {
        match self {
            Self::Address(term) => term.matches_source(msg),
            Self::Subject(term) => term.matches_source(msg),
            Self::Body(term) => term.matches_source(msg),
            Self::FileName(term) => term.matches_source(msg),
            Self::Header(term) => term.matches_source(msg),
            Self::HeaderExists(term) => term.matches_source(msg),
            Self::Flag(term) => term.matches_source(msg),
            Self::UserFlag(term) => term.matches_source(msg),
            Self::Size(term) => term.matches_source(msg),
            Self::Date(term) => term.matches_source(msg),
            Self::Attachment(term) => term.matches_source(msg),
            Self::XMailbox(term) => term.matches_source(msg),
            Self::Boolean(value) => *value,
            Self::And(left, right) => left.matches_source(msg) && right.matches_source(msg),
            Self::Or(left, right) => left.matches_source(msg) || right.matches_source(msg),
            Self::Not(term) => !term.matches_source(msg),
        }
    }

    /// Evaluates the tree against a message source, stopping at the
    /// first source error.
    pub fn try_matches_source<S: MessageSource + ?Sized>(&self, msg: &S) -> Result<bool> {
        match self {
            Self::Address(term) => term.try_matches_source(msg),
            Self::Subject(term) => term.try_matches_source(msg),
            Self::Body(term) => term.try_matches_source(msg),
            Self::FileName(term) => term.try_matches_source(msg),
            Self::Header(term) => term.try_matches_source(msg),
            Self::HeaderExists(term) => term.try_matches_source(msg),
            Self::Flag(term) => term.try_matches_source(msg),
            Self::UserFlag(term) => term.try_matches_source(msg),
            Self::Size(term) => term.try_matches_source(msg),
            Self::Date(term) => term.try_matches_source(msg),
            Self::Attachment(term) => term.try_matches_source(msg),
            Self::XMailbox(term) => term.try_matches_source(msg),
            Self::Boolean(value) => Ok(*value),
            Self::And(left, right) => {
                Ok(left.try_matches_source(msg)? && right.try_matches_source(msg)?)
            }
            Self::Or(left, right) => {
                Ok(left.try_matches_source(msg)? || right.try_matches_source(msg)?)
            }
            Self::Not(term) => Ok(!term.try_matches_source(msg)?),
        }
    }

    /// Translates the tree into a remote query.
    ///
    /// The translation fails as soon as one leaf has no remote
    /// equivalent. Callers should filter the tree first (see
    /// [`SearchTerm::filter`]), or fall back to local evaluation.
    pub fn translate(&self) -> Result<RemoteQuery> {
        match self {
            Self::Address(term) => term.translate(),
            Self::Subject(term) => term.translate(),
            Self::Body(term) => term.translate(),
            Self::FileName(term) => term.translate(),
            Self::Header(term) => term.translate(),
            Self::HeaderExists(term) => term.translate(),
            Self::Flag(term) => term.translate(),
            Self::UserFlag(term) => term.translate(),
            Self::Size(term) => term.translate(),
            Self::Date(term) => term.translate(),
            Self::Attachment(term) => term.translate(),
            Self::XMailbox(term) => term.translate(),
            Self::Boolean(true) => Ok(RemoteQuery::All),
            Self::Boolean(false) => Ok(RemoteQuery::not(RemoteQuery::All)),
            Self::And(left, right) => Ok(RemoteQuery::and(left.translate()?, right.translate()?)),
            Self::Or(left, right) => Ok(RemoteQuery::or(left.translate()?, right.translate()?)),
            Self::Not(term) => Ok(RemoteQuery::not(term.translate()?)),
        }
    }

    /// Declares into the given plan the message data needed to
    /// evaluate the whole tree.
    pub fn contribute_fetch(&self, plan: &mut FetchPlan) {
        match self {
            Self::Address(term) => term.contribute_fetch(plan),
            Self::Subject(term) => term.contribute_fetch(plan),
            Self::Body(term) => term.contribute_fetch(plan),
            Self::FileName(term) => term.contribute_fetch(plan),
            Self::Header(term) => term.contribute_fetch(plan),
            Self::HeaderExists(term) => term.contribute_fetch(plan),
            Self::Flag(term) => term.contribute_fetch(plan),
            Self::UserFlag(term) => term.contribute_fetch(plan),
            Self::Size(term) => term.contribute_fetch(plan),
            Self::Date(term) => term.contribute_fetch(plan),
            Self::Attachment(term) => term.contribute_fetch(plan),
            Self::XMailbox(term) => term.contribute_fetch(plan),
            Self::Boolean(_) => (),
            Self::And(left, right) | Self::Or(left, right) => {
                left.contribute_fetch(plan);
                right.contribute_fetch(plan);
            }
            Self::Not(term) => term.contribute_fetch(plan),
        }
    }

    /// Builds the plan of the message data needed to evaluate the
    /// whole tree.
    pub fn fetch_plan(&self) -> FetchPlan {
        let mut plan = FetchPlan::default();
        self.contribute_fetch(&mut plan);
        debug!("fetch plan of search term {self}: {plan}");
        plan
    }

    /// Returns `true` if every pattern of the tree is ASCII.
    pub fn is_ascii(&self) -> bool {
        self.leaves().all(Self::leaf_is_ascii)
    }

    /// Returns `true` if at least one pattern of the tree contains a
    /// wildcard.
    pub fn contains_wildcard(&self) -> bool {
        self.leaves().any(Self::leaf_contains_wildcard)
    }

    /// Collects the kinds of every term of the tree, composite ones
    /// included.
    pub fn kinds(&self) -> BTreeSet<TermKind> {
        let mut collector = visitor::KindCollector::default();
        self.accept(&mut collector);
        collector.into_kinds()
    }

    /// Iterates over leaves, depth-first.
    fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    fn leaf_is_ascii(&self) -> bool {
        match self {
            Self::Address(term) => term.is_ascii(),
            Self::Subject(term) => term.is_ascii(),
            Self::Body(term) => term.is_ascii(),
            Self::FileName(term) => term.is_ascii(),
            Self::Header(term) => term.is_ascii(),
            Self::HeaderExists(term) => term.is_ascii(),
            Self::Flag(term) => term.is_ascii(),
            Self::UserFlag(term) => term.is_ascii(),
            Self::Size(term) => term.is_ascii(),
            Self::Date(term) => term.is_ascii(),
            Self::Attachment(term) => term.is_ascii(),
            Self::XMailbox(term) => term.is_ascii(),
            _ => true,
        }
    }

    fn leaf_translates_exactly(&self) -> bool {
        match self {
            Self::Address(term) => term.translates_exactly(),
            Self::Subject(term) => term.translates_exactly(),
            Self::Body(term) => term.translates_exactly(),
            Self::FileName(term) => term.translates_exactly(),
            Self::Header(term) => term.translates_exactly(),
            Self::HeaderExists(term) => term.translates_exactly(),
            Self::Flag(term) => term.translates_exactly(),
            Self::UserFlag(term) => term.translates_exactly(),
            Self::Size(term) => term.translates_exactly(),
            Self::Date(term) => term.translates_exactly(),
            Self::Attachment(term) => term.translates_exactly(),
            Self::XMailbox(term) => term.translates_exactly(),
            Self::Boolean(_) => true,
            Self::And(..) | Self::Or(..) | Self::Not(_) => false,
        }
    }

    fn leaf_contains_wildcard(&self) -> bool {
        match self {
            Self::Address(term) => term.contains_wildcard(),
            Self::Subject(term) => term.contains_wildcard(),
            Self::Body(term) => term.contains_wildcard(),
            Self::FileName(term) => term.contains_wildcard(),
            Self::Header(term) => term.contains_wildcard(),
            Self::HeaderExists(term) => term.contains_wildcard(),
            Self::Attachment(term) => term.contains_wildcard(),
            _ => false,
        }
    }
}

/// Depth-first iterator over the leaves of a tree.
struct Leaves<'a> {
    stack: Vec<&'a SearchTerm>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a SearchTerm;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                SearchTerm::And(left, right) | SearchTerm::Or(left, right) => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                SearchTerm::Not(term) => self.stack.push(term),
                leaf => return Some(leaf),
            }
        }
    }
}

impl From<AddressTerm> for SearchTerm {
    fn from(term: AddressTerm) -> Self {
        Self::Address(term)
    }
}

impl From<SubjectTerm> for SearchTerm {
    fn from(term: SubjectTerm) -> Self {
        Self::Subject(term)
    }
}

impl From<BodyTerm> for SearchTerm {
    fn from(term: BodyTerm) -> Self {
        Self::Body(term)
    }
}

impl From<HeaderTerm> for SearchTerm {
    fn from(term: HeaderTerm) -> Self {
        Self::Header(term)
    }
}

impl From<bool> for SearchTerm {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
