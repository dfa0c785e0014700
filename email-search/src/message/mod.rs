//! Module dedicated to messages.
//!
//! Search terms never own a message: they receive it as argument,
//! through one of the two abstractions of this module.
//!
//! - [`MessageView`] is an in-memory view, every access is pure and
//!   infallible. [`Envelope`] is the default implementation.
//! - [`MessageSource`] is a possibly-lazy source of raw data, every
//!   access may perform I/O and may fail. [`RawMessage`] is the
//!   default implementation.

pub mod address;
pub mod envelope;
pub mod flag;
pub(crate) mod parsed;
pub mod part;
pub mod raw;

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};

#[doc(inline)]
pub use self::{
    address::{Address, AddressField},
    envelope::Envelope,
    flag::{Flag, Flags},
    part::MimePart,
    raw::RawMessage,
};
use crate::Result;

/// The in-memory message view.
pub trait MessageView {
    /// Returns the addresses of the given field.
    fn addresses(&self, field: AddressField) -> &[Address];

    /// Returns the decoded subject.
    fn subject(&self) -> Option<&str>;

    /// Returns the decoded values of every header matching the given
    /// name, joined by the given separator.
    ///
    /// Returns `None` if the message has no such header.
    fn header(&self, name: &str, separator: &str) -> Option<String>;

    /// Returns standard and custom flags.
    fn flags(&self) -> &Flags;

    /// Returns the size of the raw message, in bytes.
    fn size(&self) -> u64;

    fn sent_date(&self) -> Option<DateTime<FixedOffset>>;

    fn received_date(&self) -> Option<DateTime<FixedOffset>>;

    /// Returns the name of the mailbox the message lives in.
    fn mailbox(&self) -> Option<&str>;

    /// Returns the MIME tree, if it has been fetched.
    fn part(&self) -> Option<&MimePart>;
}

impl<T: MessageView + ?Sized> MessageView for &T {
    fn addresses(&self, field: AddressField) -> &[Address] {
        (**self).addresses(field)
    }

    fn subject(&self) -> Option<&str> {
        (**self).subject()
    }

    fn header(&self, name: &str, separator: &str) -> Option<String> {
        (**self).header(name, separator)
    }

    fn flags(&self) -> &Flags {
        (**self).flags()
    }

    fn size(&self) -> u64 {
        (**self).size()
    }

    fn sent_date(&self) -> Option<DateTime<FixedOffset>> {
        (**self).sent_date()
    }

    fn received_date(&self) -> Option<DateTime<FixedOffset>> {
        (**self).received_date()
    }

    fn mailbox(&self) -> Option<&str> {
        (**self).mailbox()
    }

    fn part(&self) -> Option<&MimePart> {
        (**self).part()
    }
}

/// The possibly-lazy message source.
///
/// Implementations usually fetch data on demand from a remote store,
/// which explains why every accessor is fallible. Raw data is parsed
/// by search terms themselves.
pub trait MessageSource {
    /// Returns the identifier of the message, used for logging.
    fn id(&self) -> &str;

    /// Returns the raw header block of the message.
    ///
    /// Defaults to the whole raw message, implementations able to
    /// fetch headers only should override it.
    fn raw_headers(&self) -> Result<Cow<'_, [u8]>> {
        self.raw_message()
    }

    /// Returns the whole raw message.
    fn raw_message(&self) -> Result<Cow<'_, [u8]>>;

    fn flags(&self) -> Result<Flags>;

    /// Returns the size of the raw message, in bytes.
    fn size(&self) -> Result<u64> {
        Ok(self.raw_message()?.len() as u64)
    }

    fn received_date(&self) -> Result<Option<DateTime<FixedOffset>>>;

    fn mailbox(&self) -> Result<Option<String>>;
}

impl<T: MessageSource + ?Sized> MessageSource for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn raw_headers(&self) -> Result<Cow<'_, [u8]>> {
        (**self).raw_headers()
    }

    fn raw_message(&self) -> Result<Cow<'_, [u8]>> {
        (**self).raw_message()
    }

    fn flags(&self) -> Result<Flags> {
        (**self).flags()
    }

    fn size(&self) -> Result<u64> {
        (**self).size()
    }

    fn received_date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        (**self).received_date()
    }

    fn mailbox(&self) -> Result<Option<String>> {
        (**self).mailbox()
    }
}
