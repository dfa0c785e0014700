//! Module dedicated to raw messages.
//!
//! The core concept of this module is the [`RawMessage`] structure,
//! the simplest [`MessageSource`]: raw bytes already in memory, plus
//! the few properties only the store knows about.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset};

use crate::{
    message::{Flags, MessageSource},
    Result,
};

/// A raw RFC 5322 message held in memory.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawMessage {
    id: String,
    raw: Vec<u8>,
    flags: Flags,
    received_date: Option<DateTime<FixedOffset>>,
    mailbox: Option<String>,
}

impl RawMessage {
    pub fn new(id: impl ToString, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.to_string(),
            raw: raw.into(),
            ..Default::default()
        }
    }

    pub fn with_flags(mut self, flags: impl Into<Flags>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn with_received_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.received_date = Some(date);
        self
    }

    pub fn with_mailbox(mut self, mailbox: impl ToString) -> Self {
        self.mailbox = Some(mailbox.to_string());
        self
    }
}

impl MessageSource for RawMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn raw_headers(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(header_block(&self.raw)))
    }

    fn raw_message(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.raw))
    }

    fn flags(&self) -> Result<Flags> {
        Ok(self.flags.clone())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.raw.len() as u64)
    }

    fn received_date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        Ok(self.received_date)
    }

    fn mailbox(&self) -> Result<Option<String>> {
        Ok(self.mailbox.clone())
    }
}

/// Returns the header block of the given raw message, including the
/// empty line separating it from the body.
///
/// A message without body is a header block on its own.
pub fn header_block(raw: &[u8]) -> &[u8] {
    let mut pos = 0;

    while pos < raw.len() {
        let end = match raw[pos..].iter().position(|b| *b == b'\n') {
            Some(offset) => pos + offset + 1,
            None => return raw,
        };

        let line = &raw[pos..end];
        if line == b"\r\n" || line == b"\n" {
            return &raw[..end];
        }

        pos = end;
    }

    raw
}

#[cfg(test)]
mod tests {
    use crate::message::MessageSource;

    use super::RawMessage;

    #[test]
    fn header_block() {
        assert_eq!(
            super::header_block(b"Subject: a\r\nTo: b\r\n\r\nbody\r\n\r\nmore"),
            b"Subject: a\r\nTo: b\r\n\r\n",
        );
        assert_eq!(
            super::header_block(b"Subject: a\n\nbody"),
            b"Subject: a\n\n",
        );
        assert_eq!(super::header_block(b"Subject: a"), b"Subject: a");
        assert_eq!(super::header_block(b""), b"");
    }

    #[test]
    fn raw_message_source() {
        let raw = "Subject: hello\r\n\r\nbody\r\n";
        let msg = RawMessage::new("7", raw)
            .with_flags("seen")
            .with_mailbox("INBOX");

        assert_eq!(msg.id(), "7");
        assert_eq!(msg.size().unwrap(), raw.len() as u64);
        assert_eq!(
            msg.raw_headers().unwrap().as_ref(),
            b"Subject: hello\r\n\r\n",
        );
        assert_eq!(msg.mailbox().unwrap().as_deref(), Some("INBOX"));
        assert_eq!(msg.flags().unwrap().len(), 1);
    }
}
