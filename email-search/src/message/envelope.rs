//! Module dedicated to the in-memory message view.
//!
//! The core concept of this module is the [`Envelope`] structure, an
//! owned snapshot of everything search terms can look at.

use chrono::{DateTime, FixedOffset};

use crate::{
    message::{parsed, Address, AddressField, Flags, MessageView, MimePart},
    Result,
};

/// The in-memory message view.
///
/// Every field is public: an envelope can be built by hand, or from
/// raw bytes using [`Envelope::from_bytes`]. Fields that are not
/// known stay empty, search terms then treat them as absent.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Envelope {
    /// The identifier of the message in its store.
    pub id: String,
    pub from: Vec<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub subject: Option<String>,
    /// Decoded headers, in order of appearance.
    pub headers: Vec<(String, String)>,
    pub flags: Flags,
    /// The size of the raw message, in bytes.
    pub size: u64,
    /// The date the message was sent at (`Date` header).
    pub sent_date: Option<DateTime<FixedOffset>>,
    /// The date the message was received by the store.
    pub received_date: Option<DateTime<FixedOffset>>,
    /// The name of the mailbox the message lives in.
    pub mailbox: Option<String>,
    /// The MIME tree of the message, when it has been fetched.
    pub part: Option<MimePart>,
}

impl Envelope {
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Builds an envelope from a raw RFC 5322 message.
    ///
    /// Store-related data (flags, received date, mailbox) cannot be
    /// found in the raw message and stay empty.
    pub fn from_bytes(id: impl ToString, raw: impl AsRef<[u8]>) -> Result<Self> {
        let id = id.to_string();
        let raw = raw.as_ref();
        let msg = parsed::parse(&id, raw)?;

        Ok(Self {
            from: parsed::addresses(&msg, AddressField::From),
            to: parsed::addresses(&msg, AddressField::To),
            cc: parsed::addresses(&msg, AddressField::Cc),
            bcc: parsed::addresses(&msg, AddressField::Bcc),
            subject: msg.subject().map(ToOwned::to_owned),
            headers: parsed::headers(&msg),
            size: raw.len() as u64,
            sent_date: parsed::sent_date(&msg),
            part: Some(MimePart::from_parsed(&msg)),
            id,
            ..Default::default()
        })
    }

    pub fn with_from(mut self, addr: impl Into<Address>) -> Self {
        self.from.push(addr.into());
        self
    }

    pub fn with_to(mut self, addr: impl Into<Address>) -> Self {
        self.to.push(addr.into());
        self
    }

    pub fn with_subject(mut self, subject: impl ToString) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn with_header(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_flags(mut self, flags: impl Into<Flags>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_sent_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.sent_date = Some(date);
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

    pub fn with_part(mut self, part: MimePart) -> Self {
        self.part = Some(part);
        self
    }
}

impl MessageView for Envelope {
    fn addresses(&self, field: AddressField) -> &[Address] {
        match field {
            AddressField::From => &self.from,
            AddressField::To => &self.to,
            AddressField::Cc => &self.cc,
            AddressField::Bcc => &self.bcc,
        }
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    fn header(&self, name: &str, separator: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(separator))
        }
    }

    fn flags(&self) -> &Flags {
        &self.flags
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn sent_date(&self) -> Option<DateTime<FixedOffset>> {
        self.sent_date
    }

    fn received_date(&self) -> Option<DateTime<FixedOffset>> {
        self.received_date
    }

    fn mailbox(&self) -> Option<&str> {
        self.mailbox.as_deref()
    }

    fn part(&self) -> Option<&MimePart> {
        self.part.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crate::message::{Address, AddressField, MessageView};

    use super::Envelope;

    #[test]
    fn header_joins_values() {
        let envelope = Envelope::new("1")
            .with_header("Received", "from a")
            .with_header("X-Other", "other")
            .with_header("received", "from b");

        assert_eq!(
            envelope.header("RECEIVED", " | ").as_deref(),
            Some("from a | from b"),
        );
        assert_eq!(envelope.header("X-Missing", ", "), None);
    }

    #[test]
    fn from_bytes() {
        let raw = concat!(
            "From: Alice <alice@localhost>\r\n",
            "To: bob@localhost\r\n",
            "Subject: Invoice #1\r\n",
            "Date: Tue, 5 Mar 2024 10:30:00 +0000\r\n",
            "\r\n",
            "Please pay.\r\n",
        );

        let envelope = Envelope::from_bytes("42", raw).unwrap();

        assert_eq!(envelope.id, "42");
        assert_eq!(
            envelope.addresses(AddressField::From),
            &[Address::new(Some("Alice"), "alice@localhost")],
        );
        assert_eq!(envelope.subject(), Some("Invoice #1"));
        assert_eq!(envelope.size(), raw.len() as u64);
        assert!(envelope.sent_date().is_some());
        assert_eq!(
            envelope.part().and_then(|part| part.body_text()).as_deref().map(str::trim),
            Some("Please pay."),
        );
    }
}
