//! Module dedicated to [`mail_parser`] adapters.
//!
//! Raw messages are parsed with [`mail_parser`], which takes care of
//! RFC 2047 encoded words, address lists and charsets. This module
//! converts parsed values into the types of this library.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use mail_parser::{Addr, Address as ParsedAddress, ContentType, HeaderValue, MessageParser};

use crate::{
    message::{Address, AddressField},
    Error, Result,
};

/// Parses the given raw message.
///
/// Raw header blocks are valid raw messages: they just produce an
/// empty body.
pub(crate) fn parse<'a>(id: &str, raw: &'a [u8]) -> Result<mail_parser::Message<'a>> {
    MessageParser::new()
        .parse(raw)
        .ok_or_else(|| Error::ParseRawMessageError(id.to_owned()))
}

/// Extracts the decoded addresses of the given field. Group names are
/// dropped, only their members are kept.
pub(crate) fn addresses(msg: &mail_parser::Message, field: AddressField) -> Vec<Address> {
    match msg.header(field.header_name()) {
        Some(HeaderValue::Address(ParsedAddress::List(addrs))) => {
            addrs.iter().filter_map(to_address).collect()
        }
        Some(HeaderValue::Address(ParsedAddress::Group(groups))) => groups
            .iter()
            .flat_map(|group| group.addresses.iter())
            .filter_map(to_address)
            .collect(),
        _ => Vec::new(),
    }
}

fn to_address(addr: &Addr) -> Option<Address> {
    let email = addr.address.as_ref()?;
    Some(Address::new(addr.name.as_ref(), email))
}

/// Collects the decoded values of every header matching the given
/// name, case-insensitively, in order of appearance.
pub(crate) fn header_values(msg: &mail_parser::Message, name: &str) -> Vec<String> {
    msg.headers()
        .iter()
        .filter(|header| header.name.as_str().eq_ignore_ascii_case(name))
        .map(|header| display_value(&header.value))
        .collect()
}

/// Collects every header of the message as decoded name/value pairs.
pub(crate) fn headers(msg: &mail_parser::Message) -> Vec<(String, String)> {
    msg.headers()
        .iter()
        .map(|header| {
            let name = header.name.as_str().to_owned();
            let value = display_value(&header.value);
            (name, value)
        })
        .collect()
}

/// Returns the date the message was sent at, taken from the `Date`
/// header.
pub(crate) fn sent_date(msg: &mail_parser::Message) -> Option<DateTime<FixedOffset>> {
    msg.date().and_then(to_datetime)
}

/// Transforms a [`mail_parser::DateTime`] into a fixed offset
/// [`chrono::DateTime`].
pub(crate) fn to_datetime(dt: &mail_parser::DateTime) -> Option<DateTime<FixedOffset>> {
    let offset_secs = (dt.tz_hour as i32) * 3600 + (dt.tz_minute as i32) * 60;
    let offset = if dt.tz_before_gmt {
        FixedOffset::west_opt(offset_secs)?
    } else {
        FixedOffset::east_opt(offset_secs)?
    };

    let naive = NaiveDate::from_ymd_opt(dt.year as i32, dt.month as u32, dt.day as u32)?
        .and_hms_opt(dt.hour as u32, dt.minute as u32, dt.second as u32)?;

    offset.from_local_datetime(&naive).single()
}

fn display_value(value: &HeaderValue) -> String {
    match value {
        HeaderValue::Address(ParsedAddress::List(addrs)) => display_addrs(addrs),
        HeaderValue::Address(ParsedAddress::Group(groups)) => groups
            .iter()
            .map(|group| {
                let name = group.name.as_deref().unwrap_or_default();
                format!("{name}: {};", display_addrs(&group.addresses))
            })
            .collect::<Vec<_>>()
            .join(" "),
        HeaderValue::Text(text) => text.to_string(),
        HeaderValue::TextList(texts) => texts.join(", "),
        HeaderValue::DateTime(dt) => dt.to_rfc822(),
        HeaderValue::ContentType(ctype) => display_content_type(ctype),
        _ => String::new(),
    }
}

fn display_addrs(addrs: &[Addr]) -> String {
    let addrs: Vec<Address> = addrs.iter().filter_map(to_address).collect();
    super::address::join(&addrs).unwrap_or_default()
}

fn display_content_type(ctype: &ContentType) -> String {
    match ctype.subtype() {
        Some(stype) => format!("{}/{stype}", ctype.ctype()),
        None => ctype.ctype().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use crate::message::{Address, AddressField};

    const RAW: &[u8] = b"From: =?utf-8?q?J=C3=A9r=C3=B4me?= <jerome@localhost>\r\n\
        To: alice@localhost, Bob <bob@localhost>\r\n\
        Cc: team: carol@localhost, dave@localhost;\r\n\
        Subject: =?iso-8859-1?q?R=E9union?=\r\n\
        X-Tag: one\r\n\
        x-tag: two\r\n\
        Date: Tue, 5 Mar 2024 10:30:00 +0100\r\n\
        \r\n\
        Hello\r\n";

    #[test]
    fn decodes_addresses() {
        let msg = super::parse("1", RAW).unwrap();

        assert_eq!(
            super::addresses(&msg, AddressField::From),
            vec![Address::new(Some("Jérôme"), "jerome@localhost")],
        );

        let to = super::addresses(&msg, AddressField::To);
        assert_eq!(to.len(), 2);
        assert_eq!(to[1].name.as_deref(), Some("Bob"));

        let cc = super::addresses(&msg, AddressField::Cc);
        assert_eq!(
            cc,
            vec![
                Address::from("carol@localhost"),
                Address::from("dave@localhost"),
            ],
        );

        assert!(super::addresses(&msg, AddressField::Bcc).is_empty());
    }

    #[test]
    fn decodes_headers() {
        let msg = super::parse("1", RAW).unwrap();

        assert_eq!(msg.subject(), Some("Réunion"));
        assert_eq!(super::header_values(&msg, "X-TAG"), vec!["one", "two"]);
        assert!(super::header_values(&msg, "X-Missing").is_empty());
    }

    #[test]
    fn sent_date() {
        let msg = super::parse("1", RAW).unwrap();
        let expected = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 10, 30, 0)
            .unwrap();

        assert_eq!(super::sent_date(&msg), Some(expected));
    }
}
