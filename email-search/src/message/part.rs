//! Module dedicated to MIME parts.
//!
//! The core concept of this module is the [`MimePart`] structure, a
//! simplified and owned MIME tree used by the body, file name and
//! attachment search terms.

use mail_parser::{MessagePart, MimeHeaders, PartType};
use nanohtml2text::html2text;
use tracing::{debug, trace};

/// The MIME part of a message.
///
/// A part is either a leaf holding some content, or a container
/// (multipart, embedded message) holding nested parts.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MimePart {
    /// The lower case MIME type of the part, for example
    /// `text/plain`.
    pub content_type: String,

    /// The charset declared in the content type parameters.
    pub charset: Option<String>,

    /// The optional file name of the part.
    pub filename: Option<String>,

    /// Whether the part is disposed as an attachment.
    pub attachment: bool,

    /// The raw content of the part, transfer encoding already
    /// removed.
    pub contents: Vec<u8>,

    /// The nested parts.
    pub parts: Vec<MimePart>,
}

impl MimePart {
    pub fn new(content_type: impl AsRef<str>) -> Self {
        Self {
            content_type: content_type.as_ref().trim().to_lowercase(),
            ..Default::default()
        }
    }

    /// Builds a text part from a UTF-8 string.
    pub fn text(content_type: impl AsRef<str>, text: impl ToString) -> Self {
        Self::new(content_type)
            .with_charset("utf-8")
            .with_contents(text.to_string())
    }

    /// Builds a multipart container from the given nested parts.
    pub fn multipart(subtype: impl AsRef<str>, parts: impl IntoIterator<Item = MimePart>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
            ..Self::new(format!("multipart/{}", subtype.as_ref()))
        }
    }

    pub fn with_charset(mut self, charset: impl ToString) -> Self {
        self.charset = Some(charset.to_string());
        self
    }

    pub fn with_filename(mut self, filename: impl ToString) -> Self {
        self.filename = Some(filename.to_string());
        self
    }

    pub fn with_attachment(mut self, attachment: bool) -> Self {
        self.attachment = attachment;
        self
    }

    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn with_part(mut self, part: MimePart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn is_text(&self) -> bool {
        self.content_type.starts_with("text/")
    }

    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }

    /// Iterates over the part and its nested parts, depth-first.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Finds the first textual part, depth-first.
    pub fn find_text_part(&self) -> Option<&MimePart> {
        self.walk().find(|part| part.is_text())
    }

    /// Decodes the content of the part into a string.
    ///
    /// The declared charset is used when it is known, otherwise the
    /// charset is detected from the content. HTML is converted to
    /// plain text.
    pub fn decode_text(&self) -> String {
        let text = decode(&self.contents, self.charset.as_deref());

        if self.is_html() {
            html2text(&text)
        } else {
            text
        }
    }

    /// Returns the text of the first textual part, if any.
    pub fn body_text(&self) -> Option<String> {
        let part = self.find_text_part()?;
        trace!("found body text part {}", part.content_type);
        Some(part.decode_text())
    }

    /// Builds an owned MIME tree from a parsed message.
    pub fn from_parsed(msg: &mail_parser::Message) -> Self {
        from_parsed_part(msg, msg.root_part())
    }
}

/// Depth-first iterator over a MIME tree.
pub struct Walk<'a> {
    stack: Vec<&'a MimePart>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a MimePart;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        self.stack.extend(part.parts.iter().rev());
        Some(part)
    }
}

fn from_parsed_part(msg: &mail_parser::Message, part: &MessagePart) -> MimePart {
    let ctype = part.content_type();

    let mut mime = MimePart {
        content_type: String::new(),
        charset: ctype
            .and_then(|ctype| ctype.attribute("charset"))
            .map(ToOwned::to_owned),
        filename: part.attachment_name().map(ToOwned::to_owned),
        attachment: part
            .content_disposition()
            .map(|disposition| disposition.ctype().eq_ignore_ascii_case("attachment"))
            .unwrap_or_default(),
        contents: Vec::new(),
        parts: Vec::new(),
    };

    let default_ctype = match &part.body {
        PartType::Text(text) => {
            // text has already been decoded by the parser
            mime.charset = Some(String::from("utf-8"));
            mime.contents = text.as_bytes().to_vec();
            "text/plain"
        }
        PartType::Html(html) => {
            mime.charset = Some(String::from("utf-8"));
            mime.contents = html.as_bytes().to_vec();
            "text/html"
        }
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => {
            mime.contents = bytes.to_vec();
            "application/octet-stream"
        }
        PartType::Message(nested) => {
            mime.contents = nested.raw_message().to_vec();
            mime.parts.push(MimePart::from_parsed(nested));
            "message/rfc822"
        }
        PartType::Multipart(ids) => {
            for id in ids {
                match msg.part(*id) {
                    Some(nested) => mime.parts.push(from_parsed_part(msg, nested)),
                    None => debug!("cannot find part {id}, skipping it"),
                }
            }
            "multipart/mixed"
        }
    };

    mime.content_type = ctype
        .map(|ctype| match ctype.subtype() {
            Some(stype) => format!("{}/{stype}", ctype.ctype()),
            None => ctype.ctype().to_owned(),
        })
        .unwrap_or_else(|| default_ctype.to_owned())
        .to_lowercase();

    mime
}

/// Decodes the given bytes using the given charset.
///
/// When the charset is missing or unknown, the content is decoded as
/// UTF-8 if valid, as ISO-8859-1 otherwise.
fn decode(contents: &[u8], charset: Option<&str>) -> String {
    let decoder = charset.and_then(|charset| {
        let decoder = mail_parser::decoders::charsets::map::charset_decoder(
            charset.trim().to_lowercase().as_bytes(),
        );
        if decoder.is_none() {
            debug!("unknown charset {charset}, detecting it from content");
        }
        decoder
    });

    if let Some(decoder) = decoder {
        return decoder(contents);
    }

    match std::str::from_utf8(contents) {
        Ok(text) => text.to_owned(),
        Err(_) => contents.iter().map(|b| *b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::MimePart;

    fn tree() -> MimePart {
        MimePart::multipart(
            "mixed",
            [
                MimePart::multipart(
                    "alternative",
                    [
                        MimePart::text("text/plain", "plain body"),
                        MimePart::text("text/html", "<p>html body</p>"),
                    ],
                ),
                MimePart::new("application/pdf")
                    .with_filename("invoice-42.pdf")
                    .with_attachment(true)
                    .with_contents(b"%PDF".to_vec()),
            ],
        )
    }

    #[test]
    fn walk_is_depth_first() {
        let tree = tree();
        let ctypes: Vec<_> = tree.walk().map(|p| p.content_type.as_str()).collect();

        assert_eq!(
            ctypes,
            vec![
                "multipart/mixed",
                "multipart/alternative",
                "text/plain",
                "text/html",
                "application/pdf",
            ]
        );
    }

    #[test]
    fn body_text_takes_first_text_part() {
        assert_eq!(tree().body_text().as_deref(), Some("plain body"));
        assert_eq!(MimePart::new("image/png").body_text(), None);
    }

    #[test]
    fn html_is_converted_to_text() {
        let part = MimePart::text("TEXT/HTML", "<html><body><b>Hello</b> world</body></html>");
        let text = part.decode_text();

        assert!(text.contains("Hello"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn declared_charset_is_used() {
        let part = MimePart::new("text/plain")
            .with_charset("ISO-8859-1")
            .with_contents(b"caf\xe9".to_vec());

        assert_eq!(part.decode_text(), "café");
    }

    #[test]
    fn charset_is_detected() {
        let utf8 = MimePart::new("text/plain")
            .with_contents("café".as_bytes().to_vec());
        assert_eq!(utf8.decode_text(), "café");

        let latin1 = MimePart::new("text/plain")
            .with_charset("x-unknown")
            .with_contents(b"caf\xe9".to_vec());
        assert_eq!(latin1.decode_text(), "café");
    }

    #[test]
    fn from_parsed() {
        let raw = concat!(
            "Content-Type: multipart/mixed; boundary=\"b\"\r\n",
            "\r\n",
            "--b\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "See attached.\r\n",
            "--b\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
            "\r\n",
            "%PDF\r\n",
            "--b--\r\n",
        );

        let msg = crate::message::parsed::parse("1", raw.as_bytes()).unwrap();
        let tree = MimePart::from_parsed(&msg);

        assert_eq!(tree.content_type, "multipart/mixed");
        assert_eq!(tree.parts.len(), 2);
        assert_eq!(
            tree.body_text().as_deref().map(str::trim),
            Some("See attached."),
        );

        let pdf = &tree.parts[1];
        assert_eq!(pdf.content_type, "application/pdf");
        assert_eq!(pdf.filename.as_deref(), Some("report.pdf"));
        assert!(pdf.attachment);
    }
}
