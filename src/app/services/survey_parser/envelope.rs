//! Binary mail container of the in-game mail export
//!
//! Layout, in order: an unidentified leading block, a 1-byte sender length
//! and the sender, an unidentified block, a 1-byte title length and the
//! title, a 4-byte body length and the body. Lengths count bytes and every
//! string is UTF-16BE.

use crate::config::LengthByteOrder;
use crate::constants::{MAIL_BODY_LENGTH_WIDTH, MAIL_LEADING_BLOCK_LEN, MAIL_SENDER_TRAILER_LEN};
use crate::{Error, Result};

/// Strings carried by one exported mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEnvelope {
    pub sender: String,
    pub title: String,
    pub body: String,
}

impl MailEnvelope {
    /// Unwrap a mail container
    pub fn read(bytes: &[u8], length_order: LengthByteOrder) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);

        reader.skip(MAIL_LEADING_BLOCK_LEN, "leading block")?;
        let sender_len = reader.read_u8("sender length")? as usize;
        let sender = reader.read_utf16(sender_len, "sender")?;

        reader.skip(MAIL_SENDER_TRAILER_LEN, "sender trailer")?;
        let title_len = reader.read_u8("title length")? as usize;
        let title = reader.read_utf16(title_len, "title")?;

        let body_len = reader.read_u32(length_order, "body length")? as usize;
        let body = reader.read_utf16(body_len, "body")?;

        Ok(Self {
            sender,
            title,
            body,
        })
    }

    /// Whether the title marks a system survey
    pub fn is_survey(&self, title_marker: &str) -> bool {
        self.title.starts_with(title_marker)
    }
}

/// Bounds-checked reader over the container bytes
#[derive(Debug)]
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                Error::envelope(
                    self.offset,
                    format!(
                        "truncated {}: need {} bytes, {} left",
                        field,
                        len,
                        self.bytes.len() - self.offset
                    ),
                )
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize, field: &str) -> Result<()> {
        self.take(len, field).map(|_| ())
    }

    fn read_u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    fn read_u32(&mut self, order: LengthByteOrder, field: &str) -> Result<u32> {
        let mut raw = [0u8; MAIL_BODY_LENGTH_WIDTH];
        raw.copy_from_slice(self.take(MAIL_BODY_LENGTH_WIDTH, field)?);
        Ok(order.read_u32(raw))
    }

    fn read_utf16(&mut self, len: usize, field: &str) -> Result<String> {
        let start = self.offset;
        if len % 2 != 0 {
            return Err(Error::envelope(
                start,
                format!("{} length {} is not a whole number of UTF-16 units", field, len),
            ));
        }

        let units = self
            .take(len, field)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

        char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(|e| Error::envelope(start, format!("invalid UTF-16 in {}: {}", field, e)))
    }
}
