//! Best-effort decoding of an incomplete payload prefix.
//!
//! [`decode_prefix`] reads the same layout as [`decode`](super::decode) but
//! treats truncation as routine: it recovers every leading field whose bytes
//! are fully present and discards the first partially covered field together
//! with everything after it. No bit-level salvage of truncated media is
//! attempted, and the checksum trailer is never consulted. The function
//! returns `None` only when the leading descriptor (version byte through the
//! window field) cannot be parsed.

use bytes::Buf;

use super::{
    Attribution,
    Expiration,
    TransferWindow,
    codec::CODEC_VERSION,
};

/// Fields recovered from an incomplete payload prefix.
///
/// The descriptor fields (`created_at_ms`, `expiration`, `window`) are always
/// present; everything else is reported only when fully contained in the
/// prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialPayload {
    created_at_ms: i64,
    expiration: Expiration,
    window: Option<TransferWindow>,
    attribution: Option<Attribution>,
    text: Option<String>,
    image: Option<Vec<u8>>,
    audio: Option<Vec<u8>>,
}

impl PartialPayload {
    /// Return the creation timestamp in unix epoch milliseconds.
    #[must_use]
    pub const fn created_at_ms(&self) -> i64 { self.created_at_ms }

    /// Return the sender-chosen expiration mode.
    #[must_use]
    pub const fn expiration(&self) -> Expiration { self.expiration }

    /// Return the transfer window, if the sender set one.
    #[must_use]
    pub const fn window(&self) -> Option<TransferWindow> { self.window }

    /// Return the attribution record, if it was fully received.
    #[must_use]
    pub const fn attribution(&self) -> Option<&Attribution> { self.attribution.as_ref() }

    /// Return the message text, if it was fully received.
    #[must_use]
    pub fn text(&self) -> Option<&str> { self.text.as_deref() }

    /// Return the image bytes, if the image field was fully received.
    #[must_use]
    pub fn image(&self) -> Option<&[u8]> { self.image.as_deref() }

    /// Return the audio bytes, if the audio field was fully received.
    #[must_use]
    pub fn audio(&self) -> Option<&[u8]> { self.audio.as_deref() }
}

/// Recover whatever leading fields fully parse from `prefix`.
///
/// Never fails hard on truncation; gaps are an expected, routine condition.
#[must_use]
pub fn decode_prefix(prefix: &[u8]) -> Option<PartialPayload> {
    let mut cursor = Cursor { buf: prefix };

    if cursor.u8()? != CODEC_VERSION {
        return None;
    }
    let created_at_ms = cursor.i64()?;
    let expiration = cursor.expiration()?;
    let window = if cursor.flag()? {
        Some(TransferWindow::new(cursor.i64()?))
    } else {
        None
    };

    let mut partial = PartialPayload {
        created_at_ms,
        expiration,
        window,
        attribution: None,
        text: None,
        image: None,
        audio: None,
    };

    // Past the descriptor, truncation stops recovery instead of failing.
    partial_fields(&mut cursor, &mut partial);
    Some(partial)
}

/// Parse the variable fields; returns `false` at the first shortfall.
fn partial_fields(cursor: &mut Cursor<'_>, partial: &mut PartialPayload) -> bool {
    match cursor.flag() {
        Some(true) => {
            let Some(author_id) = cursor.u64() else { return false };
            let Some(name_len) = cursor.u16() else { return false };
            let Some(name) = cursor.bytes(usize::from(name_len)) else {
                return false;
            };
            let Ok(author) = std::str::from_utf8(name) else { return false };
            partial.attribution = Some(Attribution::new(author_id, author));
        }
        Some(false) => {}
        None => return false,
    }

    let Some(text_len) = cursor.u32() else { return false };
    let Some(text) = cursor.bytes(text_len as usize) else { return false };
    let Ok(text) = std::str::from_utf8(text) else { return false };
    partial.text = Some(text.to_owned());

    match cursor.block() {
        BlockOutcome::Present(image) => partial.image = Some(image),
        BlockOutcome::Absent => {}
        BlockOutcome::Truncated => return false,
    }
    match cursor.block() {
        BlockOutcome::Present(audio) => partial.audio = Some(audio),
        BlockOutcome::Absent => {}
        BlockOutcome::Truncated => return false,
    }
    true
}

enum BlockOutcome {
    Present(Vec<u8>),
    Absent,
    Truncated,
}

struct Cursor<'a> {
    buf: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn u8(&mut self) -> Option<u8> {
        (self.buf.remaining() >= 1).then(|| self.buf.get_u8())
    }

    fn u16(&mut self) -> Option<u16> {
        (self.buf.remaining() >= 2).then(|| self.buf.get_u16())
    }

    fn u32(&mut self) -> Option<u32> {
        (self.buf.remaining() >= 4).then(|| self.buf.get_u32())
    }

    fn u64(&mut self) -> Option<u64> {
        (self.buf.remaining() >= 8).then(|| self.buf.get_u64())
    }

    fn i64(&mut self) -> Option<i64> {
        (self.buf.remaining() >= 8).then(|| self.buf.get_i64())
    }

    fn bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.buf.remaining() < len {
            return None;
        }
        let (taken, rest) = self.buf.split_at(len);
        self.buf = rest;
        Some(taken)
    }

    /// A flag byte outside {0, 1} reads as truncation: the prefix is not
    /// trustworthy beyond this point.
    fn flag(&mut self) -> Option<bool> {
        match self.u8()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    fn expiration(&mut self) -> Option<Expiration> {
        let mut remainder = self.buf;
        let expiration = super::codec::take_expiration(&mut remainder).ok()?;
        self.buf = remainder;
        Some(expiration)
    }

    fn block(&mut self) -> BlockOutcome {
        match self.flag() {
            Some(false) => BlockOutcome::Absent,
            Some(true) => {
                let Some(len) = self.u32() else {
                    return BlockOutcome::Truncated;
                };
                match self.bytes(len as usize) {
                    Some(bytes) => BlockOutcome::Present(bytes.to_vec()),
                    None => BlockOutcome::Truncated,
                }
            }
            None => BlockOutcome::Truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::payload::{LogicalPayload, encode};

    fn sample() -> LogicalPayload {
        LogicalPayload::new("hold the door", Expiration::Countdown(NonZeroU32::new(10).expect("non-zero")))
            .with_created_at_ms(42)
            .with_window(TransferWindow::new(9_000))
            .with_attribution(Attribution::new(7, "brin"))
            .with_image(vec![1, 2, 3, 4, 5, 6, 7, 8])
            .with_audio(vec![9, 9, 9])
    }

    #[test]
    fn recovers_everything_from_a_complete_buffer() {
        let encoded = encode(&sample()).expect("encode payload");
        let partial = decode_prefix(&encoded).expect("descriptor parses");
        assert_eq!(partial.text(), Some("hold the door"));
        assert_eq!(partial.image(), Some(&[1, 2, 3, 4, 5, 6, 7, 8][..]));
        assert_eq!(partial.audio(), Some(&[9, 9, 9][..]));
        assert_eq!(partial.window(), Some(TransferWindow::new(9_000)));
    }

    #[test]
    fn truncated_image_keeps_text_and_drops_media() {
        let encoded = encode(&sample()).expect("encode payload");
        // Drop the crc (4), the whole audio block (8), and the last byte of
        // the image data, leaving the cut inside the image block.
        let cut = encoded.len() - 13;
        let partial = decode_prefix(&encoded[..cut]).expect("descriptor parses");
        assert_eq!(partial.text(), Some("hold the door"));
        assert_eq!(partial.expiration().countdown(), NonZeroU32::new(10));
        assert!(partial.image().is_none());
        assert!(partial.audio().is_none());
    }

    #[test]
    fn truncated_text_still_reports_descriptor() {
        let encoded = encode(&sample()).expect("encode payload");
        // Descriptor: version(1) + created(8) + tag(1) + secs(4) + window flag(1)
        // + deadline(8) = 23 bytes; attribution begins right after.
        let partial = decode_prefix(&encoded[..25]).expect("descriptor parses");
        assert_eq!(partial.created_at_ms(), 42);
        assert!(partial.attribution().is_none());
        assert!(partial.text().is_none());
    }

    #[test]
    fn missing_descriptor_yields_none() {
        let encoded = encode(&sample()).expect("encode payload");
        assert!(decode_prefix(&encoded[..10]).is_none());
        assert!(decode_prefix(&[]).is_none());
    }

    #[test]
    fn unsupported_version_yields_none() {
        let mut encoded = encode(&sample()).expect("encode payload");
        encoded[0] = 2;
        assert!(decode_prefix(&encoded).is_none());
    }
}
