//! Versioned byte codec for [`LogicalPayload`].
//!
//! The encoding is self-describing: every variable-length field carries an
//! explicit length prefix, fixed metadata precedes variable media, and a
//! CRC32 trailer covers the whole body. Layout, version 1, integers
//! big-endian:
//!
//! ```text
//! u8  version (0x01)
//! i64 created_at_ms
//! u8  expiration tag        1 = countdown, 2 = read-once, 3 = permanent
//! u32 countdown seconds     (tag 1 only, must be non-zero)
//! u8  window flag           0 | 1
//! i64 window deadline_ms    (flag 1 only)
//! u8  attribution flag      0 | 1
//! u64 author id             (flag 1 only)
//! u16 author name length + UTF-8 bytes
//! u32 text length + UTF-8 bytes
//! u8  image flag; u32 length + bytes (flag 1 only)
//! u8  audio flag; u32 length + bytes (flag 1 only)
//! u32 crc32 (IEEE) over all preceding bytes
//! ```
//!
//! Metadata-first ordering is what makes the assembler's partial
//! reconstruction useful: the expiry semantics and text land in the earliest
//! fragments, ahead of any bulky media field.

use bytes::{Buf, BufMut};

use super::{
    Attribution,
    Expiration,
    LogicalPayload,
    PayloadError,
    TransferWindow,
};

/// Version byte this build writes and accepts.
pub const CODEC_VERSION: u8 = 1;

/// Bytes occupied by the CRC32 trailer.
pub(super) const TRAILER_LEN: usize = 4;

const EXPIRATION_COUNTDOWN: u8 = 1;
const EXPIRATION_READ_ONCE: u8 = 2;
const EXPIRATION_PERMANENT: u8 = 3;

/// Serialise a payload into its transfer byte sequence.
///
/// # Errors
///
/// Returns [`PayloadError::FieldTooLong`] when a field exceeds its length
/// prefix (author names above `u16::MAX` bytes, text or media above
/// `u32::MAX` bytes).
pub fn encode(payload: &LogicalPayload) -> Result<Vec<u8>, PayloadError> {
    let mut buf = Vec::with_capacity(encoded_size_hint(payload));

    buf.put_u8(CODEC_VERSION);
    buf.put_i64(payload.created_at_ms());

    match payload.expiration() {
        Expiration::Countdown(seconds) => {
            buf.put_u8(EXPIRATION_COUNTDOWN);
            buf.put_u32(seconds.get());
        }
        Expiration::ReadOnce => buf.put_u8(EXPIRATION_READ_ONCE),
        Expiration::Permanent => buf.put_u8(EXPIRATION_PERMANENT),
    }

    match payload.window() {
        Some(window) => {
            buf.put_u8(1);
            buf.put_i64(window.deadline_ms());
        }
        None => buf.put_u8(0),
    }

    match payload.attribution() {
        Some(attribution) => {
            buf.put_u8(1);
            buf.put_u64(attribution.author_id());
            let name = attribution.author().as_bytes();
            let name_len = u16::try_from(name.len())
                .map_err(|_| PayloadError::FieldTooLong { field: "author name" })?;
            buf.put_u16(name_len);
            buf.put_slice(name);
        }
        None => buf.put_u8(0),
    }

    put_u32_block(&mut buf, payload.text().as_bytes(), "text")?;
    put_optional_block(&mut buf, payload.image(), "image")?;
    put_optional_block(&mut buf, payload.audio(), "audio")?;

    let checksum = crc32fast::hash(&buf);
    buf.put_u32(checksum);
    Ok(buf)
}

/// Deserialise a payload from its transfer byte sequence.
///
/// # Errors
///
/// Returns [`PayloadError::UnsupportedVersion`] when the leading format tag
/// is unknown, [`PayloadError::ChecksumMismatch`] when the trailer does not
/// match the body, and [`PayloadError::Malformed`] when field boundaries are
/// inconsistent, a flag byte is out of range, or bytes trail the last field.
pub fn decode(bytes: &[u8]) -> Result<LogicalPayload, PayloadError> {
    let Some(&version) = bytes.first() else {
        return Err(PayloadError::Malformed("empty buffer"));
    };
    if version != CODEC_VERSION {
        return Err(PayloadError::UnsupportedVersion {
            found: version,
            expected: CODEC_VERSION,
        });
    }
    if bytes.len() < 1 + TRAILER_LEN {
        return Err(PayloadError::Malformed("buffer shorter than checksum trailer"));
    }

    let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_LEN);
    let mut trailer = trailer;
    let stored = trailer.get_u32();
    let computed = crc32fast::hash(body);
    if stored != computed {
        return Err(PayloadError::ChecksumMismatch { stored, computed });
    }

    let mut buf = body;
    take_u8(&mut buf, "version")?;
    let created_at_ms = take_i64(&mut buf, "creation timestamp")?;
    let expiration = take_expiration(&mut buf)?;

    let window = if take_flag(&mut buf, "window flag")? {
        Some(TransferWindow::new(take_i64(&mut buf, "window deadline")?))
    } else {
        None
    };

    let attribution = if take_flag(&mut buf, "attribution flag")? {
        let author_id = take_u64(&mut buf, "author id")?;
        let name_len = usize::from(take_u16(&mut buf, "author name length")?);
        let name = take_bytes(&mut buf, name_len, "author name")?;
        let author = String::from_utf8(name)
            .map_err(|_| PayloadError::Malformed("author name is not valid UTF-8"))?;
        Some(Attribution::new(author_id, author))
    } else {
        None
    };

    let text_len = take_len_u32(&mut buf, "text length")?;
    let text = String::from_utf8(take_bytes(&mut buf, text_len, "text")?)
        .map_err(|_| PayloadError::Malformed("text is not valid UTF-8"))?;

    let image = take_optional_block(&mut buf, "image")?;
    let audio = take_optional_block(&mut buf, "audio")?;

    if buf.has_remaining() {
        return Err(PayloadError::Malformed("trailing bytes after audio field"));
    }

    let mut payload = LogicalPayload::new(text, expiration).with_created_at_ms(created_at_ms);
    if let Some(window) = window {
        payload = payload.with_window(window);
    }
    if let Some(attribution) = attribution {
        payload = payload.with_attribution(attribution);
    }
    if let Some(image) = image {
        payload = payload.with_image(image);
    }
    if let Some(audio) = audio {
        payload = payload.with_audio(audio);
    }
    Ok(payload)
}

fn encoded_size_hint(payload: &LogicalPayload) -> usize {
    let media = payload.image().map_or(0, <[u8]>::len) + payload.audio().map_or(0, <[u8]>::len);
    // Fixed metadata plus prefixes stays well under 64 bytes.
    64 + payload.text().len() + media
}

fn put_u32_block(buf: &mut Vec<u8>, block: &[u8], field: &'static str) -> Result<(), PayloadError> {
    let len =
        u32::try_from(block.len()).map_err(|_| PayloadError::FieldTooLong { field })?;
    buf.put_u32(len);
    buf.put_slice(block);
    Ok(())
}

fn put_optional_block(
    buf: &mut Vec<u8>,
    block: Option<&[u8]>,
    field: &'static str,
) -> Result<(), PayloadError> {
    match block {
        Some(block) => {
            buf.put_u8(1);
            put_u32_block(buf, block, field)
        }
        None => {
            buf.put_u8(0);
            Ok(())
        }
    }
}

pub(super) fn take_u8(buf: &mut &[u8], context: &'static str) -> Result<u8, PayloadError> {
    if buf.remaining() < 1 {
        return Err(PayloadError::Malformed(context));
    }
    Ok(buf.get_u8())
}

pub(super) fn take_u16(buf: &mut &[u8], context: &'static str) -> Result<u16, PayloadError> {
    if buf.remaining() < 2 {
        return Err(PayloadError::Malformed(context));
    }
    Ok(buf.get_u16())
}

pub(super) fn take_u64(buf: &mut &[u8], context: &'static str) -> Result<u64, PayloadError> {
    if buf.remaining() < 8 {
        return Err(PayloadError::Malformed(context));
    }
    Ok(buf.get_u64())
}

pub(super) fn take_i64(buf: &mut &[u8], context: &'static str) -> Result<i64, PayloadError> {
    if buf.remaining() < 8 {
        return Err(PayloadError::Malformed(context));
    }
    Ok(buf.get_i64())
}

pub(super) fn take_u32(buf: &mut &[u8], context: &'static str) -> Result<u32, PayloadError> {
    if buf.remaining() < 4 {
        return Err(PayloadError::Malformed(context));
    }
    Ok(buf.get_u32())
}

pub(super) fn take_len_u32(buf: &mut &[u8], context: &'static str) -> Result<usize, PayloadError> {
    take_u32(buf, context).map(|len| len as usize)
}

pub(super) fn take_flag(buf: &mut &[u8], context: &'static str) -> Result<bool, PayloadError> {
    match take_u8(buf, context)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(PayloadError::Malformed(context)),
    }
}

pub(super) fn take_bytes(
    buf: &mut &[u8],
    len: usize,
    context: &'static str,
) -> Result<Vec<u8>, PayloadError> {
    if buf.remaining() < len {
        return Err(PayloadError::Malformed(context));
    }
    let mut bytes = vec![0_u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

pub(super) fn take_expiration(buf: &mut &[u8]) -> Result<Expiration, PayloadError> {
    match take_u8(buf, "expiration tag")? {
        EXPIRATION_COUNTDOWN => {
            let seconds = take_u32(buf, "countdown seconds")?;
            let seconds = std::num::NonZeroU32::new(seconds)
                .ok_or(PayloadError::Malformed("countdown of zero seconds"))?;
            Ok(Expiration::Countdown(seconds))
        }
        EXPIRATION_READ_ONCE => Ok(Expiration::ReadOnce),
        EXPIRATION_PERMANENT => Ok(Expiration::Permanent),
        _ => Err(PayloadError::Malformed("unknown expiration tag")),
    }
}

fn take_optional_block(
    buf: &mut &[u8],
    context: &'static str,
) -> Result<Option<Vec<u8>>, PayloadError> {
    if !take_flag(buf, context)? {
        return Ok(None);
    }
    let len = take_len_u32(buf, context)?;
    take_bytes(buf, len, context).map(Some)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::payload::Attribution;

    fn full_payload() -> LogicalPayload {
        LogicalPayload::new("soup at six", Expiration::Countdown(NonZeroU32::new(30).expect("non-zero")))
            .with_created_at_ms(1_700_000_000_000)
            .with_window(TransferWindow::new(1_700_000_300_000))
            .with_attribution(Attribution::new(77, "ada"))
            .with_image(vec![0xFF, 0xD8, 0xFF, 0xE0])
            .with_audio(vec![0x52, 0x49, 0x46, 0x46])
    }

    #[test]
    fn round_trips_full_payload() {
        let payload = full_payload();
        let encoded = encode(&payload).expect("encode payload");
        let decoded = decode(&encoded).expect("decode payload");
        assert_eq!(decoded, payload);
        // Byte-identical re-encoding is the codec's stability contract.
        assert_eq!(encode(&decoded).expect("re-encode payload"), encoded);
    }

    #[test]
    fn round_trips_minimal_payload() {
        let payload = LogicalPayload::new("", Expiration::ReadOnce).with_created_at_ms(0);
        let encoded = encode(&payload).expect("encode payload");
        assert_eq!(decode(&encoded).expect("decode payload"), payload);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut encoded = encode(&full_payload()).expect("encode payload");
        encoded[0] = 9;
        assert_eq!(
            decode(&encoded),
            Err(PayloadError::UnsupportedVersion { found: 9, expected: CODEC_VERSION })
        );
    }

    #[test]
    fn rejects_flipped_body_byte() {
        let mut encoded = encode(&full_payload()).expect("encode payload");
        let mid = encoded.len() / 2;
        encoded[mid] ^= 0x40;
        assert!(matches!(
            decode(&encoded),
            Err(PayloadError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn rejects_truncated_buffer() {
        let encoded = encode(&full_payload()).expect("encode payload");
        let truncated = &encoded[..encoded.len() - 9];
        // Truncation breaks the checksum before field parsing is reached.
        assert!(decode(truncated).is_err());
    }

    #[test]
    fn rejects_trailing_bytes() {
        let payload = LogicalPayload::new("x", Expiration::Permanent).with_created_at_ms(5);
        let mut encoded = encode(&payload).expect("encode payload");
        // Keep the checksum honest so only the structural check can fire.
        let trailer_start = encoded.len() - TRAILER_LEN;
        encoded.truncate(trailer_start);
        encoded.push(0);
        let checksum = crc32fast::hash(&encoded);
        encoded.extend_from_slice(&checksum.to_be_bytes());
        assert_eq!(
            decode(&encoded),
            Err(PayloadError::Malformed("trailing bytes after audio field"))
        );
    }

    #[test]
    fn rejects_zero_second_countdown_on_the_wire() {
        let payload = LogicalPayload::new("", Expiration::ReadOnce).with_created_at_ms(0);
        let mut encoded = encode(&payload).expect("encode payload");
        // Patch the expiration tag to countdown without supplying seconds.
        encoded[9] = 1;
        let trailer_start = encoded.len() - TRAILER_LEN;
        encoded.truncate(trailer_start);
        let checksum = crc32fast::hash(&encoded);
        encoded.extend_from_slice(&checksum.to_be_bytes());
        assert!(matches!(decode(&encoded), Err(PayloadError::Malformed(_))));
    }

    #[test]
    fn rejects_empty_buffer() {
        assert_eq!(decode(&[]), Err(PayloadError::Malformed("empty buffer")));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trips_arbitrary_payloads(
            text in ".{0,48}",
            image in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..96)),
            audio in proptest::option::of(proptest::collection::vec(any::<u8>(), 0..96)),
            created_at_ms in any::<i64>(),
            seconds in proptest::option::of(1_u32..),
            deadline_ms in proptest::option::of(any::<i64>()),
            author in proptest::option::of((any::<u64>(), ".{0,16}")),
        ) {
            let expiration = match seconds {
                Some(seconds) => Expiration::Countdown(
                    NonZeroU32::new(seconds).expect("strictly positive"),
                ),
                None => Expiration::ReadOnce,
            };
            let mut payload =
                LogicalPayload::new(text, expiration).with_created_at_ms(created_at_ms);
            if let Some(image) = image {
                payload = payload.with_image(image);
            }
            if let Some(audio) = audio {
                payload = payload.with_audio(audio);
            }
            if let Some(deadline_ms) = deadline_ms {
                payload = payload.with_window(TransferWindow::new(deadline_ms));
            }
            if let Some((author_id, name)) = author {
                payload = payload.with_attribution(Attribution::new(author_id, name));
            }

            let encoded = encode(&payload).expect("encode payload");
            let decoded = decode(&encoded).expect("decode payload");
            prop_assert_eq!(&decoded, &payload);
            prop_assert_eq!(encode(&decoded).expect("re-encode"), encoded);
        }
    }
}
