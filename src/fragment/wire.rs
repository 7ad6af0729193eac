//! Encoding helpers for the content of a single optical code.
//!
//! Each optical code carries a short magic marker, the encoded
//! [`FragmentHeader`], and the raw fragment bytes. The marker lets the
//! capture pipeline distinguish transfer fragments from unrelated optical
//! codes a camera may wander across, and the length-prefixed header keeps
//! the framing self-describing.

use std::num::NonZeroUsize;

use bincode::{
    borrow_decode_from_slice,
    config,
    encode_to_vec,
    error::{DecodeError, EncodeError},
};

use super::{FragmentCount, FragmentHeader, FragmentIndex, TransferTag};

/// Magic prefix that marks an optical code as a transfer fragment.
pub const FRAGMENT_MAGIC: &[u8; 4] = b"OPTC";

/// Upper bound on the bytes needed to wrap a fragment, excluding its body.
///
/// The header uses variable-width integer encoding, so the exact overhead
/// depends on the index and total; the bound is computed from a header with
/// every field at its widest.
///
/// # Panics
///
/// Panics if encoding the constant worst-case header fails, which would
/// indicate a programmer error in the header definition.
#[must_use]
pub fn fragment_overhead() -> NonZeroUsize {
    let widest = FragmentHeader::new(
        TransferTag::SurveyResponse,
        FragmentIndex::new(u32::MAX),
        FragmentCount::new(u32::MAX).unwrap_or(FragmentCount::ONE),
    );
    let header_bytes = encode_to_vec(widest, config::standard())
        .unwrap_or_else(|err| panic!("worst-case fragment header must encode: {err}"));
    // Magic + length prefix (u16 big-endian) + encoded header.
    let overhead = FRAGMENT_MAGIC.len() + std::mem::size_of::<u16>() + header_bytes.len();
    NonZeroUsize::new(overhead)
        .unwrap_or_else(|| panic!("fragment overhead must be non-zero (computed {overhead})"))
}

/// Encode a fragment for display as one optical code.
///
/// The returned buffer layout is:
/// `[FRAGMENT_MAGIC][u16 header_len][header bytes][fragment payload]`.
///
/// # Errors
///
/// Returns an [`EncodeError`] if the header cannot be encoded.
pub fn encode_fragment(header: FragmentHeader, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let header_bytes = encode_to_vec(header, config::standard())?;
    let header_len = u16::try_from(header_bytes.len())
        .map_err(|_| EncodeError::Other("fragment header length must fit within u16::MAX"))?;

    let mut buf = Vec::with_capacity(
        FRAGMENT_MAGIC.len() + std::mem::size_of::<u16>() + header_bytes.len() + payload.len(),
    );
    buf.extend_from_slice(FRAGMENT_MAGIC);
    buf.extend_from_slice(&header_len.to_be_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Attempt to decode a captured optical payload as a transfer fragment.
///
/// Returns `Ok(Some((header, payload)))` when `capture` carries the fragment
/// marker and a valid encoded header, `Ok(None)` when the marker is absent
/// (an unrelated optical code), or an error if the marker is present but
/// decoding fails.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the marker is present but the header bytes
/// cannot be decoded.
pub fn decode_fragment(capture: &[u8]) -> Result<Option<(FragmentHeader, &[u8])>, DecodeError> {
    let minimum_len = FRAGMENT_MAGIC.len() + std::mem::size_of::<u16>();
    if capture.len() < minimum_len {
        return Ok(None);
    }

    let Some(prefix) = capture.get(..FRAGMENT_MAGIC.len()) else {
        return Ok(None);
    };
    if prefix != FRAGMENT_MAGIC {
        return Ok(None);
    }

    let len_offset = FRAGMENT_MAGIC.len();
    let len_bytes = match (capture.get(len_offset), capture.get(len_offset + 1)) {
        (Some(a), Some(b)) => [*a, *b],
        _ => {
            return Err(DecodeError::UnexpectedEnd {
                additional: minimum_len - capture.len(),
            });
        }
    };
    let header_len = usize::from(u16::from_be_bytes(len_bytes));
    let header_start = len_offset + std::mem::size_of::<u16>();
    let header_end = header_start + header_len;

    let Some(header_bytes) = capture.get(header_start..header_end) else {
        return Err(DecodeError::UnexpectedEnd {
            additional: header_end.saturating_sub(capture.len()),
        });
    };

    let (header, consumed) =
        borrow_decode_from_slice::<FragmentHeader, _>(header_bytes, config::standard())?;
    if consumed != header_len {
        return Err(DecodeError::OtherString(
            "fragment header length mismatch".to_string(),
        ));
    }

    let payload = capture.get(header_end..).unwrap_or_default();
    Ok(Some((header, payload)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(index: u32, total: u32) -> FragmentHeader {
        FragmentHeader::new(
            TransferTag::Direct,
            FragmentIndex::new(index),
            FragmentCount::new(total).expect("positive total"),
        )
    }

    #[test]
    fn round_trips_fragment_wire_form() {
        let header = header(2, 4);
        let payload = [1_u8, 2, 3, 4];

        let encoded = encode_fragment(header, &payload).expect("encode fragment");
        let decoded = decode_fragment(&encoded)
            .expect("decode fragment")
            .expect("fragment marker present");
        assert_eq!(decoded.0, header);
        assert_eq!(decoded.1, payload);
    }

    #[test]
    fn decode_returns_none_for_unrelated_captures() {
        let capture = [0_u8, 1, 2, 3, 4, 5, 6];
        assert!(decode_fragment(&capture).expect("decode ok").is_none());
        assert!(decode_fragment(b"OP").expect("decode ok").is_none());
    }

    #[test]
    fn overhead_bounds_every_encoded_header() {
        for (index, total) in [(0, 1), (3, 4), (u32::MAX - 1, u32::MAX)] {
            let encoded = bincode::encode_to_vec(header(index, total), bincode::config::standard())
                .expect("encode header");
            let wrapped = FRAGMENT_MAGIC.len() + std::mem::size_of::<u16>() + encoded.len();
            assert!(wrapped <= fragment_overhead().get());
        }
    }

    #[test]
    fn decode_rejects_truncated_header() {
        let encoded = bincode::encode_to_vec(header(1, 2), bincode::config::standard())
            .expect("encode header");

        // Advertise more header bytes than the capture carries.
        let advertised: u16 = (encoded.len() + 4)
            .try_into()
            .expect("encoded header length must stay within u16");
        let mut capture = Vec::new();
        capture.extend_from_slice(FRAGMENT_MAGIC);
        capture.extend_from_slice(&advertised.to_be_bytes());
        capture.extend_from_slice(&encoded);

        let err = decode_fragment(&capture).expect_err("expected decode failure");
        assert!(matches!(err, DecodeError::UnexpectedEnd { .. }));
    }

    #[test]
    fn decode_rejects_header_length_mismatch() {
        let mut encoded = bincode::encode_to_vec(header(5, 6), bincode::config::standard())
            .expect("encode header");
        encoded.extend_from_slice(&[0_u8, 1]); // padding the advertised length beyond what decoding consumes
        let advertised: u16 = encoded
            .len()
            .try_into()
            .expect("padded header length must fit in u16");

        let mut capture = Vec::new();
        capture.extend_from_slice(FRAGMENT_MAGIC);
        capture.extend_from_slice(&advertised.to_be_bytes());
        capture.extend_from_slice(&encoded);

        let err = decode_fragment(&capture).expect_err("expected decode failure");
        assert!(matches!(err, DecodeError::OtherString(_)));
    }
}
