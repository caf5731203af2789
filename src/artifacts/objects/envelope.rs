//! Object envelope: `<type> <decimal-size>\0<payload>`
//!
//! The header is ASCII, the payload arbitrary binary. Decoding is a bounded
//! scan for the first NUL over the raw bytes; the payload is never treated as
//! text.

use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// Decoded envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub object_type: ObjectType,
    /// Declared payload length
    pub size: usize,
    /// Offset of the first payload byte, just past the NUL
    pub payload_offset: usize,
}

impl Envelope {
    pub fn encode(object_type: ObjectType, payload: &[u8]) -> Bytes {
        let header = format!("{} {}\0", object_type.as_str(), payload.len());

        let mut bytes = BytesMut::with_capacity(header.len() + payload.len());
        bytes.put_slice(header.as_bytes());
        bytes.put_slice(payload);
        bytes.freeze()
    }

    /// Decode the header and check the declared size against the payload
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let nul = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::CorruptObject("missing NUL after object header".into()))?;
        let header = &bytes[..nul];

        let mut tokens = header.split(|&b| b == b' ');
        let (type_token, size_token) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(type_token), Some(size_token), None) => (type_token, size_token),
            _ => {
                return Err(Error::CorruptObject(format!(
                    "malformed object header '{}'",
                    String::from_utf8_lossy(header)
                )));
            }
        };

        let object_type = ObjectType::parse(type_token)?;
        let size = parse_size(size_token)?;

        let payload_offset = nul + 1;
        let actual = bytes.len() - payload_offset;
        if actual != size {
            return Err(Error::CorruptObject(format!(
                "{object_type} declares {size} byte(s) but carries {actual}"
            )));
        }

        Ok(Envelope {
            object_type,
            size,
            payload_offset,
        })
    }

    pub fn payload<'b>(&self, bytes: &'b [u8]) -> &'b [u8] {
        &bytes[self.payload_offset..]
    }
}

fn parse_size(token: &[u8]) -> Result<usize> {
    let invalid = || {
        Error::CorruptObject(format!(
            "invalid object size '{}'",
            String::from_utf8_lossy(token)
        ))
    };

    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }

    std::str::from_utf8(token)
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn test_encode_blob() {
        let bytes = Envelope::encode(ObjectType::Blob, b"hello world");

        assert_eq!(&bytes[..], b"blob 11\0hello world");
    }

    #[rstest]
    fn test_encode_empty_tree() {
        let bytes = Envelope::encode(ObjectType::Tree, b"");

        assert_eq!(&bytes[..], b"tree 0\0");
    }

    #[rstest]
    fn test_decode_binary_payload_with_inner_nuls() {
        let bytes = b"blob 4\0\0\x01\0\xff";
        let envelope = Envelope::decode(bytes).unwrap();

        assert_eq!(envelope.object_type, ObjectType::Blob);
        assert_eq!(envelope.size, 4);
        assert_eq!(envelope.payload_offset, 7);
        assert_eq!(envelope.payload(bytes), b"\0\x01\0\xff");
    }

    #[rstest]
    #[case::no_nul(b"blob 5hello".as_slice())]
    #[case::no_space(b"blob5\0hello".as_slice())]
    #[case::two_spaces(b"blob  5\0hello".as_slice())]
    #[case::extra_token(b"blob 5 x\0hello".as_slice())]
    #[case::signed_size(b"blob -5\0hello".as_slice())]
    #[case::hex_size(b"blob 0x5\0hello".as_slice())]
    #[case::empty_size(b"blob \0hello".as_slice())]
    #[case::unknown_type(b"tag 5\0hello".as_slice())]
    #[case::size_too_large(b"blob 6\0hello".as_slice())]
    #[case::size_too_small(b"blob 4\0hello".as_slice())]
    fn test_decode_rejects_malformed_envelopes(#[case] bytes: &[u8]) {
        assert!(matches!(
            Envelope::decode(bytes),
            Err(Error::CorruptObject(_))
        ));
    }

    proptest! {
        #[test]
        fn envelope_round_trips(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let bytes = Envelope::encode(ObjectType::Blob, &payload);
            let envelope = Envelope::decode(&bytes).unwrap();

            prop_assert_eq!(envelope.object_type, ObjectType::Blob);
            prop_assert_eq!(envelope.size, payload.len());
            prop_assert_eq!(envelope.payload(&bytes), &payload[..]);
        }
    }
}
