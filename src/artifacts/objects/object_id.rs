//! Object identifier (SHA-1 digest)
//!
//! An id is the 20-byte SHA-1 digest of an object's uncompressed envelope.
//! It renders as 40 lowercase hexadecimal characters.
//!
//! ## Storage
//!
//! Objects are stored in `objects/<first-2-chars>/<remaining-38-chars>`

use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::objects::{OBJECT_ID_HEX_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::path::PathBuf;
use std::str::FromStr;

/// Object identifier, always exactly 20 raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LENGTH]);

impl ObjectId {
    /// Digest of `content` as a whole
    pub fn hash_of(content: &[u8]) -> Self {
        ObjectId(Sha1::digest(content).into())
    }

    /// Build from raw digest bytes, rejecting anything that is not 20 bytes long
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let digest: [u8; OBJECT_ID_LENGTH] = bytes.try_into().map_err(|_| {
            Error::Format(format!(
                "object id must be {} bytes, got {}",
                OBJECT_ID_LENGTH,
                bytes.len()
            ))
        })?;

        Ok(ObjectId(digest))
    }

    /// Parse and validate a 40-character hexadecimal id
    pub fn try_parse(id: &str) -> Result<Self> {
        if id.len() != OBJECT_ID_HEX_LENGTH {
            return Err(Error::Format(format!(
                "invalid object id length {} for '{}'",
                id.len(),
                id
            )));
        }

        let bytes =
            hex::decode(id).map_err(|e| Error::Format(format!("invalid object id '{id}': {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Read 20 raw bytes from the cursor
    pub fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Self::from_bytes(cursor.read_bytes(OBJECT_ID_LENGTH)?)
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Split the hex form as `XX/YYYY...`, e.g. `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hex form
    pub fn to_short_oid(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_parse(s)
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[rstest]
    fn test_hex_round_trip() {
        let oid = ObjectId::try_parse(EMPTY_BLOB).unwrap();

        assert_eq!(oid.as_bytes()[0], 0xe6);
        assert_eq!(oid.to_hex(), EMPTY_BLOB);
        assert_eq!(oid.to_string(), EMPTY_BLOB);
    }

    #[rstest]
    fn test_uppercase_hex_renders_lowercase() {
        let oid = ObjectId::try_parse(&EMPTY_BLOB.to_uppercase()).unwrap();

        assert_eq!(oid.to_hex(), EMPTY_BLOB);
    }

    #[rstest]
    #[case("")]
    #[case("e69de29b")]
    #[case("e69de29bb2d1d6434b8b29ae775ad8c2e48c539100")]
    #[case("z69de29bb2d1d6434b8b29ae775ad8c2e48c5391")]
    fn test_invalid_hex_is_rejected(#[case] id: &str) {
        assert!(matches!(ObjectId::try_parse(id), Err(Error::Format(_))));
    }

    #[rstest]
    #[case(0)]
    #[case(19)]
    #[case(21)]
    fn test_raw_bytes_must_be_twenty_long(#[case] len: usize) {
        let bytes = vec![0xab; len];

        assert!(matches!(ObjectId::from_bytes(&bytes), Err(Error::Format(_))));
    }

    #[rstest]
    fn test_hash_of_empty_blob_envelope() {
        assert_eq!(ObjectId::hash_of(b"blob 0\0").to_hex(), EMPTY_BLOB);
    }

    #[rstest]
    fn test_to_path_splits_fan_out_directory() {
        let oid = ObjectId::try_parse(EMPTY_BLOB).unwrap();

        assert_eq!(
            oid.to_path(),
            PathBuf::from("e6").join("9de29bb2d1d6434b8b29ae775ad8c2e48c5391")
        );
        assert_eq!(oid.to_short_oid(), "e69de29");
    }
}
