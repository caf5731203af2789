use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, WriteBytesExt};
use derive_new::new;

#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub version: u32,
    pub entries_count: u32,
}

impl IndexHeader {
    /// Read signature, version and entry count, rejecting anything but version 2
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let marker = cursor.read_bytes(SIGNATURE.len())?;
        if marker != SIGNATURE {
            return Err(Error::Format(format!(
                "invalid index signature {:02x?}",
                marker
            )));
        }

        let version = cursor.read_u32()?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        let entries_count = cursor.read_u32()?;

        Ok(IndexHeader {
            version,
            entries_count,
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.extend_from_slice(SIGNATURE);
        bytes.write_u32::<NetworkEndian>(self.version)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_header_round_trip() {
        let bytes = IndexHeader::new(VERSION, 3).serialize().unwrap();
        assert_eq!(bytes, b"DIRC\0\0\0\x02\0\0\0\x03");

        let header = IndexHeader::parse(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(header.entries_count, 3);
    }

    #[rstest]
    fn test_bad_signature() {
        let bytes = b"DIRX\0\0\0\x02\0\0\0\x00";

        assert!(matches!(
            IndexHeader::parse(&mut ByteCursor::new(bytes)),
            Err(Error::Format(_))
        ));
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(4)]
    fn test_version_gate(#[case] version: u32) {
        let bytes = IndexHeader::new(version, 0).serialize().unwrap();

        assert!(matches!(
            IndexHeader::parse(&mut ByteCursor::new(&bytes)),
            Err(Error::UnsupportedVersion(v)) if v == version
        ));
    }
}
