//! Index file format
//!
//! The index (staging area, "dircache") records what the next snapshot will
//! contain, plus stat data for each path.
//!
//! ## File Format (Version 2)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Each entry padded to 8-byte alignment
//!   - Contains metadata and path
//!
//! Extensions (optional, carried verbatim)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! Entries are expected in ascending (path bytes, stage) order. The reader
//! does not enforce it; the writer always produces it.

pub mod checksum;
pub mod index_entry;
pub mod index_header;

use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::index::index_header::IndexHeader;
use crate::errors::{Error, Result};
use bytes::Bytes;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"DIRC";

/// The only supported index file format version
pub const VERSION: u32 = 2;

/// Fixed-size part of an entry, up to and including the flags
pub const ENTRY_FIXED_SIZE: usize = 62;

/// Entries are padded to a multiple of this
pub const ENTRY_BLOCK: usize = 8;

/// Decoded contents of an index file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexFile {
    /// Entries in file order
    pub entries: Vec<IndexEntry>,
    /// Raw bytes between the last entry and the checksum
    pub extensions: Bytes,
}

impl IndexFile {
    /// Decode a complete index file.
    ///
    /// The header is validated first, so an unsupported version is reported
    /// without touching entries. The trailing checksum is verified before the
    /// entries are parsed: a corrupted entry region is a checksum failure, not
    /// a structural one.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = IndexHeader::parse(&mut ByteCursor::new(bytes))?;

        let body = checksum::verify(bytes)?;
        let mut cursor = ByteCursor::new(body);
        cursor.skip(HEADER_SIZE)?;

        let entries = (0..header.entries_count)
            .map(|_| IndexEntry::parse(&mut cursor))
            .collect::<Result<Vec<_>>>()?;

        let extensions = Bytes::copy_from_slice(cursor.rest());
        if !extensions.is_empty() {
            tracing::warn!(
                len = extensions.len(),
                signature = %String::from_utf8_lossy(&extensions[..extensions.len().min(4)]),
                "index carries extension data, keeping it uninterpreted"
            );
        }

        Ok(IndexFile {
            entries,
            extensions,
        })
    }

    /// Encode with entries in index order, followed by extensions and checksum
    pub fn encode(&self) -> Result<Bytes> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.cmp_index_order(b));

        let entries_count = u32::try_from(entries.len())
            .map_err(|_| Error::Format(format!("too many index entries: {}", entries.len())))?;

        let mut writer = Checksum::new(Vec::new());
        writer.write(&IndexHeader::new(VERSION, entries_count).serialize()?)?;
        for entry in entries {
            writer.write(&entry.serialize()?)?;
        }
        writer.write(&self.extensions)?;

        Ok(Bytes::from(writer.write_checksum()?))
    }
}
