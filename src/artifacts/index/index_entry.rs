//! Index entry representation
//!
//! Each entry records one staged path:
//! - the path relative to the repository root
//! - the blob id of its content
//! - stat(2) data used for fast change detection
//! - a 16-bit flags word
//!
//! ## Entry Format
//!
//! ```text
//!   ctime s, ctime ns, mtime s, mtime ns, dev, ino,
//!   mode, uid, gid, size          10 x 32-bit big-endian
//!   object id                     20 bytes
//!   flags                         16-bit big-endian
//!   path                          NUL-terminated
//!   padding                       NUL bytes up to a multiple of 8
//! ```

use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::{ENTRY_BLOCK, ENTRY_FIXED_SIZE};
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bitflags::bitflags;
use byteorder::{NetworkEndian, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use is_executable::IsExecutable;
use std::cmp::{Ordering, min};
use std::ffi::OsStr;
use std::fs::Metadata;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::prelude::MetadataExt;
use std::path::{Path, PathBuf};

/// Largest value the 12-bit name length can hold; longer names saturate here
const MAX_NAME_LENGTH: u16 = 0xfff;

const STAGE_SHIFT: u16 = 12;
const STAGE_MASK: u16 = 0x3;

bitflags! {
    /// Raw 16-bit flags word of an index entry
    ///
    /// ```text
    ///   bit  15     assume-valid
    ///   bit  14     extended (zero in version 2)
    ///   bits 12-13  merge stage
    ///   bits  0-11  name length, saturating at 0xfff
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryFlags: u16 {
        const ASSUME_VALID = 0x8000;
        const EXTENDED = 0x4000;

        const _ = !0;
    }
}

impl EntryFlags {
    pub fn for_path(name_length: usize, stage: u8) -> Self {
        Self::default()
            .with_stage(stage)
            .with_name_length(name_length)
    }

    pub fn assume_valid(&self) -> bool {
        self.contains(Self::ASSUME_VALID)
    }

    pub fn extended(&self) -> bool {
        self.contains(Self::EXTENDED)
    }

    /// 0 for a conflict-free entry, 1/2/3 for base/ours/theirs
    pub fn stage(&self) -> u8 {
        ((self.bits() >> STAGE_SHIFT) & STAGE_MASK) as u8
    }

    pub fn name_length(&self) -> u16 {
        self.bits() & MAX_NAME_LENGTH
    }

    pub fn with_stage(self, stage: u8) -> Self {
        let bits = self.bits() & !(STAGE_MASK << STAGE_SHIFT);
        Self::from_bits_retain(bits | ((stage as u16 & STAGE_MASK) << STAGE_SHIFT))
    }

    pub fn with_name_length(self, name_length: usize) -> Self {
        let length = min(name_length, MAX_NAME_LENGTH as usize) as u16;
        Self::from_bits_retain((self.bits() & !MAX_NAME_LENGTH) | length)
    }
}

/// POSIX timestamp as stored in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, new)]
pub struct Timestamp {
    pub seconds: u32,
    pub nanoseconds: u32,
}

impl Timestamp {
    fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        Ok(Timestamp {
            seconds: cursor.read_u32()?,
            nanoseconds: cursor.read_u32()?,
        })
    }
}

/// stat(2) data stored in index entries
///
/// Values are opaque OS identifiers truncated to 32 bits, exactly as they
/// appear on disk; nothing here is reinterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Last metadata change
    pub ctime: Timestamp,
    /// Last content change
    pub mtime: Timestamp,
    pub dev: u32,
    pub ino: u32,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    /// On-disk size, truncated to 32 bits
    pub size: u32,
}

impl Default for EntryMetadata {
    fn default() -> Self {
        EntryMetadata {
            ctime: Timestamp::default(),
            mtime: Timestamp::default(),
            dev: 0,
            ino: 0,
            mode: EntryMode::regular(),
            uid: 0,
            gid: 0,
            size: 0,
        }
    }
}

impl TryFrom<(&Path, Metadata)> for EntryMetadata {
    type Error = Error;

    /// `metadata` must come from `symlink_metadata` so links are not followed
    fn try_from((file_path, metadata): (&Path, Metadata)) -> Result<Self> {
        let mode = if metadata.file_type().is_symlink() {
            EntryMode::symlink()
        } else if metadata.is_file() {
            EntryMode::file(file_path.is_executable())
        } else {
            return Err(Error::Format(format!(
                "{} is neither a regular file nor a symbolic link",
                file_path.display()
            )));
        };

        Ok(Self {
            ctime: Timestamp::new(metadata.ctime() as u32, metadata.ctime_nsec() as u32),
            mtime: Timestamp::new(metadata.mtime() as u32, metadata.mtime_nsec() as u32),
            dev: metadata.dev() as u32,
            ino: metadata.ino() as u32,
            mode,
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size() as u32,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the repository root, `/`-separated
    pub name: PathBuf,
    /// Blob id of the staged content
    pub oid: ObjectId,
    pub metadata: EntryMetadata,
    pub flags: EntryFlags,
}

impl IndexEntry {
    pub fn name_bytes(&self) -> &[u8] {
        self.name.as_os_str().as_bytes()
    }

    pub fn stage(&self) -> u8 {
        self.flags.stage()
    }

    /// All strict ancestors of the entry's path, outermost first
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();
        dirs
    }

    pub fn stat_match(&self, other: &EntryMetadata) -> bool {
        (self.metadata.size == 0 || self.metadata.size == other.size)
            && self.metadata.mode == other.mode
    }

    pub fn times_match(&self, other: &EntryMetadata) -> bool {
        self.metadata.ctime == other.ctime && self.metadata.mtime == other.mtime
    }

    /// Order of entries in the index file: path bytes, then stage
    pub fn cmp_index_order(&self, other: &Self) -> Ordering {
        self.name_bytes()
            .cmp(other.name_bytes())
            .then(self.stage().cmp(&other.stage()))
    }

    /// Parse one entry, consuming its padding
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let start = cursor.position();

        let ctime = Timestamp::read_from(cursor)?;
        let mtime = Timestamp::read_from(cursor)?;
        let dev = cursor.read_u32()?;
        let ino = cursor.read_u32()?;
        let mode = EntryMode::try_from(cursor.read_u32()?)?;
        let uid = cursor.read_u32()?;
        let gid = cursor.read_u32()?;
        let size = cursor.read_u32()?;
        let oid = ObjectId::read_from(cursor)?;
        let flags = EntryFlags::from_bits_retain(cursor.read_u16()?);

        // the name length field saturates, so the NUL is authoritative
        let name = cursor.read_cstr()?;

        let consumed = cursor.position() - start;
        let padding = entry_size(name.len()) - consumed;
        if cursor.read_bytes(padding)?.iter().any(|&b| b != 0) {
            return Err(Error::Format(format!(
                "non-zero padding after index entry '{}' at offset {}",
                String::from_utf8_lossy(name),
                start
            )));
        }

        tracing::trace!(
            offset = start,
            name = %String::from_utf8_lossy(name),
            "parsed index entry"
        );

        Ok(IndexEntry {
            name: PathBuf::from(OsStr::from_bytes(name)),
            oid,
            metadata: EntryMetadata {
                ctime,
                mtime,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            flags,
        })
    }

    pub fn serialize(&self) -> Result<Bytes> {
        let name = self.name_bytes();
        if name.is_empty() || name.contains(&0) {
            return Err(Error::Format(format!(
                "invalid index entry path {:?}",
                self.name
            )));
        }

        let flags = self.flags.with_name_length(name.len());
        let metadata = &self.metadata;

        let mut entry_bytes = Vec::with_capacity(entry_size(name.len()));
        entry_bytes.write_u32::<NetworkEndian>(metadata.ctime.seconds)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.ctime.nanoseconds)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.mtime.seconds)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.mtime.nanoseconds)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.dev)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.ino)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.mode.as_u32())?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.uid)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.gid)?;
        entry_bytes.write_u32::<NetworkEndian>(metadata.size)?;
        entry_bytes.write_all(self.oid.as_bytes())?;
        entry_bytes.write_u16::<NetworkEndian>(flags.bits())?;
        entry_bytes.write_all(name)?;

        // at least one NUL terminates the name, more pad to ENTRY_BLOCK
        entry_bytes.resize(entry_size(name.len()), 0);

        Ok(Bytes::from(entry_bytes))
    }
}

/// Padded on-disk size of an entry whose name is `name_length` bytes long
fn entry_size(name_length: usize) -> usize {
    (ENTRY_FIXED_SIZE + name_length + ENTRY_BLOCK) & !(ENTRY_BLOCK - 1)
}
