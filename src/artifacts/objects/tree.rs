//! Tree object
//!
//! Trees are directory snapshots: an ordered list of children, each with a
//! mode, a name (a single path component) and the child's object id.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal-mode> <name>\0<20-byte-sha1>`
//!
//! Entries read from disk keep their on-disk order, which is assumed (not
//! checked) to be the canonical one. Trees built in memory are sorted into
//! that order before they are serialized.

use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::objects::entry_mode::{EntryMode, ObjectKind};
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use derive_new::new;
use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    mode: EntryMode,
    #[new(into)]
    name: OsString,
    oid: ObjectId,
}

impl TreeEntry {
    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn kind(&self) -> ObjectKind {
        self.mode.kind()
    }

    pub fn permissions(&self) -> u16 {
        self.mode.permissions()
    }

    /// Raw entry name; git puts no encoding on it
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn oid(&self) -> &ObjectId {
        &self.oid
    }

    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.position();
        let truncated = |what: &str| {
            Error::CorruptObject(format!("tree entry at offset {offset} truncated in {what}"))
        };

        let mode = cursor.read_until(b' ').map_err(|_| truncated("mode"))?;
        let mode = EntryMode::from_octal(mode).map_err(|e| {
            Error::CorruptObject(format!("tree entry at offset {offset}: {e}"))
        })?;

        let name = cursor.read_cstr().map_err(|_| truncated("name"))?;
        let name = OsString::from_vec(name.to_vec());

        let oid = ObjectId::read_from(cursor).map_err(|_| truncated("object id"))?;

        Ok(TreeEntry { mode, name, oid })
    }

    /// Sort key of the reference format: directories compare as if their
    /// name carried a trailing `/`
    fn cmp_canonical(&self, other: &Self) -> Ordering {
        let lhs = self.name.as_bytes().iter().copied();
        let rhs = other.name.as_bytes().iter().copied();
        let lhs = lhs.chain(self.is_tree().then_some(b'/'));
        let rhs = rhs.chain(other.is_tree().then_some(b'/'));
        lhs.cmp(rhs)
    }
}

impl std::fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}\t{}",
            self.mode,
            self.kind().type_name(),
            self.oid,
            self.name.to_string_lossy()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree for writing; entries are put into canonical order
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(TreeEntry::cmp_canonical);
        Tree { entries }
    }

    /// Parse a tree payload, keeping on-disk order
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(payload);
        let mut entries = Vec::new();

        while !cursor.is_at_end() {
            entries.push(TreeEntry::parse(&mut cursor)?);
        }

        Ok(Tree { entries })
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = BytesMut::new();

        for entry in &self.entries {
            let name = entry.name.as_bytes();
            if name.is_empty() || name.iter().any(|&b| b == b'\0' || b == b'/') {
                return Err(Error::Format(format!(
                    "invalid tree entry name '{}'",
                    name.escape_ascii()
                )));
            }

            // `%o` without padding, so directories are written as `40000`
            bytes.put_slice(format!("{:o} ", entry.mode.as_u32()).as_bytes());
            bytes.put_slice(name);
            bytes.put_u8(0);
            bytes.put_slice(entry.oid.as_bytes());
        }

        Ok(bytes.freeze())
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Self::parse(&payload)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
