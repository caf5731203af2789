//! 32-bit entry mode shared by tree entries and index entries
//!
//! ```text
//!   bits 12-15  object kind (1000 regular file, 1010 symlink, 1110 gitlink,
//!               0100 directory in trees)
//!   bits  9-11  unused, ignored
//!   bits  0-8   unix permissions (0644 or 0755 for regular files, else 0)
//! ```
//!
//! The raw value is kept verbatim; the kind is decoded once on construction
//! and an unknown kind pattern is rejected.

use crate::errors::{Error, Result};

pub const MODE_DIRECTORY: u32 = 0o040000;
pub const MODE_REGULAR: u32 = 0o100644;
pub const MODE_EXECUTABLE: u32 = 0o100755;
pub const MODE_SYMLINK: u32 = 0o120000;
pub const MODE_GITLINK: u32 = 0o160000;

const KIND_SHIFT: u32 = 12;
const KIND_MASK: u32 = 0xf;
const PERMISSIONS_MASK: u32 = 0o777;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Directory,
    RegularFile,
    SymbolicLink,
    /// A submodule; the id points into another repository
    GitLink,
}

impl ObjectKind {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0b0100 => Ok(ObjectKind::Directory),
            0b1000 => Ok(ObjectKind::RegularFile),
            0b1010 => Ok(ObjectKind::SymbolicLink),
            0b1110 => Ok(ObjectKind::GitLink),
            _ => Err(Error::Format(format!(
                "unknown object kind {bits} ({bits:04b})"
            ))),
        }
    }

    /// Object type column as printed by `ls-tree`
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Directory => "tree",
            ObjectKind::RegularFile | ObjectKind::SymbolicLink => "blob",
            ObjectKind::GitLink => "commit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryMode {
    raw: u32,
    kind: ObjectKind,
}

impl EntryMode {
    pub fn regular() -> Self {
        Self::file(false)
    }

    pub fn file(executable: bool) -> Self {
        let raw = if executable { MODE_EXECUTABLE } else { MODE_REGULAR };
        EntryMode {
            raw,
            kind: ObjectKind::RegularFile,
        }
    }

    pub fn directory() -> Self {
        EntryMode {
            raw: MODE_DIRECTORY,
            kind: ObjectKind::Directory,
        }
    }

    pub fn symlink() -> Self {
        EntryMode {
            raw: MODE_SYMLINK,
            kind: ObjectKind::SymbolicLink,
        }
    }

    /// Parse the ASCII octal form used inside tree objects, e.g. `100644` or `40000`
    pub fn from_octal(octal: &[u8]) -> Result<Self> {
        let invalid = || {
            Error::Format(format!(
                "invalid mode '{}'",
                String::from_utf8_lossy(octal)
            ))
        };

        if octal.is_empty() || !octal.iter().all(|b| (b'0'..=b'7').contains(b)) {
            return Err(invalid());
        }

        let octal = std::str::from_utf8(octal).map_err(|_| invalid())?;
        let raw = u32::from_str_radix(octal, 8).map_err(|_| invalid())?;
        Self::try_from(raw)
    }

    pub fn as_u32(&self) -> u32 {
        self.raw
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn permissions(&self) -> u16 {
        (self.raw & PERMISSIONS_MASK) as u16
    }

    pub fn is_tree(&self) -> bool {
        self.kind == ObjectKind::Directory
    }

    pub fn is_executable(&self) -> bool {
        self.kind == ObjectKind::RegularFile && self.raw & 0o111 != 0
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = Error;

    fn try_from(raw: u32) -> Result<Self> {
        let kind = ObjectKind::from_bits(((raw >> KIND_SHIFT) & KIND_MASK) as u8)?;
        Ok(EntryMode { raw, kind })
    }
}

impl From<EntryMode> for u32 {
    fn from(mode: EntryMode) -> Self {
        mode.raw
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(b"40000".as_slice(), ObjectKind::Directory, 0)]
    #[case(b"040000".as_slice(), ObjectKind::Directory, 0)]
    #[case(b"100644".as_slice(), ObjectKind::RegularFile, 0o644)]
    #[case(b"100755".as_slice(), ObjectKind::RegularFile, 0o755)]
    #[case(b"120000".as_slice(), ObjectKind::SymbolicLink, 0)]
    #[case(b"160000".as_slice(), ObjectKind::GitLink, 0)]
    fn test_decode_octal_modes(
        #[case] octal: &[u8],
        #[case] kind: ObjectKind,
        #[case] permissions: u16,
    ) {
        let mode = EntryMode::from_octal(octal).unwrap();

        assert_eq!(mode.kind(), kind);
        assert_eq!(mode.permissions(), permissions);
    }

    #[rstest]
    fn test_unused_bits_are_ignored() {
        let mode = EntryMode::try_from(0o107644).unwrap();

        assert_eq!(mode.kind(), ObjectKind::RegularFile);
        assert_eq!(mode.permissions(), 0o644);
        assert_eq!(mode.as_u32(), 0o107644);
    }

    #[rstest]
    #[case(0o000644)]
    #[case(0o060000)]
    #[case(0o170000)]
    fn test_unknown_kind_fails(#[case] raw: u32) {
        assert!(matches!(EntryMode::try_from(raw), Err(Error::Format(_))));
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"100648".as_slice())]
    #[case(b"+100644".as_slice())]
    fn test_malformed_octal_fails(#[case] octal: &[u8]) {
        assert!(EntryMode::from_octal(octal).is_err());
    }

    #[rstest]
    fn test_display_is_zero_padded_octal() {
        assert_eq!(EntryMode::directory().to_string(), "040000");
        assert_eq!(EntryMode::file(true).to_string(), "100755");
    }
}
