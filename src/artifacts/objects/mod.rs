//! Object types and codecs
//!
//! Every object is stored wrapped in an envelope, `<type> <size>\0<payload>`,
//! and addressed by the SHA-1 digest of that envelope.
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (modes, names and child ids)
//! - **Commit**: recognised in envelopes, not decoded

pub mod blob;
pub mod entry_mode;
pub mod envelope;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 digest in bytes
pub const OBJECT_ID_LENGTH: usize = 20;

/// Length of a SHA-1 digest in hexadecimal form
pub const OBJECT_ID_HEX_LENGTH: usize = 40;
