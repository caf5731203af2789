//! Data structures and codecs
//!
//! - `core`: bounds-checked big-endian byte cursor
//! - `index`: index file format (header, entries, checksum)
//! - `objects`: object ids, envelopes, blobs and trees

pub mod core;
pub mod index;
pub mod objects;
