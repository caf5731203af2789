//! Error taxonomy shared by the object store and the index codec
//!
//! Every failure carries enough detail (offsets, hex digests, declared vs.
//! actual sizes) to diagnose corruption without re-running the operation.

use crate::artifacts::objects::object_type::ObjectType;
use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Malformed magic, header or structure
    #[error("malformed data: {0}")]
    Format(String),

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    /// The buffer ended before the format said it would
    #[error("truncated data: needed {needed} byte(s) at offset {offset}, {available} available")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("corrupt object: {0}")]
    CorruptObject(String),

    #[error("index checksum mismatch: stored {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("object {oid} is a {actual}, expected a {expected}")]
    TypeMismatch {
        oid: String,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("object not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
