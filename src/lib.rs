//! Storage core of a git-compatible version control tool
//!
//! Reads and writes loose objects (blobs and trees) and the version 2 index
//! file with on-disk layouts identical to the reference implementation.

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use errors::{Error, Result};
