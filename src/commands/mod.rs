//! Command implementations
//!
//! - `plumbing`: direct object and index inspection (hash-object, cat-file,
//!   ls-tree, ls-files)
//! - `porcelain`: user-facing workflows (init, add)

pub mod plumbing;
pub mod porcelain;
