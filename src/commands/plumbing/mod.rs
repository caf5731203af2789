//! Plumbing commands
//!
//! - `cat-file`: show the type, size or content of an object
//! - `hash-object`: compute a blob id and optionally store the blob
//! - `ls-files`: list index entries
//! - `ls-tree`: list the contents of a tree object

pub mod cat_file;
pub mod hash_object;
pub mod ls_files;
pub mod ls_tree;
