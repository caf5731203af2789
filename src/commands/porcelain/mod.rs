//! Porcelain commands
//!
//! - `init`: create the repository layout
//! - `add`: stage files in the index

pub mod add;
pub mod init;
