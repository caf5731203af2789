//! Core utilities shared by the object and index codecs
//!
//! - `cursor`: big-endian reads over a byte slice

pub mod cursor;
