//! Core repository components
//!
//! - `database`: loose object store (blobs, trees)
//! - `index`: staging area backed by `.git/index`
//! - `repository`: ties the other areas to one working directory
//! - `workspace`: working directory file system access

pub mod database;
pub mod index;
pub mod repository;
pub mod workspace;
