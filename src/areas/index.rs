//! Index (staging area)
//!
//! In-memory view of `.git/index`, keyed by path and merge stage, with a
//! parent-to-children map so a file can replace a directory (and vice versa)
//! without scanning every entry.

use crate::artifacts::index::IndexFile;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::Result;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

type EntryKey = (Box<Path>, u8);

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.git/index`)
    path: Box<Path>,
    entries: BTreeMap<EntryKey, IndexEntry>,
    /// Directory path to every tracked path below it
    children: BTreeMap<Box<Path>, BTreeSet<Box<Path>>>,
    /// Extension bytes from the last load, dropped once entries change
    extensions: Bytes,
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            extensions: Bytes::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn extensions(&self) -> &Bytes {
        &self.extensions
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.extensions = Bytes::new();
        self.changed = false;
    }

    /// Replace the in-memory state with the file's contents.
    ///
    /// A missing or empty file is an empty index.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.clear();

        let bytes = match std::fs::read(self.path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(());
        }

        let file = IndexFile::decode(&bytes)?;
        for entry in file.entries {
            self.store_entry(entry);
        }
        self.extensions = file.extensions;

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "loaded index"
        );

        Ok(())
    }

    /// Entries in index file order: path bytes, then stage
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        let mut entries = self.entries.values().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.cmp_index_order(b));
        entries.into_iter()
    }

    /// Tracked paths in index order, one per stage
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries().map(|entry| entry.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stage-0 entry for `path`
    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(&(Box::from(path), 0))
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries_at(path).next().is_some() || self.children.contains_key(path)
    }

    pub fn add(&mut self, entry: IndexEntry) {
        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.touch();
    }

    /// Drop `path` and everything tracked below it
    pub fn remove(&mut self, path: &Path) {
        self.remove_path(path);
        self.remove_children(path);
        self.touch();
    }

    pub fn write_updates(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        let file = IndexFile {
            entries: self.entries.values().cloned().collect(),
            extensions: self.extensions.clone(),
        };
        std::fs::write(self.path(), file.encode()?)?;
        self.changed = false;

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "wrote index"
        );

        Ok(())
    }

    fn touch(&mut self) {
        self.extensions = Bytes::new();
        self.changed = true;
    }

    fn entries_at<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a EntryKey> {
        self.entries.keys().filter(move |(name, _)| name.as_ref() == path)
    }

    /// A file replaces any file at one of its parent directories, and any
    /// directory at its own path. A stage-0 entry resolves the conflict
    /// stages of its path.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_path(parent);
        }
        self.remove_children(&entry.name);

        if entry.stage() == 0 {
            self.remove_path(&entry.name);
        }
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        let name: Box<Path> = entry.name.clone().into_boxed_path();

        for parent in entry.parent_dirs() {
            self.children
                .entry(Box::from(parent))
                .or_default()
                .insert(name.clone());
        }

        self.entries.insert((name, entry.stage()), entry);
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_path(&child);
            }
        }
    }

    /// Remove all stages of `path`
    fn remove_path(&mut self, path: &Path) {
        let keys = self.entries_at(path).cloned().collect::<Vec<_>>();

        for key in keys {
            if let Some(entry) = self.entries.remove(&key) {
                for parent in entry.parent_dirs() {
                    if let Some(children) = self.children.get_mut(parent) {
                        children.remove(path);
                        if children.is_empty() {
                            self.children.remove(parent);
                        }
                    }
                }
            }
        }
    }
}
