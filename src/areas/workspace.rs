use crate::artifacts::index::index_entry::EntryMetadata;
use crate::artifacts::objects::blob::Blob;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const IGNORED_PATHS: [&str; 1] = [".git"];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse_blob(&self, file_path: &Path) -> Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Files (and symlinks) under `root`, relative to the workspace, in walk order.
    ///
    /// `root` may itself be a file. `.git` is never descended into.
    pub fn list_files(&self, root: Option<&Path>) -> Result<Vec<PathBuf>> {
        let root = match root {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };

        if std::fs::symlink_metadata(&root).is_err() {
            return Err(Error::NotFound(root));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry));

        for entry in walker {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => Error::Io(io),
                None => Error::Format(format!("filesystem loop under {}", root.display())),
            })?;

            let file_type = entry.file_type();
            if !(file_type.is_file() || file_type.is_symlink()) {
                continue;
            }

            if let Some(relative) = self.relative_path(entry.path()) {
                files.push(relative);
            }
        }

        Ok(files)
    }

    /// File content; for a symlink, the link target itself
    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let full_path = self.path.join(file_path);

        let metadata = std::fs::symlink_metadata(&full_path)?;
        if metadata.file_type().is_symlink() {
            let target = std::fs::read_link(&full_path)?;
            return Ok(Bytes::copy_from_slice(target.as_os_str().as_bytes()));
        }

        Ok(std::fs::read(full_path)?.into())
    }

    /// stat(2) data without following symlinks
    pub fn stat_file(&self, file_path: &Path) -> Result<EntryMetadata> {
        let metadata = std::fs::symlink_metadata(self.path.join(file_path))?;

        (self.path.join(file_path).as_path(), metadata).try_into()
    }

    fn is_ignored(entry: &DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_PATHS.contains(&name))
    }

    fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(&self.path).ok()?;

        // collapse "./" and the like; anything escaping the root is dropped
        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }

        (!clean.as_os_str().is_empty()).then_some(clean)
    }
}
