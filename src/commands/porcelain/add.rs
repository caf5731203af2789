use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::{EntryFlags, IndexEntry};
use crate::errors::Error;
use anyhow::Context;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

impl Repository {
    pub fn add(&mut self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate().context("Unable to read the index")?;

        for path in paths {
            let path = self.relative_to_root(path)?;

            let files = match self.workspace().list_files(Some(&path)) {
                Ok(files) => files,
                // staging a deleted path removes it from the index
                Err(Error::NotFound(_)) if index.is_tracked(&path) => {
                    index.remove(&path);
                    continue;
                }
                Err(Error::NotFound(_)) => {
                    anyhow::bail!("pathspec '{}' did not match any files", path.display())
                }
                Err(e) => return Err(e.into()),
            };

            for file in files {
                let stat = self
                    .workspace()
                    .stat_file(&file)
                    .with_context(|| format!("Unable to stat {}", file.display()))?;

                if let Some(existing) = index.entry_by_path(&file)
                    && existing.stat_match(&stat)
                    && existing.times_match(&stat)
                {
                    continue;
                }

                let blob = self
                    .workspace()
                    .parse_blob(&file)
                    .with_context(|| format!("Unable to read {}", file.display()))?;
                let oid = self.database().put_blob(&blob)?;

                tracing::debug!(path = %file.display(), %oid, "staged file");

                let flags = EntryFlags::for_path(file.as_os_str().as_bytes().len(), 0);
                index.add(IndexEntry::new(file, oid, stat, flags));
            }
        }

        index.write_updates().context("Unable to write the index")?;

        Ok(())
    }

    /// `path` relative to the repository root, with `.` and `..` resolved;
    /// it must not leave the repository
    fn relative_to_root(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let outside = || anyhow::anyhow!("{} is outside the repository", path.display());

        let absolute = if path.is_relative() {
            self.path().join(path)
        } else {
            path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
        };
        let relative = absolute.strip_prefix(self.path()).map_err(|_| outside())?;

        let mut clean = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => clean.push(part),
                Component::CurDir => {}
                Component::ParentDir if clean.pop() => {}
                _ => return Err(outside()),
            }
        }

        Ok(clean)
    }
}
