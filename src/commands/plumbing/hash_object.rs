use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use anyhow::Context;
use std::path::Path;

impl Repository {
    pub fn hash_object(&mut self, object_path: &Path, write: bool) -> anyhow::Result<()> {
        let blob = self
            .workspace()
            .parse_blob(object_path)
            .with_context(|| format!("Unable to read {}", object_path.display()))?;

        let object_id = if write {
            self.database()
                .put_blob(&blob)
                .with_context(|| format!("Unable to store {}", object_path.display()))?
        } else {
            blob.object_id()?
        };

        writeln!(self.writer(), "{}", object_id)?;

        Ok(())
    }
}
