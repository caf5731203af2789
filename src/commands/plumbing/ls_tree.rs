use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::path::Path;

impl Repository {
    pub fn ls_tree(&mut self, object_id: &str, recursive: bool) -> anyhow::Result<()> {
        let oid = ObjectId::try_parse(object_id)
            .with_context(|| format!("Not a valid object name {}", object_id))?;

        self.print_tree(&oid, None, recursive)
    }

    fn print_tree(
        &self,
        oid: &ObjectId,
        prefix: Option<&Path>,
        recursive: bool,
    ) -> anyhow::Result<()> {
        let tree = self
            .database()
            .get_tree(oid)
            .with_context(|| format!("Not a tree object {}", oid))?;

        for entry in tree.entries() {
            let path = match prefix {
                Some(prefix) => prefix.join(entry.name()),
                None => Path::new(entry.name()).to_path_buf(),
            };

            if recursive && entry.is_tree() {
                self.print_tree(entry.oid(), Some(&path), recursive)?;
            } else {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.mode(),
                    entry.kind().type_name(),
                    entry.oid(),
                    path.display()
                )?;
            }
        }

        Ok(())
    }
}
