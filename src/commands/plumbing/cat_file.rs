use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// `-t`
    Type,
    /// `-s`
    Size,
    /// `-p`
    Pretty,
}

impl Repository {
    pub fn cat_file(&mut self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let oid = ObjectId::try_parse(object_id)
            .with_context(|| format!("Not a valid object name {}", object_id))?;

        if mode == CatFileMode::Type {
            let object_type = self.database().get_type(&oid)?;
            writeln!(self.writer(), "{}", object_type)?;
            return Ok(());
        }

        let (object_type, payload) = self
            .database()
            .load(&oid)
            .with_context(|| format!("Unable to read object {}", oid))?;

        match (mode, object_type) {
            (CatFileMode::Size, _) => writeln!(self.writer(), "{}", payload.len())?,
            (_, ObjectType::Tree) => {
                for entry in Tree::deserialize(payload)?.entries() {
                    writeln!(self.writer(), "{}", entry)?;
                }
            }
            (_, ObjectType::Blob | ObjectType::Commit) => self.writer().write_all(&payload)?,
        }

        Ok(())
    }
}
