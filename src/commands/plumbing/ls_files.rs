use crate::areas::repository::Repository;
use anyhow::Context;

impl Repository {
    pub fn ls_files(&mut self, stage: bool) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate().context("Unable to read the index")?;

        for entry in index.entries() {
            if stage {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.metadata.mode,
                    entry.oid,
                    entry.stage(),
                    entry.name.display()
                )?;
            } else {
                writeln!(self.writer(), "{}", entry.name.display())?;
            }
        }

        Ok(())
    }
}
