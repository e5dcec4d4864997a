use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use anyhow::Context;
use std::io::Write;

/// Columns printed per tree entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LsTreeFormat {
    /// `<mode> <type> <digest>    <name>`
    #[default]
    Full,
    NameOnly,
    ObjectOnly,
}

impl LsTreeFormat {
    pub fn try_from_flags(name_only: bool, object_only: bool) -> Result<Self> {
        match (name_only, object_only) {
            (true, true) => Err(Error::validation(
                "--name-only is incompatible with --object-only",
            )),
            (true, false) => Ok(LsTreeFormat::NameOnly),
            (false, true) => Ok(LsTreeFormat::ObjectOnly),
            (false, false) => Ok(LsTreeFormat::Full),
        }
    }
}

impl Repository {
    /// List a tree's entries in stored order.
    pub fn ls_tree(&self, object_id: &str, format: LsTreeFormat) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id)?;
        let tree = self
            .database()
            .parse_object_as_tree(&object_id)
            .with_context(|| format!("couldn't read object {object_id}"))?
            .ok_or_else(|| Error::validation(format!("object {object_id} is not a tree")))?;

        let mut writer = self.writer();
        for entry in tree.entries() {
            match format {
                LsTreeFormat::Full => writeln!(writer, "{}", entry.display())?,
                LsTreeFormat::NameOnly => writeln!(writer, "{}", entry.name)?,
                LsTreeFormat::ObjectOnly => writeln!(writer, "{}", entry.oid)?,
            }
        }

        Ok(())
    }
}
