use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::Result;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let tree_id = self.build_tree()?;

        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }

    /// Store the whole working tree, returning the root tree digest.
    ///
    /// Directories without any file underneath are left out of their parent,
    /// but the root always yields a tree, possibly the empty one.
    pub fn build_tree(&self) -> Result<ObjectId> {
        match self.build_subtree(Path::new(""))? {
            Some(tree_id) => Ok(tree_id),
            None => self.database().store(&Tree::default()),
        }
    }

    // children are stored before their parent, which needs their digests
    fn build_subtree(&self, dir_path: &Path) -> Result<Option<ObjectId>> {
        let mut entries = Vec::new();

        for entry in self.workspace().list_dir(dir_path)? {
            let oid = match entry.mode {
                EntryMode::Directory => match self.build_subtree(&entry.path)? {
                    Some(oid) => oid,
                    None => {
                        tracing::debug!(path = %entry.path.display(), "skipping empty directory");
                        continue;
                    }
                },
                EntryMode::File(_) => {
                    let blob = Blob::new(self.workspace().read_file(&entry.path)?);
                    self.database().store(&blob)?
                }
            };

            entries.push(TreeEntry::new(entry.mode, entry.name, oid));
        }

        if entries.is_empty() {
            return Ok(None);
        }

        let tree = Tree::build(entries)?;
        let tree_id = self.database().store(&tree)?;
        tracing::trace!(path = %dir_path.display(), oid = %tree_id, entries = tree.len(), "stored tree");

        Ok(Some(tree_id))
    }
}
