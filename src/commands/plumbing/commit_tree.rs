use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use std::io::Write;

impl Repository {
    pub fn commit_tree(
        &self,
        tree: &str,
        parents: &[String],
        messages: &[String],
    ) -> anyhow::Result<()> {
        let tree_oid = ObjectId::try_parse(tree)?;
        self.expect_type(&tree_oid, ObjectType::Tree)?;

        let parents = parents
            .iter()
            .map(|parent| {
                let parent = ObjectId::try_parse(parent)?;
                self.expect_type(&parent, ObjectType::Commit)?;
                Ok(parent)
            })
            .collect::<Result<Vec<_>>>()?;

        let message = Commit::message_from_fragments(messages);
        let (commit_id, _) = self.write_commit(tree_oid, parents, message)?;

        writeln!(self.writer(), "{commit_id}")?;

        Ok(())
    }

    /// Assemble and store a commit, taking identities from the environment.
    pub(crate) fn write_commit(
        &self,
        tree_oid: ObjectId,
        parents: Vec<ObjectId>,
        message: String,
    ) -> Result<(ObjectId, Commit)> {
        if parents.len() > 1 {
            return Err(Error::unsupported(format!(
                "commits with {} parents",
                parents.len()
            )));
        }

        let author = Author::load_from_env()?;
        let committer = Author::load_committer_from_env(&author)?;

        let commit = Commit::try_new(parents, tree_oid, author, committer, message)?;
        let commit_id = self.database().store(&commit)?;

        Ok((commit_id, commit))
    }

    fn expect_type(&self, object_id: &ObjectId, expected: ObjectType) -> Result<()> {
        let actual = self.database().object_type(object_id)?;
        if actual != expected {
            return Err(Error::validation(format!(
                "object {object_id} is a {actual}, not a {expected}"
            )));
        }
        Ok(())
    }
}
