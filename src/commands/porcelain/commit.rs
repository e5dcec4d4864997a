use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use std::io::Write;

impl Repository {
    pub fn commit(&self, messages: &[String]) -> anyhow::Result<()> {
        let tree_id = self.build_tree()?;
        let parent = self.refs().read_head()?;

        let message = Commit::message_from_fragments(messages);
        let (commit_id, commit) = self.write_commit(tree_id, parent.into_iter().collect(), message)?;
        self.refs().update_head(&commit_id)?;

        let is_root = match commit.parent() {
            Some(_) => "",
            None => "(root-commit) ",
        };
        writeln!(
            self.writer(),
            "[{} {}{}] {}",
            self.refs().current_branch()?,
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
