use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

const DEFAULT_BRANCH: &str = "main";

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        let reinitialized = self.refs().head_path().exists();

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .git/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .git/refs/heads directory")?;

        if !reinitialized {
            self.refs()
                .set_head(DEFAULT_BRANCH)
                .context("Failed to create initial HEAD reference")?;
        }

        let status = match reinitialized {
            true => "Reinitialized existing",
            false => "Initialized empty",
        };
        writeln!(
            self.writer(),
            "{status} Git repository in {}/",
            self.git_path().display()
        )?;

        Ok(())
    }
}
