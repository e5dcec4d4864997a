use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::workspace::{CONTROL_DIR, Workspace};
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open (without creating any repository files) the repository rooted at
    /// `path`, creating the directory itself if it is missing.
    pub fn new(path: impl AsRef<Path>, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create directory {:?}", path))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve {:?}", path))?;

        let git_path = path.join(CONTROL_DIR);
        let database = Database::new(git_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> &Path {
        self.refs.path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}
