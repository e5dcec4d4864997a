//! References (HEAD and branches)
//!
//! A ref file holds either a 40-character digest (direct) or `ref: <path>`
//! (symbolic). HEAD is normally symbolic, pointing at `refs/heads/<branch>`;
//! updating HEAD follows the chain and rewrites the ref at its end.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Prefix shared by all branch refs
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Upper bound on symbolic indirections, guarding against cycles
const MAX_SYMREF_DEPTH: usize = 5;

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the control directory (typically `.git`)
    path: Box<Path>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(symref_match) => Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string()))),
            None => Ok(Some(SymRefOrOid::Oid(
                ObjectId::try_parse(content)
                    .with_context(|| format!("ref file at {:?} is corrupt", path))?,
            ))),
        }
    }
}

impl Refs {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    /// Point HEAD at `branch`, creating HEAD if needed.
    pub fn set_head(&self, branch: &str) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("ref: {HEADS_PREFIX}{branch}\n"))
    }

    /// Commit HEAD resolves to, `None` before the first commit.
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        let mut path = self.head_path();

        for _ in 0..MAX_SYMREF_DEPTH {
            match SymRefOrOid::read(&path)? {
                Some(SymRefOrOid::SymRef(target)) => path = self.path.join(target),
                Some(SymRefOrOid::Oid(oid)) => return Ok(Some(oid)),
                None => return Ok(None),
            }
        }

        anyhow::bail!("too many levels of symbolic refs starting at HEAD")
    }

    /// Name of the ref at the end of HEAD's chain, e.g. `refs/heads/main`,
    /// or `HEAD` itself when detached.
    pub fn current_ref(&self) -> anyhow::Result<String> {
        let mut name = HEAD_REF_NAME.to_string();

        for _ in 0..MAX_SYMREF_DEPTH {
            match SymRefOrOid::read(&self.path.join(&name))? {
                Some(SymRefOrOid::SymRef(target)) => name = target,
                Some(SymRefOrOid::Oid(_)) | None => return Ok(name),
            }
        }

        anyhow::bail!("too many levels of symbolic refs starting at HEAD")
    }

    /// Short branch name HEAD is on, `HEAD` when detached.
    pub fn current_branch(&self) -> anyhow::Result<String> {
        let current = self.current_ref()?;

        Ok(current
            .strip_prefix(HEADS_PREFIX)
            .map(str::to_string)
            .unwrap_or(current))
    }

    /// Move the ref HEAD ultimately points at to `oid`.
    pub fn update_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        let target = self.path.join(self.current_ref()?);
        self.write_ref_file(&target, &format!("{oid}\n"))
    }

    fn write_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!("failed to create parent directories for ref file at {:?}", path)
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)
            .with_context(|| format!("failed to lock ref file at {:?}", path))?;
        lock.deref_mut()
            .write_all(raw_ref.as_bytes())
            .with_context(|| format!("failed to write ref file at {:?}", path))?;

        Ok(())
    }
}
