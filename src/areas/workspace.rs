use crate::artifacts::objects::entry_mode::{EntryMode, FileMode};
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory holding the repository itself, never part of a snapshot
pub const CONTROL_DIR: &str = ".git";

/// A directory entry that can be recorded in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntry {
    /// Path relative to the workspace root
    pub path: PathBuf,
    pub name: String,
    pub mode: EntryMode,
}

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the immediate children of `dir_path` (relative to the root),
    /// skipping the control directory. Anything that is neither a directory
    /// nor a regular file is unsupported.
    pub fn list_dir(&self, dir_path: &Path) -> Result<Vec<WorkspaceEntry>> {
        let root = self.path.join(dir_path);

        WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_name() == CONTROL_DIR => None,
                Ok(entry) => Some(self.classify(dir_path, &entry)),
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    Some(Err(Error::io("list directory", path, source)))
                }
            })
            .collect()
    }

    fn classify(&self, dir_path: &Path, entry: &walkdir::DirEntry) -> Result<WorkspaceEntry> {
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| {
                Error::unsupported(format!("non UTF-8 file name {}", entry.path().display()))
            })?
            .to_string();
        let file_type = entry.file_type();

        let mode = if file_type.is_dir() {
            EntryMode::Directory
        } else if file_type.is_file() {
            match is_executable::is_executable(entry.path()) {
                true => EntryMode::File(FileMode::Executable),
                false => EntryMode::File(FileMode::Regular),
            }
        } else {
            let kind = if file_type.is_symlink() {
                "symbolic link"
            } else {
                "special file"
            };
            return Err(Error::unsupported(format!(
                "{kind} {}",
                entry.path().display()
            )));
        };

        Ok(WorkspaceEntry {
            path: dir_path.join(&name),
            name,
            mode,
        })
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let file_path = self.path.join(file_path);

        std::fs::read(&file_path)
            .map(Bytes::from)
            .map_err(|e| Error::io("read", file_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[rstest]
    fn lists_files_and_directories_without_the_control_dir(temp_dir: TempDir) {
        temp_dir.child(".git/HEAD").write_str("ref: refs/heads/main\n").unwrap();
        temp_dir.child("b.txt").write_str("b").unwrap();
        temp_dir.child("a/nested.txt").write_str("n").unwrap();

        let workspace = Workspace::new(temp_dir.path().into());
        let entries = workspace.list_dir(Path::new("")).unwrap();

        assert_eq!(
            entries,
            vec![
                WorkspaceEntry {
                    path: PathBuf::from("a"),
                    name: "a".to_string(),
                    mode: EntryMode::Directory,
                },
                WorkspaceEntry {
                    path: PathBuf::from("b.txt"),
                    name: "b.txt".to_string(),
                    mode: EntryMode::File(FileMode::Regular),
                },
            ]
        );

        let nested = workspace.list_dir(Path::new("a")).unwrap();
        assert_eq!(nested[0].path, Path::new("a").join("nested.txt"));
    }

    #[cfg(unix)]
    #[rstest]
    fn detects_executables_and_rejects_symlinks(temp_dir: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let script = temp_dir.child("run.sh");
        script.write_str("#!/bin/sh\n").unwrap();
        std::fs::set_permissions(script.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        let workspace = Workspace::new(temp_dir.path().into());
        let entries = workspace.list_dir(Path::new("")).unwrap();
        assert_eq!(entries[0].mode, EntryMode::File(FileMode::Executable));

        temp_dir.child("link").symlink_to_file(script.path()).unwrap();
        assert!(matches!(
            workspace.list_dir(Path::new("")),
            Err(Error::Unsupported(_))
        ));
    }

    #[rstest]
    fn reading_a_missing_file_is_an_io_error(temp_dir: TempDir) {
        let workspace = Workspace::new(temp_dir.path().into());

        assert!(matches!(
            workspace.read_file(Path::new("missing")),
            Err(Error::Io { .. })
        ));
    }
}
