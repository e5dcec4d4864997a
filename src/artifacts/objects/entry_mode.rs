use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};

/// Mask selecting the kind bits of a Unix mode
const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;
const S_IFLNK: u32 = 0o120000;
const S_IFGITLINK: u32 = 0o160000;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
}

impl EntryMode {
    /// Octal form without leading zeros, as written into tree objects.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Type of the object an entry with this mode points at.
    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Directory => ObjectType::Tree,
            EntryMode::File(_) => ObjectType::Blob,
        }
    }

    pub fn from_octal_str(mode: &str) -> Result<Self> {
        if mode.is_empty() || !mode.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(Error::format(format!("invalid entry mode {mode:?}")));
        }
        let mode = u32::from_str_radix(mode, 8)
            .map_err(|_| Error::format(format!("entry mode {mode} is out of range")))?;

        Self::try_from(mode)
    }
}

impl TryFrom<u32> for EntryMode {
    type Error = Error;

    fn try_from(mode: u32) -> Result<Self> {
        match mode & S_IFMT {
            S_IFDIR => Ok(EntryMode::Directory),
            S_IFREG if mode & 0o111 != 0 => Ok(EntryMode::File(FileMode::Executable)),
            S_IFREG => Ok(EntryMode::File(FileMode::Regular)),
            S_IFLNK => Err(Error::unsupported(format!("symbolic link entry (mode {mode:o})"))),
            S_IFGITLINK => Err(Error::unsupported(format!("submodule entry (mode {mode:o})"))),
            0 => Err(Error::format(format!("entry mode {mode:o} has no kind bits"))),
            _ => Err(Error::unsupported(format!("special file entry (mode {mode:o})"))),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

/// Six-digit zero-padded octal, as shown by `cat-file -p` and `ls-tree`.
impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.as_u32())
    }
}
