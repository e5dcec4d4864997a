//! Tree object: one directory level
//!
//! ## Format
//!
//! Payload: a concatenation of entries, each `<mode-octal> <name>\0<20-byte-digest>`,
//! with the mode written without leading zeros.
//!
//! ## Ordering
//!
//! [`Tree::build`] orders entries canonically: byte-wise by name, with a
//! directory name compared as if it ended in `/`. Parsed trees keep the order
//! they were stored in.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_BYTES;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let suffix = self.is_tree().then_some(b'/');
        self.name.bytes().chain(suffix)
    }

    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }

    /// `<mode> <type> <digest>    <name>`
    pub fn display(&self) -> String {
        format!(
            "{} {} {}    {}",
            self.mode,
            self.mode.object_type(),
            self.oid,
            self.name
        )
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(Error::validation(format!("invalid tree entry name {name:?}")));
        }
        if name.contains(['/', '\0']) {
            return Err(Error::validation(format!(
                "tree entry name {name:?} contains a path separator or NUL"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from unordered entries, sorting them canonically.
    pub fn build(entries: impl IntoIterator<Item = TreeEntry>) -> Result<Self> {
        let mut entries = entries.into_iter().collect::<Vec<_>>();

        let mut names = HashSet::with_capacity(entries.len());
        for entry in &entries {
            TreeEntry::validate_name(&entry.name)?;
            if !names.insert(entry.name.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate tree entry {:?}",
                    entry.name
                )));
            }
        }
        entries.sort_by(TreeEntry::canonical_cmp);

        Ok(Tree { entries })
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn payload(&self) -> Result<Bytes> {
        let mut payload = Vec::new();

        for entry in &self.entries {
            write!(payload, "{} {}\0", entry.mode.as_str(), entry.name)
                .and_then(|_| entry.oid.write_to(&mut payload))
                .map_err(|e| Error::format(format!("unable to encode tree entry: {e}")))?;
        }

        Ok(Bytes::from(payload))
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        let mut entries = Vec::new();
        let mut rest = payload.as_ref();

        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| Error::format("unexpected end of data in tree entry mode"))?;
            let mode = std::str::from_utf8(&rest[..space])
                .map_err(|_| Error::format("tree entry mode is not ASCII"))?;
            let mode = EntryMode::from_octal_str(mode)?;
            rest = &rest[space + 1..];

            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::format("unexpected end of data in tree entry name"))?;
            let name = std::str::from_utf8(&rest[..nul])
                .map_err(|_| Error::format("tree entry name is not valid UTF-8"))?
                .to_owned();
            if name.is_empty() {
                return Err(Error::format("tree entry has an empty name"));
            }
            rest = &rest[nul + 1..];

            let oid = ObjectId::read_from(rest)?;
            rest = &rest[OBJECT_ID_BYTES..];

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> Bytes {
        self.entries
            .iter()
            .map(|entry| format!("{}\n", entry.display()))
            .collect::<String>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::FileMode;
    use crate::artifacts::objects::object::hash_object;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn blob_oid() -> ObjectId {
        hash_object(ObjectType::Blob, b"what is up, doc?")
    }

    #[fixture]
    fn tree_oid() -> ObjectId {
        hash_object(ObjectType::Tree, b"")
    }

    fn names(tree: &Tree) -> Vec<&str> {
        tree.entries().map(|entry| entry.name.as_str()).collect()
    }

    #[rstest]
    fn build_orders_directories_as_if_slash_suffixed(blob_oid: ObjectId, tree_oid: ObjectId) {
        let file = |name: &str| TreeEntry::new(FileMode::Regular.into(), name.to_string(), blob_oid);
        let dir = |name: &str| TreeEntry::new(EntryMode::Directory, name.to_string(), tree_oid);

        // '-' (0x2d) < '/' (0x2f) < '0' (0x30)
        let tree = Tree::build([file("foo0"), dir("foo"), file("foo-bar"), file("a.txt")]).unwrap();

        assert_eq!(names(&tree), vec!["a.txt", "foo-bar", "foo", "foo0"]);
    }

    #[rstest]
    fn build_rejects_bad_names(blob_oid: ObjectId) {
        for name in ["", ".", "..", "a/b", "nul\0"] {
            let entry = TreeEntry::new(FileMode::Regular.into(), name.to_string(), blob_oid);
            assert!(matches!(Tree::build([entry]), Err(Error::Validation(_))));
        }

        let entry = TreeEntry::new(FileMode::Regular.into(), "x".to_string(), blob_oid);
        assert!(matches!(
            Tree::build([entry.clone(), entry]),
            Err(Error::Validation(_))
        ));
    }

    #[rstest]
    fn payload_layout(blob_oid: ObjectId) {
        let tree = Tree::build([TreeEntry::new(
            FileMode::Executable.into(),
            "run.sh".to_string(),
            blob_oid,
        )])
        .unwrap();

        let mut expected = b"100755 run.sh\0".to_vec();
        expected.extend_from_slice(blob_oid.as_bytes());
        assert_eq!(tree.payload().unwrap().as_ref(), expected.as_slice());
    }

    #[test]
    fn empty_tree_has_the_well_known_digest() {
        let tree = Tree::build([]).unwrap();

        assert_eq!(
            tree.object_id().unwrap().to_string(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[rstest]
    fn deserialize_keeps_stored_order(blob_oid: ObjectId, tree_oid: ObjectId) {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"40000 zeta\0");
        payload.extend_from_slice(tree_oid.as_bytes());
        payload.extend_from_slice(b"100644 alpha\0");
        payload.extend_from_slice(blob_oid.as_bytes());

        let tree = Tree::deserialize(Bytes::from(payload)).unwrap();

        assert_eq!(names(&tree), vec!["zeta", "alpha"]);
        assert!(tree.entries().next().unwrap().is_tree());
    }

    #[rstest]
    fn deserialize_rejects_truncated_entries(blob_oid: ObjectId) {
        let mut payload = b"100644 alpha\0".to_vec();
        payload.extend_from_slice(&blob_oid.as_bytes()[..12]);

        for end in 1..payload.len() {
            let result = Tree::deserialize(Bytes::copy_from_slice(&payload[..end]));
            assert!(matches!(result, Err(Error::Format(_))), "prefix of {end} bytes");
        }
    }

    #[rstest]
    fn deserialize_rejects_symlinks(blob_oid: ObjectId) {
        let mut payload = b"120000 link\0".to_vec();
        payload.extend_from_slice(blob_oid.as_bytes());

        assert!(matches!(
            Tree::deserialize(Bytes::from(payload)),
            Err(Error::Unsupported(_))
        ));
    }

    #[rstest]
    fn display_lists_one_entry_per_line(blob_oid: ObjectId, tree_oid: ObjectId) {
        let tree = Tree::build([
            TreeEntry::new(FileMode::Regular.into(), "a.txt".to_string(), blob_oid),
            TreeEntry::new(EntryMode::Directory, "sub".to_string(), tree_oid),
        ])
        .unwrap();

        let expected = format!(
            "100644 blob {blob_oid}    a.txt\n040000 tree {tree_oid}    sub\n"
        );
        assert_eq!(String::from_utf8(tree.display().to_vec()).unwrap(), expected);
    }
}
