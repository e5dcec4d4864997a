//! Object store
//!
//! Objects are zlib-compressed serialized objects stored at
//! `objects/<2 hex>/<38 hex>`. Writes go to a temporary file in the target
//! directory and are renamed into place, so a failed write never leaves a
//! partial object under its digest path. Rewriting an existing object is a
//! no-op.

use crate::artifacts::compression::{zlib_compress, zlib_decompress};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{
    Object, ObjectBox, Unpackable, hash_object, parse_object, serialize_object,
};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use fake::rand;
use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.to_path())
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.store_raw(object.object_type(), &object.payload()?)
    }

    /// Persist `payload` as an object of `object_type`, returning its digest.
    pub fn store_raw(&self, object_type: ObjectType, payload: &[u8]) -> Result<ObjectId> {
        let object_id = hash_object(object_type, payload);
        let object_path = self.object_path(&object_id);

        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::validation(format!("invalid object path {}", object_path.display())))?;
        Self::create_dir(object_dir)?;

        let content = zlib_compress(&serialize_object(object_type, payload));
        self.write_object(&object_path, &content)?;

        tracing::debug!(oid = %object_id, kind = %object_type, size = payload.len(), "stored object");
        Ok(object_id)
    }

    /// Read and decompress an object, returning its type and payload.
    pub fn load(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let object_path = self.object_path(object_id);

        let content = std::fs::read(&object_path)
            .map_err(|e| Error::io("read object file", &object_path, e))?;
        let object = zlib_decompress(&content)?;
        let (object_type, payload) = parse_object(object)?;

        tracing::trace!(oid = %object_id, kind = %object_type, size = payload.len(), "loaded object");
        Ok((object_type, payload))
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, payload) = self.load(object_id)?;
        ObjectBox::from_payload(object_type, payload)
    }

    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        Ok(self.load(object_id)?.0)
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Option<Tree>> {
        match self.load(object_id)? {
            (ObjectType::Tree, payload) => Ok(Some(Tree::deserialize(payload)?)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Option<Commit>> {
        match self.load(object_id)? {
            (ObjectType::Commit, payload) => Ok(Some(Commit::deserialize(payload)?)),
            _ => Ok(None),
        }
    }

    fn create_dir(path: &Path) -> Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);

        // recursive creation treats an existing directory as success
        builder
            .create(path)
            .map_err(|e| Error::io("create object directory", path, e))
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::validation(format!("invalid object path {}", object_path.display())))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let result = options
            .open(&temp_object_path)
            .and_then(|mut file| file.write_all(content))
            .map_err(|e| Error::io("write object file", &temp_object_path, e))
            .and_then(|_| {
                std::fs::rename(&temp_object_path, object_path)
                    .map_err(|e| Error::io("rename object file to", object_path, e))
            });

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_object_path);
        }
        result
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
