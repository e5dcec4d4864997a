//! Object codec
//!
//! Serialized form, hashed and compressed as a unit:
//!
//! ```text
//! <type-word> SP <decimal payload length> NUL <payload>
//! ```

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use sha1::{Digest, Sha1};

pub trait Packable {
    /// Payload bytes, without the `<type> <size>\0` header.
    fn payload(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Human-readable rendering used by `cat-file -p`.
    fn display(&self) -> Bytes;

    fn serialize(&self) -> Result<Bytes> {
        Ok(serialize_object(self.object_type(), &self.payload()?))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(hash_object(self.object_type(), &self.payload()?))
    }
}

fn header(object_type: ObjectType, size: usize) -> String {
    format!("{} {}\0", object_type.as_str(), size)
}

pub fn serialize_object(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = header(object_type, payload.len());

    let mut object = Vec::with_capacity(header.len() + payload.len());
    object.extend_from_slice(header.as_bytes());
    object.extend_from_slice(payload);

    Bytes::from(object)
}

/// Digest of the serialized form of `(object_type, payload)`.
pub fn hash_object(object_type: ObjectType, payload: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(header(object_type, payload.len()).as_bytes());
    hasher.update(payload);

    ObjectId::from_bytes(hasher.finalize().into())
}

/// Split a serialized object into its type and payload, checking that the
/// declared size matches the payload actually present.
pub fn parse_object(object: Bytes) -> Result<(ObjectType, Bytes)> {
    let space = object
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::format("object header has no type separator"))?;
    let object_type = ObjectType::try_from(&object[..space])?;

    let nul = object[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|offset| space + 1 + offset)
        .ok_or_else(|| Error::format("object header is not NUL-terminated"))?;

    let size = &object[space + 1..nul];
    if size.is_empty() || !size.iter().all(u8::is_ascii_digit) {
        return Err(Error::format(format!(
            "invalid size {:?} in object header",
            String::from_utf8_lossy(size)
        )));
    }
    let size = std::str::from_utf8(size)
        .ok()
        .and_then(|size| size.parse::<usize>().ok())
        .ok_or_else(|| Error::format("object size does not fit in memory"))?;

    let payload = object.slice(nul + 1..);
    if payload.len() != size {
        return Err(Error::format(format!(
            "object header declares {size} bytes but {} follow",
            payload.len()
        )));
    }

    Ok((object_type, payload))
}

/// A parsed object of any type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn from_payload(object_type: ObjectType, payload: Bytes) -> Result<Self> {
        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(payload)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(payload)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(payload)?)),
        })
    }

    pub fn as_object(&self) -> &dyn Object {
        match self {
            ObjectBox::Blob(blob) => blob.as_ref(),
            ObjectBox::Tree(tree) => tree.as_ref(),
            ObjectBox::Commit(commit) => commit.as_ref(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        self.as_object().object_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            hash_object(ObjectType::Blob, b"what is up, doc?").to_string(),
            "bd9dbf5aae1a3862dd1526723246b20206e5fc37"
        );
        assert_eq!(
            hash_object(ObjectType::Blob, b"").to_string(),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
        assert_eq!(
            hash_object(ObjectType::Tree, b"").to_string(),
            "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
        );
    }

    #[test]
    fn serialized_form_has_type_size_and_payload() {
        assert_eq!(
            serialize_object(ObjectType::Blob, b"hello").as_ref(),
            b"blob 5\0hello"
        );
    }

    #[test]
    fn parse_returns_typed_payload() {
        let (object_type, payload) = parse_object(Bytes::from_static(b"tree 0\0")).unwrap();

        assert_eq!(object_type, ObjectType::Tree);
        assert!(payload.is_empty());
    }

    #[test]
    fn payload_may_contain_nul_and_spaces() {
        let object = serialize_object(ObjectType::Blob, b"a b\0c");
        let (_, payload) = parse_object(object).unwrap();

        assert_eq!(payload.as_ref(), b"a b\0c");
    }

    #[test]
    fn rejects_malformed_headers() {
        for raw in [
            &b"blob"[..],
            b"blob 5hello",
            b"blob \0",
            b"blob +5\0hello",
            b"blob 5\0hell",
            b"blob 5\0hello!",
            b"blob 99999999999999999999999\0",
            b"tag 0\0",
        ] {
            assert!(
                matches!(parse_object(Bytes::copy_from_slice(raw)), Err(Error::Format(_))),
                "{:?}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    proptest! {
        #[test]
        fn hashing_is_deterministic(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let first = hash_object(ObjectType::Blob, &payload);
            let second = hash_object(ObjectType::Blob, &payload);
            prop_assert_eq!(first, second);

            let serialized = serialize_object(ObjectType::Blob, &payload);
            let digest: [u8; 20] = Sha1::digest(&serialized).into();
            prop_assert_eq!(first, ObjectId::from_bytes(digest));
        }

        #[test]
        fn parse_inverts_serialize(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let serialized = serialize_object(ObjectType::Commit, &payload);
            let (object_type, parsed) = parse_object(serialized).unwrap();

            prop_assert_eq!(object_type, ObjectType::Commit);
            prop_assert_eq!(parsed.as_ref(), payload.as_slice());
        }
    }
}
