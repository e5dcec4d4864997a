use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

/// Type words as they appear in serialized object headers
const OBJECT_TYPES: phf::Map<&'static str, ObjectType> = phf::phf_map! {
    "blob" => ObjectType::Blob,
    "tree" => ObjectType::Tree,
    "commit" => ObjectType::Commit,
};

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        OBJECT_TYPES
            .get(value)
            .copied()
            .ok_or_else(|| Error::format(format!("invalid object type {value:?}")))
    }
}

impl TryFrom<&[u8]> for ObjectType {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        let value = std::str::from_utf8(value)
            .map_err(|_| Error::format("object type is not valid UTF-8"))?;
        Self::try_from(value)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
