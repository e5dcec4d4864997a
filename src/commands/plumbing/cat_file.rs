use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use anyhow::Context;
use std::io::Write;

/// What `cat-file` prints for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// `-t`: the type word
    ShowType,
    /// `-p`: the payload, rendered for its type; commits print verbatim
    PrettyPrint,
    /// `<type>`: the raw payload, provided the object has that type
    ExpectType(ObjectType),
}

impl CatFileMode {
    pub fn try_from_flags(pretty: bool, show_type: bool, expected: Option<&str>) -> Result<Self> {
        match (pretty, show_type, expected) {
            (true, true, _) => Err(Error::validation("-p is incompatible with -t")),
            (true, false, Some(_)) | (false, true, Some(_)) => Err(Error::validation(
                "an object type cannot be combined with -p or -t",
            )),
            (true, false, None) => Ok(CatFileMode::PrettyPrint),
            (false, true, None) => Ok(CatFileMode::ShowType),
            (false, false, Some(expected)) => ObjectType::try_from(expected)
                .map(CatFileMode::ExpectType)
                .map_err(|_| Error::validation(format!("invalid object type {expected:?}"))),
            (false, false, None) => Err(Error::validation(
                "one of -p, -t or an object type is required",
            )),
        }
    }
}

impl Repository {
    pub fn cat_file(&self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id)?;
        let (object_type, payload) = self
            .database()
            .load(&object_id)
            .with_context(|| format!("couldn't read object {object_id}"))?;

        match mode {
            CatFileMode::ShowType => writeln!(self.writer(), "{object_type}")?,
            CatFileMode::PrettyPrint => {
                let object = ObjectBox::from_payload(object_type, payload.clone())
                    .with_context(|| format!("couldn't parse object {object_id}"))?;
                // commits print as stored, headers we don't model included
                match object_type {
                    ObjectType::Commit => self.writer().write_all(&payload)?,
                    _ => self.writer().write_all(&object.as_object().display())?,
                }
            }
            CatFileMode::ExpectType(expected) => {
                if expected != object_type {
                    return Err(Error::validation(format!(
                        "object {object_id} is a {object_type}, not a {expected}"
                    ))
                    .into());
                }
                self.writer().write_all(&payload)?;
            }
        }

        Ok(())
    }
}
