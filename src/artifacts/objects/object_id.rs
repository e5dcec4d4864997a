//! Object identifier (SHA-1 digest)
//!
//! Held as the 20 raw digest bytes. The canonical text form is 40 lowercase
//! hex characters; tree entries embed the raw form.
//!
//! Objects live at `objects/<first-2-hex-chars>/<remaining-38-hex-chars>`.

use crate::artifacts::objects::{OBJECT_ID_BYTES, OBJECT_ID_LENGTH};
use crate::errors::{Error, Result};
use std::io;
use std::path::PathBuf;

const SHORT_OID_LENGTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_BYTES]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; OBJECT_ID_BYTES]) -> Self {
        ObjectId(bytes)
    }

    /// Parse a full 40-character hex digest. Upper-case digits are accepted
    /// and normalised.
    pub fn try_parse(id: &str) -> Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(Error::validation(format!(
                "{id} is not a valid SHA-1 hash: expected {OBJECT_ID_LENGTH} hex digits, got {}",
                id.len()
            )));
        }

        let mut bytes = [0u8; OBJECT_ID_BYTES];
        hex::decode_to_slice(id, &mut bytes)
            .map_err(|_| Error::validation(format!("{id} is not a valid SHA-1 hash")))?;

        Ok(ObjectId(bytes))
    }

    /// Read a raw digest from the front of `bytes`.
    pub fn read_from(bytes: &[u8]) -> Result<Self> {
        let raw = bytes
            .get(..OBJECT_ID_BYTES)
            .ok_or_else(|| Error::format("unexpected end of data in object id"))?;

        let mut digest = [0u8; OBJECT_ID_BYTES];
        digest.copy_from_slice(raw);
        Ok(ObjectId(digest))
    }

    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_BYTES] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `ab/cdef...` relative to the object directory
    pub fn to_path(&self) -> PathBuf {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        PathBuf::from(dir).join(file)
    }

    pub fn to_short_oid(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SHORT_OID_LENGTH);
        hex
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_parse(s)
    }
}
