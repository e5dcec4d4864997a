//! Object model
//!
//! Every piece of content is an object named by the SHA-1 of its serialized
//! form, `<type> <size>\0<payload>`:
//!
//! - **Blob**: raw file bytes
//! - **Tree**: one directory level, as `(mode, name, object id)` entries
//! - **Commit**: a tree, an optional parent, author/committer and a message

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 digest in hexadecimal form
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 digest in raw form
pub const OBJECT_ID_BYTES: usize = 20;
