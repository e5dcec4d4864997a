//! Porcelain commands (user-facing workflows)
//!
//! - `init`: create an empty repository
//! - `commit`: snapshot the working tree and advance the current branch

pub mod commit;
pub mod init;
