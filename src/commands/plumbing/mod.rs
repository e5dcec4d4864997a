//! Plumbing commands (low-level object access)
//!
//! - `cat-file`: print an object's type or content
//! - `hash-object`: compute a blob digest, optionally storing the blob
//! - `ls-tree`: list the entries of a tree
//! - `write-tree`: snapshot the working tree into tree objects
//! - `commit-tree`: create a commit from an existing tree

pub mod cat_file;
pub mod commit_tree;
pub mod hash_object;
pub mod ls_tree;
pub mod write_tree;
