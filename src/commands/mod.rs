//! Command implementations
//!
//! Each command is an `impl Repository` block:
//!
//! - `plumbing`: direct object manipulation (cat-file, hash-object, ls-tree,
//!   write-tree, commit-tree)
//! - `porcelain`: workflows composed from plumbing (init, commit)

pub mod plumbing;
pub mod porcelain;
