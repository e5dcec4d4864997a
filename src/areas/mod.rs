//! Storage areas of a repository
//!
//! - `database`: compressed, content-addressed object store
//! - `refs`: HEAD and branch references
//! - `repository`: owner of all areas and of the output writer
//! - `workspace`: read access to the working tree

pub mod database;
pub mod refs;
pub mod repository;
pub mod workspace;
