//! Data structures and algorithms
//!
//! - `compression`: zlib/DEFLATE codec used for every stored object
//! - `objects`: object types (blob, tree, commit) and their codec

pub mod compression;
pub mod objects;
