#![allow(dead_code)]

pub mod command;
pub mod file;

use std::path::Path;

/// Digest of the tree with no entries
pub const EMPTY_TREE_OID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Path of a loose object under `.git/objects`
pub fn object_path(dir: &Path, oid: &str) -> std::path::PathBuf {
    dir.join(".git").join("objects").join(&oid[..2]).join(&oid[2..])
}

/// Decode a stored object with an independent zlib implementation.
pub fn inflate_object(dir: &Path, oid: &str) -> Vec<u8> {
    use std::io::Read;

    let compressed = std::fs::read(object_path(dir, oid))
        .unwrap_or_else(|e| panic!("Failed to read object {oid}: {e}"));
    let mut decoded = Vec::new();
    flate2::read::ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut decoded)
        .unwrap_or_else(|e| panic!("Failed to inflate object {oid}: {e}"));
    decoded
}

/// Store an object with an independent zlib implementation, using stored
/// blocks only.
pub fn deflate_object(dir: &Path, oid: &str, object: &[u8]) {
    use std::io::Write;

    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::none());
    encoder
        .write_all(object)
        .unwrap_or_else(|e| panic!("Failed to deflate object {oid}: {e}"));
    let compressed = encoder
        .finish()
        .unwrap_or_else(|e| panic!("Failed to deflate object {oid}: {e}"));

    let path = object_path(dir, oid);
    std::fs::create_dir_all(path.parent().expect("fan-out directory"))
        .unwrap_or_else(|e| panic!("Failed to create fan-out directory for {oid}: {e}"));
    std::fs::write(&path, compressed)
        .unwrap_or_else(|e| panic!("Failed to write object {oid}: {e}"));
}

/// First line of a command's stdout, trimmed.
pub fn stdout_line(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
