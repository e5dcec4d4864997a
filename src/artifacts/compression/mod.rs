//! zlib/DEFLATE codec
//!
//! - `bitstream`: bit cursor over a borrowed buffer
//! - `inflate`: resumable DEFLATE decoder (stored and fixed Huffman blocks)
//! - `deflate`: stored-block DEFLATE encoder
//! - `tables`: RFC 1951 length and distance tables
//! - `adler32`: Adler-32 checksum
//! - `zlib`: RFC 1950 envelope, one-shot helpers
//!
//! Decoding never blocks on input. When the buffer runs out mid-stream the
//! decoder reports [`Status::NeedMoreInput`] and keeps its state, so the call
//! can be repeated once more bytes have been appended.

pub mod adler32;
pub mod bitstream;
pub mod deflate;
pub mod inflate;
pub mod tables;
pub mod zlib;

pub use zlib::{zlib_compress, zlib_decompress};

/// Outcome of a resumable decoding step that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status<T> {
    /// The input ended before the next logical unit; call again with more.
    NeedMoreInput,
    Done(T),
}
