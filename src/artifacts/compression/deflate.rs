//! DEFLATE encoder emitting stored (uncompressed) blocks only
//!
//! Object writes only need a valid, round-trippable stream, so payloads are
//! split into blocks of at most 65535 bytes, each laid out as:
//!
//! ```text
//! BFINAL(1 bit) BTYPE=00(2 bits) <pad to byte> LEN(u16 LE) NLEN(u16 LE) <LEN raw bytes>
//! ```
//!
//! Only the last block carries BFINAL. An empty payload still produces one
//! final, empty block.

use byteorder::{ByteOrder, LittleEndian};

/// Largest payload a single stored block can carry.
pub const MAX_STORED_BLOCK: usize = u16::MAX as usize;

const BFINAL: u8 = 0b001;

/// Append the stored-block encoding of `data` to `out`.
///
/// The stream must start on a byte boundary, which holds right after a zlib
/// header or at the start of a raw stream.
pub fn deflate_stored(data: &[u8], out: &mut Vec<u8>) {
    let blocks = data.len().div_ceil(MAX_STORED_BLOCK).max(1);
    out.reserve(data.len() + blocks * 5);

    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    if chunks.peek().is_none() {
        write_stored_block(&[], true, out);
        return;
    }

    while let Some(chunk) = chunks.next() {
        write_stored_block(chunk, chunks.peek().is_none(), out);
    }
}

fn write_stored_block(chunk: &[u8], last: bool, out: &mut Vec<u8>) {
    debug_assert!(chunk.len() <= MAX_STORED_BLOCK);
    let len = chunk.len() as u16;

    // BTYPE=00 leaves the remaining header bits as padding
    out.push(if last { BFINAL } else { 0 });

    let mut lengths = [0u8; 4];
    LittleEndian::write_u16(&mut lengths[..2], len);
    LittleEndian::write_u16(&mut lengths[2..], !len);
    out.extend_from_slice(&lengths);
    out.extend_from_slice(chunk);
}
