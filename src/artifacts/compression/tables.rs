//! RFC 1951 §3.2.5 length and distance tables

/// First length/literal symbol that encodes a match length.
pub const FIRST_LENGTH_SYMBOL: u16 = 257;

/// Symbol that terminates a compressed block.
pub const END_OF_BLOCK: u16 = 256;

/// Base match length for symbols 257..=285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits following each length symbol.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for distance codes 0..=29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits following each distance code.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Fixed distance codes are always this wide.
pub const FIXED_DISTANCE_CODE_BITS: u8 = 5;

/// Look up `(base, extra_bits)` for a length symbol, `None` for symbols
/// outside 257..=285.
pub fn length_code(symbol: u16) -> Option<(u16, u8)> {
    let index = symbol.checked_sub(FIRST_LENGTH_SYMBOL)? as usize;
    Some((*LENGTH_BASE.get(index)?, LENGTH_EXTRA_BITS[index]))
}

/// Look up `(base, extra_bits)` for a distance code, `None` for 30 and 31.
pub fn distance_code(code: u16) -> Option<(u16, u8)> {
    let index = code as usize;
    Some((*DISTANCE_BASE.get(index)?, DISTANCE_EXTRA_BITS[index]))
}
