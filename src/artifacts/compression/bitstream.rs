//! Bit-level cursor over a DEFLATE byte stream
//!
//! DEFLATE packs data elements starting at the least significant bit of each
//! byte, consuming bytes from low to high addresses (RFC 1951 §3.1.1). Two
//! kinds of fields live in that stream:
//!
//! - plain multi-bit fields (block type, extra bits, stored lengths) whose
//!   first bit is their least significant bit: read with [`Bitstream::next_bits`]
//! - Huffman codes, packed most significant bit first: read with
//!   [`Bitstream::next_bits_rev`], which assembles bits in stream order
//!
//! Every read returns `None` when not enough input is available and leaves
//! the cursor untouched, so a caller can come back later with a longer buffer.

/// Position of the cursor: a byte offset plus the index (0-7) of the next
/// unread bit inside that byte.
///
/// Positions are plain data, so a decoder can keep one between calls and
/// resume over a longer copy of the same input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitPosition {
    byte: usize,
    bit: u8,
}

impl BitPosition {
    pub fn byte(&self) -> usize {
        self.byte
    }

    pub fn bit(&self) -> u8 {
        self.bit
    }
}

/// Largest field a single read can return.
pub const MAX_FIELD_BITS: u8 = 63;

#[derive(Debug)]
pub struct Bitstream<'a> {
    data: &'a [u8],
    position: BitPosition,
}

impl<'a> Bitstream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::resume(data, BitPosition::default())
    }

    /// Continue reading `data` from a previously saved position.
    ///
    /// `data` must start with the same bytes the position was taken over;
    /// only new bytes appended to the tail are allowed. A position past the
    /// end of `data` reads as an exhausted stream.
    pub fn resume(data: &'a [u8], position: BitPosition) -> Self {
        Bitstream { data, position }
    }

    pub fn position(&self) -> BitPosition {
        self.position
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.position.bit == 0
    }

    pub fn remaining_bits(&self) -> usize {
        (self.data.len().saturating_sub(self.position.byte) * 8)
            .saturating_sub(self.position.bit as usize)
    }

    /// Whole bytes left after the current byte boundary.
    pub fn remaining_bytes(&self) -> usize {
        let start = self.position.byte + usize::from(self.position.bit != 0);
        self.data.len().saturating_sub(start)
    }

    /// Read `n` bits as a little-endian field without consuming them.
    pub fn peek_bits(&self, n: u8) -> Option<u64> {
        debug_assert!(n <= MAX_FIELD_BITS);
        if self.remaining_bits() < n as usize {
            return None;
        }

        let mut value = 0u64;
        let mut filled = 0u8;
        let mut index = self.position.byte;
        let mut shift = self.position.bit;

        while filled < n {
            let take = (8 - shift).min(n - filled);
            let mask = ((1u16 << take) - 1) as u8;
            let chunk = (self.data[index] >> shift) & mask;
            value |= u64::from(chunk) << filled;

            filled += take;
            shift = 0;
            index += 1;
        }

        Some(value)
    }

    /// Read `n` bits in stream order, the first bit read ending up as the
    /// most significant one. This is the layout of Huffman codes.
    pub fn peek_bits_rev(&self, n: u8) -> Option<u64> {
        let value = self.peek_bits(n)?;
        if n == 0 {
            return Some(0);
        }

        Some(value.reverse_bits() >> (64 - u32::from(n)))
    }

    pub fn next_bits(&mut self, n: u8) -> Option<u64> {
        let value = self.peek_bits(n)?;
        self.drop_bits(n);
        Some(value)
    }

    pub fn next_bits_rev(&mut self, n: u8) -> Option<u64> {
        let value = self.peek_bits_rev(n)?;
        self.drop_bits(n);
        Some(value)
    }

    /// Consume `n` bits that were already peeked.
    pub fn drop_bits(&mut self, n: u8) {
        debug_assert!(self.remaining_bits() >= n as usize);
        let consumed = self.position.bit as usize + n as usize;
        self.position.byte += consumed / 8;
        self.position.bit = (consumed % 8) as u8;
    }

    /// Read up to 8 whole bytes as a little-endian integer.
    ///
    /// The cursor must sit on a byte boundary.
    pub fn next_bytes(&mut self, n: usize) -> Option<u64> {
        debug_assert!(n <= 8);
        let bytes = self.take_exact(n)?;

        Some(
            bytes
                .iter()
                .rev()
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)),
        )
    }

    /// Borrow exactly `n` bytes from a byte-aligned cursor.
    pub fn take_exact(&mut self, n: usize) -> Option<&'a [u8]> {
        debug_assert!(self.is_byte_aligned());
        if self.remaining_bytes() < n {
            return None;
        }

        let start = self.position.byte;
        self.position.byte += n;
        Some(&self.data[start..start + n])
    }

    /// Borrow as many bytes as are available, up to `max`.
    pub fn take_up_to(&mut self, max: usize) -> &'a [u8] {
        debug_assert!(self.is_byte_aligned());
        let n = max.min(self.remaining_bytes());
        if n == 0 {
            return &[];
        }
        let start = self.position.byte;
        self.position.byte += n;
        &self.data[start..start + n]
    }

    /// Skip the unread bits of a partially consumed byte.
    pub fn clear_to_byte_boundary(&mut self) {
        if self.position.bit > 0 {
            self.position.byte += 1;
            self.position.bit = 0;
        }
    }
}
