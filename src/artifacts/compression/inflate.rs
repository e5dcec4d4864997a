//! DEFLATE decoder (RFC 1951) as a resumable state machine
//!
//! The decoder never blocks: each call runs transitions until the stream
//! ends, an error occurs, or the bitstream cannot supply the next logical
//! unit (block header, stored length, Huffman symbol, extra bits). In the
//! last case it returns [`Status::NeedMoreInput`] with every partially
//! decoded value kept in [`InflateState`], so the caller can retry with a
//! longer buffer.
//!
//! Supported blocks: stored (BTYPE=00) and fixed Huffman (BTYPE=01).
//! Dynamic Huffman blocks (BTYPE=10) are reported as unsupported.

use crate::artifacts::compression::Status;
use crate::artifacts::compression::bitstream::Bitstream;
use crate::artifacts::compression::tables::{
    END_OF_BLOCK, FIXED_DISTANCE_CODE_BITS, distance_code, length_code,
};
use crate::errors::{Error, Result};

const BLOCK_STORED: u64 = 0;
const BLOCK_FIXED: u64 = 1;
const BLOCK_DYNAMIC: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateState {
    /// Expecting BFINAL and BTYPE.
    Header,
    /// Expecting the byte-aligned LEN/NLEN pair.
    Stored,
    /// Copying raw bytes of a stored block.
    StoredData { remaining: u16 },
    /// Expecting a fixed literal/length symbol.
    FixedCode,
    /// A length symbol was read; resolve its base length.
    FixedLength { symbol: u16 },
    /// Expecting the extra bits of a length symbol.
    FixedLengthExtra { symbol: u16 },
    /// Expecting a 5-bit distance code.
    FixedDistance { length: u16 },
    /// Expecting the extra bits of a distance code.
    FixedDistanceExtra { length: u16, code: u16 },
    /// Ready to copy a back-reference.
    FixedCopy { length: u16, distance: u16 },
    /// A dynamic Huffman block header was read.
    DynamicUnsupported,
    /// The final block ended.
    Finished,
    /// A previous call failed; the stream cannot continue.
    Error,
}

enum Step {
    Continue,
    Suspend,
}

/// Raw DEFLATE decoder.
///
/// Owns the output of one stream. The input is borrowed per call through a
/// [`Bitstream`], so the caller decides where the input lives and how it grows.
#[derive(Debug)]
pub struct Inflater {
    state: InflateState,
    last_block: bool,
    output: Vec<u8>,
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Inflater {
    pub fn new() -> Self {
        Inflater {
            state: InflateState::Header,
            last_block: false,
            output: Vec::new(),
        }
    }

    pub fn state(&self) -> InflateState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == InflateState::Finished
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Run the state machine as far as `bits` allows.
    pub fn resume(&mut self, bits: &mut Bitstream<'_>) -> Result<Status<()>> {
        loop {
            match self.step(bits) {
                Ok(Step::Continue) => continue,
                Ok(Step::Suspend) if self.state == InflateState::Finished => {
                    return Ok(Status::Done(()));
                }
                Ok(Step::Suspend) => return Ok(Status::NeedMoreInput),
                Err(e) => {
                    self.state = InflateState::Error;
                    return Err(e);
                }
            }
        }
    }

    fn step(&mut self, bits: &mut Bitstream<'_>) -> Result<Step> {
        match self.state {
            InflateState::Header => {
                let Some(header) = bits.next_bits(3) else {
                    return Ok(Step::Suspend);
                };
                self.last_block = header & 1 == 1;

                self.state = match header >> 1 {
                    BLOCK_STORED => InflateState::Stored,
                    BLOCK_FIXED => InflateState::FixedCode,
                    BLOCK_DYNAMIC => InflateState::DynamicUnsupported,
                    _ => return Err(Error::format("reserved DEFLATE block type 11")),
                };
                tracing::trace!(state = ?self.state, last = self.last_block, "deflate block header");
            }

            InflateState::Stored => {
                bits.clear_to_byte_boundary();
                if bits.remaining_bytes() < 4 {
                    return Ok(Step::Suspend);
                }
                let len = bits.next_bytes(2).unwrap_or_default() as u16;
                let nlen = bits.next_bytes(2).unwrap_or_default() as u16;
                if len != !nlen {
                    return Err(Error::format(format!(
                        "stored block length {len:#06x} does not match its complement {nlen:#06x}"
                    )));
                }

                self.state = InflateState::StoredData { remaining: len };
            }

            InflateState::StoredData { remaining } => {
                let chunk = bits.take_up_to(remaining as usize);
                self.output.extend_from_slice(chunk);
                let remaining = remaining - chunk.len() as u16;

                if remaining > 0 {
                    self.state = InflateState::StoredData { remaining };
                    return Ok(Step::Suspend);
                }
                self.end_block();
            }

            InflateState::FixedCode => {
                let Some(symbol) = Self::fixed_symbol(bits) else {
                    return Ok(Step::Suspend);
                };

                match symbol {
                    0..=255 => self.output.push(symbol as u8),
                    END_OF_BLOCK => self.end_block(),
                    _ => self.state = InflateState::FixedLength { symbol },
                }
            }

            InflateState::FixedLength { symbol } => {
                let (base, extra) = length_code(symbol).ok_or_else(|| {
                    Error::format(format!("invalid literal/length symbol {symbol}"))
                })?;

                self.state = if extra == 0 {
                    InflateState::FixedDistance { length: base }
                } else {
                    InflateState::FixedLengthExtra { symbol }
                };
            }

            InflateState::FixedLengthExtra { symbol } => {
                let (base, extra) = length_code(symbol).ok_or_else(|| {
                    Error::format(format!("invalid literal/length symbol {symbol}"))
                })?;
                let Some(offset) = bits.next_bits(extra) else {
                    return Ok(Step::Suspend);
                };

                self.state = InflateState::FixedDistance {
                    length: base + offset as u16,
                };
            }

            InflateState::FixedDistance { length } => {
                let Some(code) = bits.next_bits_rev(FIXED_DISTANCE_CODE_BITS) else {
                    return Ok(Step::Suspend);
                };
                let code = code as u16;
                let (base, extra) = distance_code(code)
                    .ok_or_else(|| Error::format(format!("invalid distance code {code}")))?;

                self.state = if extra == 0 {
                    InflateState::FixedCopy {
                        length,
                        distance: base,
                    }
                } else {
                    InflateState::FixedDistanceExtra { length, code }
                };
            }

            InflateState::FixedDistanceExtra { length, code } => {
                let (base, extra) = distance_code(code)
                    .ok_or_else(|| Error::format(format!("invalid distance code {code}")))?;
                let Some(offset) = bits.next_bits(extra) else {
                    return Ok(Step::Suspend);
                };

                self.state = InflateState::FixedCopy {
                    length,
                    distance: base + offset as u16,
                };
            }

            InflateState::FixedCopy { length, distance } => {
                self.copy_back_reference(length as usize, distance as usize)?;
                self.state = InflateState::FixedCode;
            }

            InflateState::DynamicUnsupported => {
                return Err(Error::unsupported("dynamic Huffman DEFLATE blocks"));
            }

            InflateState::Finished => return Ok(Step::Suspend),

            InflateState::Error => {
                return Err(Error::format("DEFLATE stream already failed"));
            }
        }

        Ok(Step::Continue)
    }

    fn end_block(&mut self) {
        self.state = if self.last_block {
            tracing::trace!(size = self.output.len(), "deflate stream finished");
            InflateState::Finished
        } else {
            InflateState::Header
        };
    }

    /// Decode one symbol of the fixed literal/length code (RFC 1951 §3.2.6).
    ///
    /// | symbols | bits | codes            |
    /// |---------|------|------------------|
    /// | 256-279 | 7    | 0x00-0x17        |
    /// | 0-143   | 8    | 0x30-0xBF        |
    /// | 280-287 | 8    | 0xC0-0xC7        |
    /// | 144-255 | 9    | 0x190-0x1FF      |
    fn fixed_symbol(bits: &mut Bitstream<'_>) -> Option<u16> {
        let code = bits.peek_bits_rev(7)? as u16;
        if code <= 0x17 {
            bits.drop_bits(7);
            return Some(code + 256);
        }

        let code = bits.peek_bits_rev(8)? as u16;
        if code <= 0xBF {
            bits.drop_bits(8);
            return Some(code - 0x30);
        }
        if code <= 0xC7 {
            bits.drop_bits(8);
            return Some(code - 0xC0 + 280);
        }

        let code = bits.peek_bits_rev(9)? as u16;
        bits.drop_bits(9);
        Some(code - 0x190 + 144)
    }

    /// Append `length` bytes starting `distance` bytes back from the end of
    /// the output. Overlapping copies repeat the bytes appended so far.
    fn copy_back_reference(&mut self, length: usize, distance: usize) -> Result<()> {
        if distance > self.output.len() {
            return Err(Error::corruption(format!(
                "back-reference distance {distance} exceeds the {} bytes decoded so far",
                self.output.len()
            )));
        }

        self.output.reserve(length);
        let mut remaining = length;
        let mut span = distance;
        while remaining > span {
            let end = self.output.len();
            self.output.extend_from_within(end - span..end);
            remaining -= span;
            span *= 2;
        }

        let start = self.output.len() - span;
        self.output.extend_from_within(start..start + remaining);

        Ok(())
    }
}

/// Decode a complete raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::new();
    let mut bits = Bitstream::new(data);

    match inflater.resume(&mut bits)? {
        Status::Done(()) => Ok(inflater.into_output()),
        Status::NeedMoreInput => Err(Error::format("truncated DEFLATE stream")),
    }
}
