//! zlib envelope (RFC 1950) around the DEFLATE codec
//!
//! ```text
//! CMF(1) FLG(1) <DEFLATE blocks> ADLER32(4, big-endian)
//! ```
//!
//! - CMF: compression method (low nibble, must be 8) and window size
//!   (high nibble, only 7 = 32 KiB is accepted)
//! - FLG: check bits making `CMF * 256 + FLG` a multiple of 31, the preset
//!   dictionary flag (rejected) and the informational compression level

use crate::artifacts::compression::Status;
use crate::artifacts::compression::adler32::Adler32;
use crate::artifacts::compression::bitstream::{BitPosition, Bitstream};
use crate::artifacts::compression::deflate::deflate_stored;
use crate::artifacts::compression::inflate::Inflater;
use crate::errors::{Error, Result};
use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

const CM_DEFLATE: u8 = 8;
const CINFO_32K_WINDOW: u8 = 7;
const HEADER_SIZE: usize = 2;
const TRAILER_SIZE: usize = 4;

bitflags! {
    /// Bit fields of the FLG header byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HeaderFlags: u8 {
        const FCHECK = 0b0001_1111;
        const FDICT = 0b0010_0000;
        const FLEVEL = 0b1100_0000;
    }
}

/// FLEVEL values. The decoder ignores them; the encoder records what it did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionLevel {
    #[default]
    Fastest = 0,
    Fast = 1,
    Default = 2,
    Max = 3,
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        match level & 0b11 {
            0 => CompressionLevel::Fastest,
            1 => CompressionLevel::Fast,
            2 => CompressionLevel::Default,
            _ => CompressionLevel::Max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZlibState {
    Header,
    Deflate,
    Adler,
    Finished,
    Error,
}

/// Resumable zlib decoder.
///
/// Each call to [`ZlibDecoder::decode`] takes every input byte received so
/// far; the decoder remembers how much of it was consumed. Feeding the
/// stream in arbitrary chunks yields the same output as feeding it at once.
#[derive(Debug)]
pub struct ZlibDecoder {
    state: ZlibState,
    position: BitPosition,
    inflater: Inflater,
    level: Option<CompressionLevel>,
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZlibDecoder {
    pub fn new() -> Self {
        ZlibDecoder {
            state: ZlibState::Header,
            position: BitPosition::default(),
            inflater: Inflater::new(),
            level: None,
        }
    }

    pub fn state(&self) -> ZlibState {
        self.state
    }

    /// Compression level announced by the stream header, once read.
    pub fn level(&self) -> Option<CompressionLevel> {
        self.level
    }

    /// Input bytes fully consumed so far.
    pub fn consumed(&self) -> usize {
        self.position.byte()
    }

    pub fn output(&self) -> &[u8] {
        self.inflater.output()
    }

    pub fn into_output(self) -> Bytes {
        Bytes::from(self.inflater.into_output())
    }

    /// Feed the whole input seen so far; it must extend the previous call's.
    pub fn decode(&mut self, input: &[u8]) -> Result<Status<()>> {
        if input.len() < self.position.byte() {
            return Err(Error::validation(format!(
                "input of {} bytes is shorter than the {} bytes already consumed",
                input.len(),
                self.position.byte()
            )));
        }

        let mut bits = Bitstream::resume(input, self.position);
        let result = self.run(&mut bits);
        self.position = bits.position();

        if result.is_err() {
            self.state = ZlibState::Error;
        }
        result
    }

    fn run(&mut self, bits: &mut Bitstream<'_>) -> Result<Status<()>> {
        loop {
            match self.state {
                ZlibState::Header => {
                    let Some(header) = bits.take_exact(HEADER_SIZE) else {
                        return Ok(Status::NeedMoreInput);
                    };
                    self.level = Some(Self::parse_header(header[0], header[1])?);
                    self.state = ZlibState::Deflate;
                }

                ZlibState::Deflate => match self.inflater.resume(bits)? {
                    Status::NeedMoreInput => return Ok(Status::NeedMoreInput),
                    Status::Done(()) => self.state = ZlibState::Adler,
                },

                ZlibState::Adler => {
                    bits.clear_to_byte_boundary();
                    let Some(trailer) = bits.take_exact(TRAILER_SIZE) else {
                        return Ok(Status::NeedMoreInput);
                    };

                    let expected = BigEndian::read_u32(trailer);
                    let actual = Adler32::checksum(self.inflater.output());
                    if expected != actual {
                        return Err(Error::format(format!(
                            "adler-32 mismatch: stream says {expected:#010x}, data hashes to {actual:#010x}"
                        )));
                    }

                    tracing::trace!(size = self.inflater.output().len(), "zlib stream verified");
                    self.state = ZlibState::Finished;
                }

                ZlibState::Finished => return Ok(Status::Done(())),

                ZlibState::Error => return Err(Error::format("zlib stream already failed")),
            }
        }
    }

    fn parse_header(cmf: u8, flg: u8) -> Result<CompressionLevel> {
        let method = cmf & 0x0f;
        let window = cmf >> 4;

        if method != CM_DEFLATE {
            return Err(Error::format(format!(
                "compression method {method} is not deflate"
            )));
        }
        if window != CINFO_32K_WINDOW {
            return Err(Error::format(format!(
                "unsupported window size 2^{} (only 32 KiB windows are handled)",
                window + 8
            )));
        }
        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
            return Err(Error::format(format!(
                "header check bits fail for {cmf:#04x} {flg:#04x}"
            )));
        }

        let flags = HeaderFlags::from_bits_retain(flg);
        if flags.contains(HeaderFlags::FDICT) {
            return Err(Error::format("preset dictionaries are not supported"));
        }

        Ok(CompressionLevel::from(
            (flags & HeaderFlags::FLEVEL).bits() >> 6,
        ))
    }
}

/// zlib encoder writing stored DEFLATE blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibEncoder {
    level: CompressionLevel,
}

impl ZlibEncoder {
    pub fn new(level: CompressionLevel) -> Self {
        ZlibEncoder { level }
    }

    pub fn header(&self) -> [u8; HEADER_SIZE] {
        let cmf = (CINFO_32K_WINDOW << 4) | CM_DEFLATE;
        let flg = (self.level as u8) << 6;
        let check = (31 - (u16::from(cmf) * 256 + u16::from(flg)) % 31) % 31;

        [cmf, flg | check as u8]
    }

    pub fn encode(&self, data: &[u8]) -> Bytes {
        let mut out = Vec::with_capacity(HEADER_SIZE + data.len() + TRAILER_SIZE + 5);
        out.extend_from_slice(&self.header());

        deflate_stored(data, &mut out);

        let mut trailer = [0u8; TRAILER_SIZE];
        BigEndian::write_u32(&mut trailer, Adler32::checksum(data));
        out.extend_from_slice(&trailer);

        Bytes::from(out)
    }
}

pub fn zlib_compress(data: &[u8]) -> Bytes {
    ZlibEncoder::default().encode(data)
}

/// Decompress a complete zlib stream held in memory.
pub fn zlib_decompress(data: &[u8]) -> Result<Bytes> {
    let mut decoder = ZlibDecoder::new();

    match decoder.decode(data)? {
        Status::Done(()) => Ok(decoder.into_output()),
        Status::NeedMoreInput => Err(Error::format(format!(
            "truncated zlib stream ({} bytes)",
            data.len()
        ))),
    }
}
