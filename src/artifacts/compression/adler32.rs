//! Adler-32 checksum (RFC 1950 §8)

const MOD_ADLER: u32 = 65521;

/// Largest number of bytes that can be summed before `s2` may overflow a u32.
const NMAX: usize = 5552;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adler32 {
    s1: u32,
    s2: u32,
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Adler32 {
    pub fn new() -> Self {
        Adler32 { s1: 1, s2: 0 }
    }

    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }

    pub fn update(&mut self, data: &[u8]) {
        for chunk in data.chunks(NMAX) {
            for byte in chunk {
                self.s1 += u32::from(*byte);
                self.s2 += self.s1;
            }
            self.s1 %= MOD_ADLER;
            self.s2 %= MOD_ADLER;
        }
    }

    pub fn finish(&self) -> u32 {
        (self.s2 << 16) | self.s1
    }
}
