//! Additive stream cipher over code values and header text.
//!
//! This is a reversible permutation keyed by a PRNG seed, not real
//! encryption. A wrong key is never detected: it simply yields different
//! codes, which decode to garbage or eventually to an unknown code.
//!
//! The keystream is ChaCha8 seeded with `seed_from_u64(key)`. Archives on
//! disk depend on it, so the generator and the draw order must not change.

use crate::error::{LzwError, Result};
use crate::stream::{CodeSink, CodeSource};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const NEWLINE: u32 = 0x0A;
const SURROGATE_START: u32 = 0xD800;
const SURROGATE_LEN: u32 = 0x800;

/// Number of scalar values a header character may be mapped to: every
/// Unicode scalar value except the line feed.
const HEADER_ALPHABET: u32 = 0x11_0000 - SURROGATE_LEN - 1;

/// Position of `c` in the header alphabet. `c` must not be a line feed.
fn ordinal(c: char) -> u32 {
    let mut v = u32::from(c);
    if v >= SURROGATE_START + SURROGATE_LEN {
        v -= SURROGATE_LEN;
    }
    if v > NEWLINE {
        v -= 1;
    }
    v
}

/// Inverse of [`ordinal`].
fn from_ordinal(index: u32) -> Option<char> {
    let mut v = index;
    if v >= NEWLINE {
        v += 1;
    }
    if v >= SURROGATE_START {
        v += SURROGATE_LEN;
    }
    char::from_u32(v)
}

/// Shift every character of `name` by a fresh draw, forwards or backwards.
fn shift_name(rng: &mut ChaCha8Rng, name: &str, forward: bool) -> Result<String> {
    name.chars()
        .map(|c| {
            if c == '\n' {
                return Err(LzwError::invalid_file_name(name, "contains a line feed"));
            }
            let offset = rng.gen_range(0..HEADER_ALPHABET);
            let index = if forward {
                (ordinal(c) + offset) % HEADER_ALPHABET
            } else {
                (ordinal(c) + HEADER_ALPHABET - offset) % HEADER_ALPHABET
            };
            from_ordinal(index)
                .ok_or_else(|| LzwError::invalid_header("header character out of range"))
        })
        .collect()
}

/// Cipher layer on the compress path.
#[derive(Debug)]
pub struct CipherWriter<S> {
    inner: S,
    key: u64,
    rng: ChaCha8Rng,
}

impl<S: CodeSink> CipherWriter<S> {
    /// Wrap `inner` with the cipher keyed by `key`.
    pub fn new(inner: S, key: u64) -> Self {
        Self {
            inner,
            key,
            rng: ChaCha8Rng::seed_from_u64(key),
        }
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: CodeSink> CodeSink for CipherWriter<S> {
    fn begin_operation(&mut self) {
        debug!("seeding cipher for compression");
        self.rng = ChaCha8Rng::seed_from_u64(self.key);
        self.inner.begin_operation();
    }

    fn code_width(&self) -> u8 {
        self.inner.code_width()
    }

    fn set_code_width(&mut self, bits: u8) {
        self.inner.set_code_width(bits);
    }

    fn write_code(&mut self, code: u32) -> Result<()> {
        let modulus = 1u32 << self.inner.code_width();
        let offset = self.rng.gen_range(0..modulus);
        self.inner.write_code((code + offset) % modulus)
    }

    fn write_header(&mut self, names: &[String]) -> Result<()> {
        let shifted = names
            .iter()
            .map(|name| shift_name(&mut self.rng, name, true))
            .collect::<Result<Vec<_>>>()?;
        self.inner.write_header(&shifted)
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }
}

/// Cipher layer on the decompress path.
#[derive(Debug)]
pub struct CipherReader<S> {
    inner: S,
    key: u64,
    rng: ChaCha8Rng,
}

impl<S: CodeSource> CipherReader<S> {
    /// Wrap `inner` with the cipher keyed by `key`.
    pub fn new(inner: S, key: u64) -> Self {
        Self {
            inner,
            key,
            rng: ChaCha8Rng::seed_from_u64(key),
        }
    }

    /// Unwrap the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: CodeSource> CodeSource for CipherReader<S> {
    fn begin_operation(&mut self) {
        debug!("seeding cipher for decompression");
        self.rng = ChaCha8Rng::seed_from_u64(self.key);
        self.inner.begin_operation();
    }

    fn code_width(&self) -> u8 {
        self.inner.code_width()
    }

    fn set_code_width(&mut self, bits: u8) {
        self.inner.set_code_width(bits);
    }

    fn read_code(&mut self) -> Result<Option<u32>> {
        let Some(code) = self.inner.read_code()? else {
            return Ok(None);
        };
        let modulus = 1u32 << self.inner.code_width();
        let offset = self.rng.gen_range(0..modulus);
        Ok(Some((code + modulus - offset) % modulus))
    }

    fn read_header(&mut self) -> Result<Vec<String>> {
        self.inner
            .read_header()?
            .iter()
            .map(|name| shift_name(&mut self.rng, name, false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream_msb::{BitCodeReader, BitCodeWriter};
    use crate::transcode::RawBytes;

    fn encipher(codes: &[u32], bits: u8, key: u64) -> Vec<u8> {
        let mut data = Vec::new();
        let mut writer = CipherWriter::new(BitCodeWriter::new(RawBytes::new(&mut data)), key);
        writer.begin_operation();
        writer.set_code_width(bits);
        for &code in codes {
            writer.write_code(code).unwrap();
        }
        writer.finish().unwrap();
        data
    }

    fn decipher(data: &[u8], bits: u8, key: u64, count: usize) -> Vec<u32> {
        let mut reader = CipherReader::new(BitCodeReader::new(RawBytes::new(data)), key);
        reader.begin_operation();
        reader.set_code_width(bits);
        (0..count)
            .map(|_| reader.read_code().unwrap().unwrap())
            .collect()
    }

    #[test]
    fn test_ordinal_inverse() {
        for c in ['\0', '\t', '\u{0B}', 'A', '\u{D7FF}', '\u{E000}', '\u{10FFFF}'] {
            assert_eq!(from_ordinal(ordinal(c)), Some(c));
        }
        assert_eq!(ordinal('\u{10FFFF}'), HEADER_ALPHABET - 1);
        assert_eq!(from_ordinal(NEWLINE), Some('\u{0B}'));
    }

    #[test]
    fn test_cipher_symmetry() {
        let codes: Vec<u32> = (0..500).map(|i| (i * 37 + 11) % 4096).collect();
        let data = encipher(&codes, 12, 1234);
        assert_eq!(decipher(&data, 12, 1234, codes.len()), codes);
    }

    #[test]
    fn test_cipher_changes_codes() {
        let codes: Vec<u32> = vec![65; 64];
        let plain = {
            let mut data = Vec::new();
            let mut writer = BitCodeWriter::new(RawBytes::new(&mut data));
            writer.set_code_width(12);
            for &code in &codes {
                writer.write_code(code).unwrap();
            }
            writer.finish().unwrap();
            data
        };
        assert_ne!(encipher(&codes, 12, 7), plain);
    }

    #[test]
    fn test_wrong_key_diverges() {
        let codes: Vec<u32> = (0..64).collect();
        let data = encipher(&codes, 12, 99);
        assert_ne!(decipher(&data, 12, 100, codes.len()), codes);
    }

    /// Records codes instead of packing them.
    #[derive(Debug, Default)]
    struct Recorder {
        width: u8,
        codes: Vec<u32>,
    }

    impl CodeSink for Recorder {
        fn begin_operation(&mut self) {}

        fn code_width(&self) -> u8 {
            self.width
        }

        fn set_code_width(&mut self, bits: u8) {
            self.width = bits;
        }

        fn write_code(&mut self, code: u32) -> Result<()> {
            self.codes.push(code);
            Ok(())
        }

        fn write_header(&mut self, _names: &[String]) -> Result<()> {
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reseed_per_operation() {
        let codes: Vec<u32> = (0..32).collect();

        let mut fresh = CipherWriter::new(Recorder::default(), 5);
        fresh.begin_operation();
        fresh.set_code_width(12);
        for &code in &codes {
            fresh.write_code(code).unwrap();
        }

        // Draws consumed before the operation starts are discarded.
        let mut reused = CipherWriter::new(Recorder::default(), 5);
        reused.set_code_width(12);
        reused.write_code(1).unwrap();
        reused.write_code(2).unwrap();
        reused.begin_operation();
        for &code in &codes {
            reused.write_code(code).unwrap();
        }

        let fresh = fresh.into_inner().codes;
        let reused = reused.into_inner().codes;
        assert_eq!(&reused[2..], fresh.as_slice());
        assert!(fresh.iter().all(|&code| code < 4096));
    }

    fn keystream(key: u64, bits: u8, count: usize) -> Vec<u32> {
        let mut writer = CipherWriter::new(Recorder::default(), key);
        writer.begin_operation();
        writer.set_code_width(bits);
        for _ in 0..count {
            writer.write_code(0).unwrap();
        }
        writer.into_inner().codes
    }

    #[test]
    fn test_keystream_is_stable() {
        // Keyed archives on disk must keep decoding with later builds.
        assert_eq!(
            keystream(42, 12, 8),
            vec![2793, 3892, 3163, 1751, 1409, 3019, 1182, 614]
        );
        assert_eq!(
            keystream(7, 9, 8),
            vec![93, 86, 138, 18, 372, 36, 415, 184]
        );
    }

    #[test]
    fn test_header_shift_avoids_line_feed() {
        let names = vec!["a.txt".to_string(), "b/c.bin".to_string(), "日本".to_string()];

        let mut data = Vec::new();
        let mut writer = CipherWriter::new(BitCodeWriter::new(RawBytes::new(&mut data)), 42);
        writer.begin_operation();
        writer.write_header(&names).unwrap();
        writer.finish().unwrap();

        // Exactly one line feed per name plus the terminator survive.
        let line_feeds = data.iter().filter(|&&b| b == b'\n').count();
        assert_eq!(line_feeds, names.len() + 1);

        let mut reader = CipherReader::new(BitCodeReader::new(RawBytes::new(data.as_slice())), 42);
        reader.begin_operation();
        assert_eq!(reader.read_header().unwrap(), names);
    }

    #[test]
    fn test_header_rejects_line_feed() {
        let mut data = Vec::new();
        let mut writer = CipherWriter::new(BitCodeWriter::new(RawBytes::new(&mut data)), 1);
        writer.begin_operation();
        assert!(matches!(
            writer.write_header(&["a\nb".to_string()]),
            Err(LzwError::InvalidFileName { .. })
        ));
    }
}
