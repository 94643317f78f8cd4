//! Symbol-level transcoders below the bit packer.
//!
//! The packer emits fixed-size bit groups; a transcoder maps each group to
//! bytes on the wire and back. Raw and hex work on 8-bit groups, base64 on
//! 6-bit groups.

use crate::error::{LzwError, Result};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use std::io::{self, Read, Write};

/// Characters of the standard base64 alphabet, indexed by 6-bit value.
fn base64_symbols() -> &'static [u8] {
    let standard: &'static alphabet::Alphabet = &alphabet::STANDARD;
    standard.as_str().as_bytes()
}

/// Writes bit groups of [`GroupWrite::GROUP_BITS`] bits.
pub trait GroupWrite {
    /// Bits per group.
    const GROUP_BITS: u8;

    /// Emit one group (only the low `GROUP_BITS` bits are significant).
    fn put_group(&mut self, group: u8) -> Result<()>;

    /// Flush the underlying writer.
    fn flush(&mut self) -> Result<()>;
}

/// Reads bit groups of [`GroupRead::GROUP_BITS`] bits.
pub trait GroupRead {
    /// Bits per group.
    const GROUP_BITS: u8;

    /// Next group, or `None` when the input is exhausted.
    fn take_group(&mut self) -> Result<Option<u8>>;
}

/// Read a single byte, retrying on interruption.
fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read a byte of a text encoding, skipping line breaks and blanks.
fn read_text_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    loop {
        match read_byte(reader)? {
            Some(b) if b.is_ascii_whitespace() => continue,
            other => return Ok(other),
        }
    }
}

/// Untransformed bytes.
#[derive(Debug)]
pub struct RawBytes<T> {
    inner: T,
}

impl<T> RawBytes<T> {
    /// Wrap a reader or writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<W: Write> GroupWrite for RawBytes<W> {
    const GROUP_BITS: u8 = 8;

    fn put_group(&mut self, group: u8) -> Result<()> {
        self.inner.write_all(&[group])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl<R: Read> GroupRead for RawBytes<R> {
    const GROUP_BITS: u8 = 8;

    fn take_group(&mut self) -> Result<Option<u8>> {
        read_byte(&mut self.inner)
    }
}

/// Each byte as two hex digits.
#[derive(Debug)]
pub struct HexText<T> {
    inner: T,
}

impl<T> HexText<T> {
    /// Wrap a reader or writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<W: Write> GroupWrite for HexText<W> {
    const GROUP_BITS: u8 = 8;

    fn put_group(&mut self, group: u8) -> Result<()> {
        self.inner.write_all(hex::encode([group]).as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl<R: Read> GroupRead for HexText<R> {
    const GROUP_BITS: u8 = 8;

    fn take_group(&mut self) -> Result<Option<u8>> {
        let Some(high) = read_text_byte(&mut self.inner)? else {
            return Ok(None);
        };
        // A dangling half byte cannot form a group.
        let Some(low) = read_text_byte(&mut self.inner)? else {
            return Ok(None);
        };
        let byte = hex::decode([high, low])?;
        Ok(byte.first().copied())
    }
}

/// Each 6-bit group as one base64 character.
#[derive(Debug)]
pub struct Base64Text<T> {
    inner: T,
}

impl<T> Base64Text<T> {
    /// Wrap a reader or writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

fn base64_value(symbol: u8) -> Result<u8> {
    base64_symbols()
        .iter()
        .position(|&c| c == symbol)
        .map(|value| value as u8)
        .ok_or(LzwError::InvalidText {
            alphabet: "base64",
            symbol,
        })
}

impl<W: Write> GroupWrite for Base64Text<W> {
    const GROUP_BITS: u8 = 6;

    fn put_group(&mut self, group: u8) -> Result<()> {
        self.inner
            .write_all(&[base64_symbols()[usize::from(group & 0x3F)]])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl<R: Read> GroupRead for Base64Text<R> {
    const GROUP_BITS: u8 = 6;

    fn take_group(&mut self) -> Result<Option<u8>> {
        match read_text_byte(&mut self.inner)? {
            Some(symbol) => base64_value(symbol).map(Some),
            None => Ok(None),
        }
    }
}

/// Text with ASCII whitespace removed, so wrapped input decodes.
fn strip_whitespace(text: &str) -> Vec<u8> {
    text.bytes().filter(|b| !b.is_ascii_whitespace()).collect()
}

/// Encode bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex text produced by [`to_hex`]. Either case is accepted.
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(strip_whitespace(text))?)
}

/// Encode bytes as unpadded base64.
///
/// This matches the output of [`Base64Text`] for the same bytes: one
/// character per 6-bit group, the last group zero-filled.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD_NO_PAD.encode(bytes)
}

/// Decode base64 text produced by [`to_base64`].
pub fn from_base64(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD_NO_PAD.decode(strip_whitespace(text))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream_msb::BitCodeWriter;
    use crate::stream::CodeSink;

    fn sample() -> Vec<u8> {
        let mut bytes = b"name.txt\n\n".to_vec();
        bytes.extend_from_slice(&[0x00, 0x0A, 0xFF, 0x7F, 0x00]);
        bytes
    }

    #[test]
    fn test_hex_known_value() {
        assert_eq!(to_hex(&[0x00, 0x0A, 0xAB]), "000aab");
        assert_eq!(from_hex("000AAB").unwrap(), vec![0x00, 0x0A, 0xAB]);
    }

    #[test]
    fn test_hex_idempotence() {
        let bytes = sample();
        assert_eq!(from_hex(&to_hex(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_base64_known_value() {
        // Same as standard base64 when the length is a multiple of 3.
        assert_eq!(to_base64(b"Man"), "TWFu");
        // Otherwise the tail is zero-padded to a whole 6-bit group.
        assert_eq!(to_base64(b"Ma"), "TWE");
        assert_eq!(from_base64("TWE").unwrap(), b"Ma");
    }

    #[test]
    fn test_base64_idempotence() {
        for len in 0..16 {
            let bytes: Vec<u8> = sample().into_iter().cycle().take(len).collect();
            assert_eq!(from_base64(&to_base64(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_text_skips_line_breaks() {
        assert_eq!(from_hex("00\n0a\r\n").unwrap(), vec![0x00, 0x0A]);
        assert_eq!(from_base64("TW\nFu\n").unwrap(), b"Man");
    }

    #[test]
    fn test_invalid_symbols() {
        assert!(matches!(
            from_hex("0g"),
            Err(LzwError::Hex(hex::FromHexError::InvalidHexCharacter { c: 'g', .. }))
        ));
        assert!(matches!(from_hex("abc"), Err(LzwError::Hex(_))));
        assert!(matches!(from_base64("TW=u"), Err(LzwError::Base64(_))));

        let mut reader = Base64Text::new(&b"T-"[..]);
        assert_eq!(reader.take_group().unwrap(), Some(19));
        assert!(matches!(
            reader.take_group(),
            Err(LzwError::InvalidText {
                alphabet: "base64",
                symbol: b'-'
            })
        ));
    }

    /// Pack `bytes` as 8-bit codes through a group writer.
    fn pack<G: GroupWrite>(group: G, bytes: &[u8]) {
        let mut writer = BitCodeWriter::new(group);
        writer.set_code_width(8);
        for &byte in bytes {
            writer.write_code(u32::from(byte)).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_streaming_layers_match_helpers() {
        for len in 0..200 {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 97 + 13) as u8).collect();

            let mut hex_out = Vec::new();
            pack(HexText::new(&mut hex_out), &bytes);
            assert_eq!(String::from_utf8(hex_out).unwrap(), to_hex(&bytes));

            let mut base64_out = Vec::new();
            pack(Base64Text::new(&mut base64_out), &bytes);
            assert_eq!(String::from_utf8(base64_out).unwrap(), to_base64(&bytes));
        }
    }

    #[test]
    fn test_raw_group_roundtrip() {
        let mut out = Vec::new();
        {
            let mut raw = RawBytes::new(&mut out);
            raw.put_group(0x41).unwrap();
            raw.put_group(0x00).unwrap();
            raw.flush().unwrap();
        }
        assert_eq!(out, vec![0x41, 0x00]);

        let mut raw = RawBytes::new(out.as_slice());
        assert_eq!(raw.take_group().unwrap(), Some(0x41));
        assert_eq!(raw.take_group().unwrap(), Some(0x00));
        assert_eq!(raw.take_group().unwrap(), None);
    }
}
