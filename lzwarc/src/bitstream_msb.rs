//! MSB-first code packing.
//!
//! Codes are appended most significant bit first to a bit buffer that
//! persists across calls, and whole groups are handed to the transcoder as
//! soon as they complete. The width may change between codes without losing
//! buffered bits.

use crate::error::{LzwError, Result};
use crate::stream::{CodeSink, CodeSource};
use crate::transcode::{GroupRead, GroupWrite};

/// Largest supported code width.
const MAX_WIDTH: u8 = 16;

const NEWLINE: u8 = b'\n';

fn check_width(bits: u8) -> Result<()> {
    if bits == 0 || bits > MAX_WIDTH {
        return Err(LzwError::InvalidBitWidth(bits));
    }
    Ok(())
}

/// MSB-first code reader.
#[derive(Debug)]
pub struct BitCodeReader<G> {
    /// Group source.
    source: G,
    /// Bit buffer (MSB-first).
    buffer: u32,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Width of the next code.
    width: u8,
}

impl<G: GroupRead> BitCodeReader<G> {
    /// Create a reader with 8-bit codes; the codec sets the real width.
    pub fn new(source: G) -> Self {
        Self {
            source,
            buffer: 0,
            bits_in_buffer: 0,
            width: 8,
        }
    }

    /// Fill the buffer with at least `count` bits. Returns `false` if the
    /// source ran dry first.
    #[inline]
    fn fill_buffer(&mut self, count: u8) -> Result<bool> {
        while self.bits_in_buffer < count {
            match self.source.take_group()? {
                Some(group) => {
                    let mask = (1u32 << G::GROUP_BITS) - 1;
                    self.buffer = (self.buffer << G::GROUP_BITS) | (u32::from(group) & mask);
                    self.bits_in_buffer += G::GROUP_BITS;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Read `count` bits, or `None` if fewer remain.
    pub fn read_bits(&mut self, count: u8) -> Result<Option<u32>> {
        check_width(count)?;

        if !self.fill_buffer(count)? {
            return Ok(None);
        }

        let shift = self.bits_in_buffer - count;
        let value = (self.buffer >> shift) & ((1u32 << count) - 1);

        self.bits_in_buffer = shift;
        self.buffer &= (1u32 << shift) - 1;

        Ok(Some(value))
    }
}

impl<G: GroupRead> CodeSource for BitCodeReader<G> {
    fn begin_operation(&mut self) {}

    fn code_width(&self) -> u8 {
        self.width
    }

    fn set_code_width(&mut self, bits: u8) {
        self.width = bits;
    }

    fn read_code(&mut self) -> Result<Option<u32>> {
        self.read_bits(self.width)
    }

    fn read_header(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut line = Vec::new();

        loop {
            let Some(byte) = self.read_bits(8)? else {
                return Err(LzwError::invalid_header(
                    "stream ended before the header terminator",
                ));
            };
            let byte = byte as u8;

            if byte != NEWLINE {
                line.push(byte);
                continue;
            }
            if line.is_empty() {
                return Ok(names);
            }

            let name = String::from_utf8(std::mem::take(&mut line))
                .map_err(|_| LzwError::invalid_header("file name is not valid UTF-8"))?;
            names.push(name);
        }
    }
}

/// MSB-first code writer.
#[derive(Debug)]
pub struct BitCodeWriter<G> {
    /// Group sink.
    sink: G,
    /// Bit buffer (MSB-first).
    buffer: u32,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Width of the next code.
    width: u8,
}

impl<G: GroupWrite> BitCodeWriter<G> {
    /// Create a writer with 8-bit codes; the codec sets the real width.
    pub fn new(sink: G) -> Self {
        Self {
            sink,
            buffer: 0,
            bits_in_buffer: 0,
            width: 8,
        }
    }

    /// Write the low `count` bits of `value` (MSB-first).
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        check_width(count)?;

        self.buffer = (self.buffer << count) | (value & ((1u32 << count) - 1));
        self.bits_in_buffer += count;

        // Flush complete groups (from MSB side)
        while self.bits_in_buffer >= G::GROUP_BITS {
            self.bits_in_buffer -= G::GROUP_BITS;
            let group = (self.buffer >> self.bits_in_buffer) & ((1u32 << G::GROUP_BITS) - 1);
            self.sink.put_group(group as u8)?;
            self.buffer &= (1u32 << self.bits_in_buffer) - 1;
        }

        Ok(())
    }

    /// Pad the remaining bits with zeros to a whole group and flush.
    pub fn flush(&mut self) -> Result<()> {
        if self.bits_in_buffer > 0 {
            let remaining = G::GROUP_BITS - self.bits_in_buffer;
            let group = (self.buffer << remaining) & ((1u32 << G::GROUP_BITS) - 1);
            self.sink.put_group(group as u8)?;
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
        self.sink.flush()
    }
}

impl<G: GroupWrite> CodeSink for BitCodeWriter<G> {
    fn begin_operation(&mut self) {}

    fn code_width(&self) -> u8 {
        self.width
    }

    fn set_code_width(&mut self, bits: u8) {
        self.width = bits;
    }

    fn write_code(&mut self, code: u32) -> Result<()> {
        self.write_bits(code, self.width)
    }

    fn write_header(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            for &byte in name.as_bytes() {
                self.write_bits(u32::from(byte), 8)?;
            }
            self.write_bits(u32::from(NEWLINE), 8)?;
        }
        self.write_bits(u32::from(NEWLINE), 8)
    }

    fn finish(&mut self) -> Result<()> {
        self.flush()
    }
}
