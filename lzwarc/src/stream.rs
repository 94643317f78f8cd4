//! Layered code streams.
//!
//! A compressed archive is produced by a stack of layers, each wrapping the
//! next one:
//!
//! ```text
//! codec ─► CipherWriter (optional) ─► BitCodeWriter<transcoder> ─► io::Write
//! codec ◄─ CipherReader (optional) ◄─ BitCodeReader<transcoder> ◄─ io::Read
//! ```
//!
//! Every layer speaks the same two traits, so the codec never knows which
//! transforms are active.

use crate::bitstream_msb::{BitCodeReader, BitCodeWriter};
use crate::cipher::{CipherReader, CipherWriter};
use crate::config::{ArchiveOptions, TextMode};
use crate::error::Result;
use crate::transcode::{Base64Text, HexText, RawBytes};
use std::io::{Read, Write};

/// Destination for LZW codes and the archive header.
pub trait CodeSink {
    /// Start a compress operation. Layers with per-operation state (the
    /// cipher's PRNG) reset it here; the call must be made exactly once,
    /// before the header is written.
    fn begin_operation(&mut self);

    /// Width in bits of subsequent codes.
    fn code_width(&self) -> u8;

    /// Change the width of subsequent codes.
    fn set_code_width(&mut self, bits: u8);

    /// Append one code at the current width.
    fn write_code(&mut self, code: u32) -> Result<()>;

    /// Write the newline-delimited file name header.
    fn write_header(&mut self, names: &[String]) -> Result<()>;

    /// Pad the final partial group and flush everything below.
    fn finish(&mut self) -> Result<()>;
}

/// Source of LZW codes and the archive header.
pub trait CodeSource {
    /// Start a decompress operation; see [`CodeSink::begin_operation`].
    fn begin_operation(&mut self);

    /// Width in bits of subsequent codes.
    fn code_width(&self) -> u8;

    /// Change the width of subsequent codes.
    fn set_code_width(&mut self, bits: u8);

    /// Read one code at the current width, or `None` once the input cannot
    /// supply a whole code.
    fn read_code(&mut self) -> Result<Option<u32>>;

    /// Read the file name header.
    fn read_header(&mut self) -> Result<Vec<String>>;
}

impl<S: CodeSink + ?Sized> CodeSink for Box<S> {
    fn begin_operation(&mut self) {
        (**self).begin_operation()
    }

    fn code_width(&self) -> u8 {
        (**self).code_width()
    }

    fn set_code_width(&mut self, bits: u8) {
        (**self).set_code_width(bits)
    }

    fn write_code(&mut self, code: u32) -> Result<()> {
        (**self).write_code(code)
    }

    fn write_header(&mut self, names: &[String]) -> Result<()> {
        (**self).write_header(names)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: CodeSource + ?Sized> CodeSource for Box<S> {
    fn begin_operation(&mut self) {
        (**self).begin_operation()
    }

    fn code_width(&self) -> u8 {
        (**self).code_width()
    }

    fn set_code_width(&mut self, bits: u8) {
        (**self).set_code_width(bits)
    }

    fn read_code(&mut self) -> Result<Option<u32>> {
        (**self).read_code()
    }

    fn read_header(&mut self) -> Result<Vec<String>> {
        (**self).read_header()
    }
}

/// Build the compress-side layer stack over `out` for `options`.
pub fn code_writer<'a, W: Write + 'a>(
    out: W,
    options: &ArchiveOptions,
) -> Box<dyn CodeSink + 'a> {
    let packer: Box<dyn CodeSink + 'a> = match options.text {
        TextMode::None => Box::new(BitCodeWriter::new(RawBytes::new(out))),
        TextMode::Hex => Box::new(BitCodeWriter::new(HexText::new(out))),
        TextMode::Base64 => Box::new(BitCodeWriter::new(Base64Text::new(out))),
    };
    match options.key {
        Some(key) => Box::new(CipherWriter::new(packer, key)),
        None => packer,
    }
}

/// Build the decompress-side layer stack over `input` for `options`.
pub fn code_reader<'a, R: Read + 'a>(
    input: R,
    options: &ArchiveOptions,
) -> Box<dyn CodeSource + 'a> {
    let unpacker: Box<dyn CodeSource + 'a> = match options.text {
        TextMode::None => Box::new(BitCodeReader::new(RawBytes::new(input))),
        TextMode::Hex => Box::new(BitCodeReader::new(HexText::new(input))),
        TextMode::Base64 => Box::new(BitCodeReader::new(Base64Text::new(input))),
    };
    match options.key {
        Some(key) => Box::new(CipherReader::new(unpacker, key)),
        None => unpacker,
    }
}
