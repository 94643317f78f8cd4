//! # lzwarc: Pure Rust Multi-File LZW Archives
//!
//! This crate packs one or more files into a single LZW stream, with an
//! optional toy stream cipher and an optional hex or base64 text encoding.
//!
//! ## Features
//!
//! - **Pure Rust**: No C dependencies, 100% safe Rust
//! - **Fixed or variable width**: 12-bit codes, or 9 to 16 bits growing as
//!   the dictionary fills
//! - **Multi-file**: a newline-delimited name header, one EOF sentinel per
//!   file, one dictionary shared across files
//! - **Layered transforms**: cipher, then bit packing, then text encoding
//!
//! ## Stream Format
//!
//! - **MSB-first bit order**: codes are packed from most significant bit
//! - **Header**: each name followed by `\n`, then an empty line, written as
//!   8-bit codes through the same packer as the payload
//! - **EOF sentinel**: `2^W - 1` at the width `W` active when a file ends
//! - **Reset**: a full table at the widest width restarts from 256 entries
//!   at the narrowest width; no reset code is written
//! - **Trailer**: a single zero code, then zero padding to a whole group
//!
//! ## Example
//!
//! ```rust
//! use lzwarc::{ArchiveOptions, TextMode, compress, decompress};
//!
//! let original = b"TOBEORNOTTOBEORTOBEORNOT";
//! let options = ArchiveOptions::new()
//!     .with_variable_width()
//!     .with_key(42)
//!     .with_text(TextMode::Base64);
//!
//! let compressed = compress(original, &options).unwrap();
//! let decompressed = decompress(&compressed, &options).unwrap();
//!
//! assert_eq!(decompressed, original);
//! ```
//!
//! ## Multiple Entries
//!
//! ```rust
//! use lzwarc::{ArchiveOptions, compress_entries, decompress_entries};
//!
//! let options = ArchiveOptions::new();
//! let archive = compress_entries(&[("a.txt", &b"hello"[..]), ("b.txt", &b""[..])], &options).unwrap();
//!
//! let entries = decompress_entries(&archive, &options).unwrap();
//! assert_eq!(entries[0], ("a.txt".to_string(), b"hello".to_vec()));
//! assert_eq!(entries[1], ("b.txt".to_string(), Vec::new()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bitstream_msb;
pub mod cipher;
mod config;
mod decoder;
mod dictionary;
mod encoder;
mod error;
pub mod framer;
pub mod stream;
pub mod transcode;

pub use config::{ArchiveOptions, LzwConfig, MAX_CODE_BITS, MIN_CODE_BITS, TextMode};
pub use decoder::LzwDecoder;
pub use dictionary::LzwDictionary;
pub use encoder::LzwEncoder;
pub use error::{LzwError, Result};
pub use framer::{EntrySink, FilesWriter, MemoryEntries};
pub use stream::{CodeSink, CodeSource, code_reader, code_writer};
pub use transcode::{from_base64, from_hex, to_base64, to_hex};

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Name given to the single entry of [`compress`].
pub const SINGLE_ENTRY_NAME: &str = "data";

/// Compress data into a single-entry archive.
///
/// # Example
///
/// ```rust
/// use lzwarc::{compress, ArchiveOptions};
///
/// let data = b"TOBEORNOTTOBEORTOBEORNOT".repeat(8);
/// let compressed = compress(&data, &ArchiveOptions::new()).unwrap();
/// assert!(compressed.len() < data.len());
/// ```
pub fn compress(data: &[u8], options: &ArchiveOptions) -> Result<Vec<u8>> {
    compress_entries(&[(SINGLE_ENTRY_NAME, data)], options)
}

/// Decompress the first entry of an archive.
///
/// # Errors
///
/// [`LzwError::InvalidHeader`] if the archive names no entries.
pub fn decompress(data: &[u8], options: &ArchiveOptions) -> Result<Vec<u8>> {
    decompress_entries(data, options)?
        .into_iter()
        .next()
        .map(|(_, contents)| contents)
        .ok_or_else(|| LzwError::invalid_header("archive has no entries"))
}

/// Compress named in-memory entries into one archive.
pub fn compress_entries<N, D>(entries: &[(N, D)], options: &ArchiveOptions) -> Result<Vec<u8>>
where
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let names: Vec<String> = entries
        .iter()
        .map(|(name, _)| name.as_ref().to_string())
        .collect();

    let mut out = Vec::new();
    {
        let mut sink = code_writer(&mut out, options);
        framer::write_archive(&mut sink, options.lzw, &names, |i| {
            Ok(entries[i].1.as_ref())
        })?;
    }
    Ok(out)
}

/// Decompress every entry of an archive held in memory.
pub fn decompress_entries(
    data: &[u8],
    options: &ArchiveOptions,
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut source = code_reader(data, options);
    let names = framer::read_names(&mut source)?;

    let mut out = MemoryEntries::new(names);
    framer::read_entries(&mut source, options.lzw, &mut out)?;
    Ok(out.into_entries())
}

/// Compress `inputs` into the archive file `output`.
///
/// Every input is checked before the archive is created, so a missing
/// input leaves no partial archive behind.
///
/// # Errors
///
/// [`LzwError::MissingInputFile`] for the first input that does not exist,
/// [`LzwError::InvalidFileName`] for a path that cannot go in the header.
pub fn compress_files<P: AsRef<Path>>(
    inputs: &[P],
    output: &Path,
    options: &ArchiveOptions,
) -> Result<()> {
    let mut names = Vec::with_capacity(inputs.len());
    for input in inputs {
        let input = input.as_ref();
        if !input.is_file() {
            return Err(LzwError::missing_input(input));
        }
        names.push(framer::entry_name(input)?);
    }

    let file = BufWriter::new(File::create(output)?);
    let mut sink = code_writer(file, options);
    framer::write_archive(&mut sink, options.lzw, &names, |i| {
        Ok(BufReader::new(File::open(inputs[i].as_ref())?))
    })
}

/// Decompress the archive file `archive` into `output_dir`.
///
/// Each entry is written under its base name; the directory must exist.
/// Returns the output path of every entry decoded in full. A truncated
/// archive may also leave a partial file for the entry it ended in, which
/// is not listed.
pub fn decompress_file(
    archive: &Path,
    output_dir: &Path,
    options: &ArchiveOptions,
) -> Result<Vec<PathBuf>> {
    let mut source = code_reader(BufReader::new(File::open(archive)?), options);
    let names = framer::read_names(&mut source)?;
    let mut paths = framer::output_paths(&names, output_dir)?;

    let mut out = FilesWriter::new(paths.clone());
    framer::read_entries(&mut source, options.lzw, &mut out)?;

    let written = out.completed();
    if written < paths.len() {
        log::warn!("archive ended after {} of {} entries", written, paths.len());
        paths.truncate(written);
    }
    Ok(paths)
}

/// Names stored in the header of the archive file `archive`.
///
/// With a cipher key, the names only come out right with the key used for
/// compression.
pub fn list_entries(archive: &Path, options: &ArchiveOptions) -> Result<Vec<String>> {
    let mut source = code_reader(BufReader::new(File::open(archive)?), options);
    framer::read_names(&mut source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_options() -> Vec<ArchiveOptions> {
        let mut options = Vec::new();
        for lzw in [LzwConfig::FIXED, LzwConfig::VARIABLE] {
            for key in [None, Some(20240601)] {
                for text in [TextMode::None, TextMode::Hex, TextMode::Base64] {
                    options.push(ArchiveOptions { lzw, key, text });
                }
            }
        }
        options
    }

    #[test]
    fn test_roundtrip_all_options() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        for options in all_options() {
            let compressed = compress(original, &options).unwrap();
            let decompressed = decompress(&compressed, &options).unwrap();
            assert_eq!(decompressed, original, "{options:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        for options in all_options() {
            let compressed = compress(b"", &options).unwrap();
            assert_eq!(decompress(&compressed, &options).unwrap(), b"");
        }
    }

    #[test]
    fn test_single_byte() {
        for options in all_options() {
            let compressed = compress(b"A", &options).unwrap();
            assert_eq!(decompress(&compressed, &options).unwrap(), b"A");
        }
    }

    #[test]
    fn test_repeating_pattern() {
        let original = vec![b'X'; 1000];
        let compressed = compress(&original, &ArchiveOptions::new()).unwrap();

        // Highly repetitive - should compress well
        assert!(compressed.len() < original.len() / 2);
        assert_eq!(decompress(&compressed, &ArchiveOptions::new()).unwrap(), original);
    }

    #[test]
    fn test_all_byte_values() {
        let original: Vec<u8> = (0..=255).collect();
        for options in all_options() {
            let compressed = compress(&original, &options).unwrap();
            assert_eq!(decompress(&compressed, &options).unwrap(), original);
        }
    }

    #[test]
    fn test_raw_layout() {
        // Header "data\n\n" as bytes, then the first 12-bit code (65).
        let compressed = compress(b"AAAAAAAAAA", &ArchiveOptions::new()).unwrap();
        assert_eq!(&compressed[..6], b"data\n\n");
        assert_eq!(compressed[6], 0x04);
        assert_eq!(compressed[7] >> 4, 0x1);
    }

    #[test]
    fn test_text_output_alphabets() {
        let data = b"hello hello hello";

        let hex = compress(data, &ArchiveOptions::new().with_text(TextMode::Hex)).unwrap();
        assert!(hex.iter().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));

        let base64 = compress(data, &ArchiveOptions::new().with_text(TextMode::Base64)).unwrap();
        assert!(base64.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/'));
    }

    #[test]
    fn test_no_entries() {
        let options = ArchiveOptions::new();
        let archive = compress_entries::<&str, &[u8]>(&[], &options).unwrap();
        assert!(decompress_entries(&archive, &options).unwrap().is_empty());
        assert!(matches!(
            decompress(&archive, &options),
            Err(LzwError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_invalid_entry_name() {
        let result = compress_entries(&[("bad\nname", b"x")], &ArchiveOptions::new());
        assert!(matches!(result, Err(LzwError::InvalidFileName { .. })));
    }
}
