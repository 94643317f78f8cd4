//! Multi-file framing.
//!
//! An archive starts with a header naming its entries, one per line, closed
//! by an empty line. The LZW payload follows: every entry ends with the EOF
//! sentinel, and a single zero code closes the stream. The dictionary is
//! shared by all entries of one archive.

use crate::config::LzwConfig;
use crate::decoder::LzwDecoder;
use crate::encoder::LzwEncoder;
use crate::error::{LzwError, Result};
use crate::stream::{CodeSink, CodeSource};
use log::{info, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Receives decoded bytes entry by entry.
pub trait EntrySink {
    /// Append bytes to the current entry.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Close the current entry and move to the next.
    fn end_entry(&mut self) -> Result<()>;

    /// Whether every expected entry has been closed.
    fn is_finished(&self) -> bool;

    /// Release resources once decoding stops, complete or not.
    fn close(&mut self) -> Result<()>;
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct MemoryEntries {
    names: Vec<String>,
    entries: Vec<Vec<u8>>,
    current: Vec<u8>,
    started: bool,
}

impl MemoryEntries {
    /// Expect one entry per name.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// Names paired with their decoded contents.
    ///
    /// A truncated archive yields the entries completed so far, plus the
    /// partial one if it received any bytes.
    pub fn into_entries(mut self) -> Vec<(String, Vec<u8>)> {
        if self.started {
            self.entries.push(std::mem::take(&mut self.current));
        }
        self.names.into_iter().zip(self.entries).collect()
    }
}

impl EntrySink for MemoryEntries {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.started = true;
        self.current.extend_from_slice(data);
        Ok(())
    }

    fn end_entry(&mut self) -> Result<()> {
        self.entries.push(std::mem::take(&mut self.current));
        self.started = false;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.entries.len() >= self.names.len()
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes each entry to its own file, opened on first use.
#[derive(Debug)]
pub struct FilesWriter {
    paths: Vec<PathBuf>,
    index: usize,
    current: Option<BufWriter<File>>,
}

impl FilesWriter {
    /// Write entries to `paths`, in order.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            index: 0,
            current: None,
        }
    }

    /// Number of entries closed so far.
    pub fn completed(&self) -> usize {
        self.index
    }

    fn current_file(&mut self) -> Result<&mut BufWriter<File>> {
        let file = match self.current.take() {
            Some(file) => file,
            None => {
                let path = self
                    .paths
                    .get(self.index)
                    .ok_or_else(|| LzwError::invalid_header("more entries than header names"))?;
                info!("Decompressing {}", path.display());
                BufWriter::new(File::create(path)?)
            }
        };
        Ok(self.current.insert(file))
    }
}

impl EntrySink for FilesWriter {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.current_file()?.write_all(data)?;
        Ok(())
    }

    fn end_entry(&mut self) -> Result<()> {
        // Empty entries still produce an (empty) file.
        self.current_file()?.flush()?;
        self.current = None;
        self.index += 1;
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.index >= self.paths.len()
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.current.take() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Check that `name` can be stored in the header.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LzwError::invalid_file_name(name, "is empty"));
    }
    if name.contains('\n') {
        return Err(LzwError::invalid_file_name(name, "contains a line feed"));
    }
    Ok(())
}

/// Header name for an input path: the path as given, as UTF-8.
pub fn entry_name(path: &Path) -> Result<String> {
    let name = path
        .to_str()
        .ok_or_else(|| {
            LzwError::invalid_file_name(path.to_string_lossy(), "is not valid UTF-8")
        })?;
    validate_name(name)?;
    Ok(name.to_string())
}

/// Output location of each entry: its base name under `dir`.
pub fn output_paths(names: &[String], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|name| {
            let base = Path::new(name)
                .file_name()
                .ok_or_else(|| LzwError::invalid_file_name(name.as_str(), "has no file name"))?;
            if !seen.insert(base.to_owned()) {
                warn!("{} appears more than once; later entries overwrite it", name);
            }
            Ok(dir.join(base))
        })
        .collect()
}

/// Write a complete archive to `sink`.
///
/// `open` supplies the contents of entry `i`; inputs are opened one at a
/// time, in header order.
pub fn write_archive<S, R, F>(
    sink: &mut S,
    lzw: LzwConfig,
    names: &[String],
    mut open: F,
) -> Result<()>
where
    S: CodeSink + ?Sized,
    R: Read,
    F: FnMut(usize) -> Result<R>,
{
    for name in names {
        validate_name(name)?;
    }
    let mut encoder = LzwEncoder::new(lzw)?;

    sink.begin_operation();
    sink.write_header(names)?;
    encoder.begin(sink);

    for (i, name) in names.iter().enumerate() {
        let input = open(i)?;
        let consumed = encoder.encode_entry(input, sink)?;
        info!("Compressed {} ({} bytes)", name, consumed);
    }

    encoder.finish(sink)?;
    info!(
        "Archive complete: {} entries, peak width {} bits, {} resets",
        names.len(),
        encoder.peak_bits(),
        encoder.resets()
    );
    Ok(())
}

/// Start reading an archive: reseed the layers and read the header.
pub fn read_names<S: CodeSource + ?Sized>(source: &mut S) -> Result<Vec<String>> {
    source.begin_operation();
    source.read_header()
}

/// Decode the payload that follows the header into `out`.
pub fn read_entries<S, O>(source: &mut S, lzw: LzwConfig, out: &mut O) -> Result<()>
where
    S: CodeSource + ?Sized,
    O: EntrySink + ?Sized,
{
    let mut decoder = LzwDecoder::new(lzw)?;
    let decoded = decoder.decode(source, out);
    // Keep whatever was written even when decoding failed.
    out.close()?;
    decoded
}
