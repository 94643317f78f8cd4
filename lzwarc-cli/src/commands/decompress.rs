//! Decompress command implementation.

use crate::utils::create_progress_bar;
use indicatif::ProgressBar;
use lzwarc::{ArchiveOptions, EntrySink, FilesWriter, LzwError, Result, code_reader, framer};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Advances the progress bar as entries complete.
struct ProgressEntries<'a> {
    inner: FilesWriter,
    pb: &'a ProgressBar,
}

impl EntrySink for ProgressEntries<'_> {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)
    }

    fn end_entry(&mut self) -> Result<()> {
        self.inner.end_entry()?;
        self.pb.inc(1);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}

pub fn cmd_decompress(
    archive: &Path,
    output: &Path,
    options: &ArchiveOptions,
    progress: bool,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if !archive.is_file() {
        return Err(LzwError::missing_input(archive).into());
    }
    fs::create_dir_all(output)?;

    let mut source = code_reader(BufReader::new(File::open(archive)?), options);
    let names = framer::read_names(&mut source)?;
    let paths = framer::output_paths(&names, output)?;

    let pb = create_progress_bar(paths.len() as u64, progress);
    pb.set_message("files");

    let mut sink = ProgressEntries {
        inner: FilesWriter::new(paths.clone()),
        pb: &pb,
    };
    framer::read_entries(&mut source, options.lzw, &mut sink)?;
    pb.finish_with_message("Done");

    let completed = sink.inner.completed();
    if completed < paths.len() {
        println!(
            "Decompressed {} of {} file(s) into {} (archive truncated)",
            completed,
            paths.len(),
            output.display()
        );
    } else {
        println!(
            "Decompressed {} file(s) into {}",
            completed,
            output.display()
        );
    }

    Ok(())
}
