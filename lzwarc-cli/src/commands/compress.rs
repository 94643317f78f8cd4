//! Compress command implementation.

use crate::utils::{create_progress_bar, format_size};
use lzwarc::{ArchiveOptions, LzwError, code_writer, framer};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub fn cmd_compress(
    archive: &Path,
    files: &[PathBuf],
    options: &ArchiveOptions,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Every input must exist before the archive is created
    let mut names = Vec::with_capacity(files.len());
    let mut total_size = 0u64;
    for file in files {
        if !file.is_file() {
            return Err(LzwError::missing_input(file).into());
        }
        names.push(framer::entry_name(file)?);
        total_size += fs::metadata(file)?.len();
    }

    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let pb = create_progress_bar(files.len() as u64, progress);
    pb.set_message("files");

    let output = BufWriter::new(File::create(archive)?);
    let mut sink = code_writer(output, options);
    framer::write_archive(&mut sink, options.lzw, &names, |i| {
        pb.set_position(i as u64);
        Ok(BufReader::new(File::open(&files[i])?))
    })?;
    drop(sink);

    pb.set_position(files.len() as u64);
    pb.finish_with_message("Done");

    let archive_size = fs::metadata(archive)?.len();
    println!(
        "Compressed {} file(s): {} -> {} ({})",
        files.len(),
        format_size(total_size),
        format_size(archive_size),
        archive.display()
    );

    Ok(())
}
