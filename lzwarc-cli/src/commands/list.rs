//! List command implementation.

use lzwarc::{ArchiveOptions, list_entries};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    /// Name the entry is decompressed to.
    output_name: Option<String>,
}

impl EntryJson {
    fn from_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            output_name: Path::new(name)
                .file_name()
                .map(|base| base.to_string_lossy().into_owned()),
        }
    }
}

/// JSON output for archive listing.
#[derive(Debug, Serialize, Deserialize)]
struct ArchiveListJson {
    archive: String,
    variable_width: bool,
    code_bits: u8,
    encrypted: bool,
    text: String,
    entries: Vec<EntryJson>,
}

pub fn cmd_list(
    archive: &Path,
    options: &ArchiveOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let names = list_entries(archive, options)?;

    if json {
        let listing = ArchiveListJson {
            archive: archive.display().to_string(),
            variable_width: options.lzw.is_variable(),
            code_bits: options.lzw.min_bits,
            encrypted: options.key.is_some(),
            text: options.text.to_string(),
            entries: names.iter().map(|name| EntryJson::from_name(name)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Archive: {}", archive.display());
    println!();
    for name in &names {
        println!("  {}", name);
    }
    println!("{}", "-".repeat(40));
    println!("{} file(s)", names.len());

    Ok(())
}
