//! lzwarc CLI - multi-file LZW archiver
//!
//! Packs files into one LZW stream with optional variable-width codes, a toy
//! stream cipher and hex/base64 text output.

mod commands;
mod utils;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lzwarc::{ArchiveOptions, LzwConfig, TextMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lzwarc")]
#[command(author, version, about = "Multi-file LZW archiver")]
#[command(long_about = "
lzwarc packs one or more files into a single LZW stream.
The same width, key and text options must be given to decompress.

Examples:
  lzwarc compress archive.lzw file1.txt file2.txt
  lzwarc compress -v -e 1234 -t base64 archive.txt notes.md
  lzwarc decompress archive.lzw -o restored
  lzwarc decompress -v -e 1234 -t base64 archive.txt
  lzwarc list archive.lzw --json
")]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress files into an archive
    #[command(alias = "c")]
    Compress {
        /// Output archive file
        archive: PathBuf,

        /// Files to add to the archive
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        codec: CodecArgs,

        /// Show progress bar
        #[arg(short = 'P', long, default_value = "true")]
        progress: bool,
    },

    /// Decompress every file of an archive
    #[command(alias = "d")]
    Decompress {
        /// Archive file to decompress
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,

        /// Show progress bar
        #[arg(short = 'P', long, default_value = "true")]
        progress: bool,
    },

    /// List the file names stored in an archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        #[command(flatten)]
        codec: CodecArgs,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

/// Options that must match between compression and decompression.
#[derive(Debug, Args)]
struct CodecArgs {
    /// Fixed code width in bits
    #[arg(short, long, default_value_t = 12, value_parser = clap::value_parser!(u8).range(9..=16))]
    width: u8,

    /// Variable-width codes growing from 9 to 16 bits (overrides --width)
    #[arg(short, long)]
    variable: bool,

    /// Cipher key; omit to disable the cipher
    #[arg(short, long, value_name = "KEY")]
    encrypt: Option<u64>,

    /// Text encoding of the archive
    #[arg(short, long, value_enum, default_value = "none")]
    text: TextArg,
}

/// Text encoding choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TextArg {
    /// Raw bytes
    None,
    /// Lowercase hex digits
    Hex,
    /// Base64 characters without padding
    Base64,
}

impl From<TextArg> for TextMode {
    fn from(arg: TextArg) -> Self {
        match arg {
            TextArg::None => TextMode::None,
            TextArg::Hex => TextMode::Hex,
            TextArg::Base64 => TextMode::Base64,
        }
    }
}

impl CodecArgs {
    fn options(&self) -> ArchiveOptions {
        let lzw = if self.variable {
            LzwConfig::VARIABLE
        } else {
            LzwConfig::fixed(self.width)
        };
        let options = ArchiveOptions::new()
            .with_lzw(lzw)
            .with_text(self.text.into());
        match self.encrypt {
            Some(key) => options.with_key(key),
            None => options,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    utils::init_logging(cli.quiet);

    let result = match cli.command {
        Commands::Compress {
            archive,
            files,
            codec,
            progress,
        } => commands::cmd_compress(&archive, &files, &codec.options(), progress),
        Commands::Decompress {
            archive,
            output,
            codec,
            progress,
        } => commands::cmd_decompress(&archive, &output, &codec.options(), progress),
        Commands::List {
            archive,
            codec,
            json,
        } => commands::cmd_list(&archive, &codec.options(), json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
