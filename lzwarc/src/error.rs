//! LZW archive error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while compressing or decompressing an archive.
///
/// Running out of input in the middle of a code is *not* an error: code
/// sources report it as `Ok(None)` and the decoder stops gracefully.
#[derive(Debug, Error)]
pub enum LzwError {
    /// A code that is not present in the dictionary was referenced.
    #[error("Unknown LZW code {code} (dictionary holds {dictionary_len} entries)")]
    UnknownCode {
        /// The offending code.
        code: u32,
        /// Dictionary size at the time the code was read.
        dictionary_len: usize,
    },

    /// Code table is full.
    #[error("Code table full (max {max_codes} codes)")]
    TableFull {
        /// Maximum number of codes allowed at the current width.
        max_codes: u32,
    },

    /// Invalid bit width specified.
    #[error("Invalid bit width: {0} (must be 9-16)")]
    InvalidBitWidth(u8),

    /// An input file named for compression does not exist.
    #[error("Input file does not exist: {}", path.display())]
    MissingInputFile {
        /// The missing path.
        path: PathBuf,
    },

    /// A file name cannot be stored in the archive header.
    #[error("Invalid file name {name:?}: {reason}")]
    InvalidFileName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The archive header is malformed.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// A character outside the base64 alphabet was found.
    #[error("Invalid {alphabet} character: {symbol:#04x}")]
    InvalidText {
        /// Alphabet name.
        alphabet: &'static str,
        /// The offending input byte.
        symbol: u8,
    },

    /// Malformed hex text.
    #[error("Hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Malformed base64 text.
    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for LZW operations.
pub type Result<T> = std::result::Result<T, LzwError>;

impl LzwError {
    /// Create an unknown code error.
    pub fn unknown_code(code: u32, dictionary_len: usize) -> Self {
        Self::UnknownCode {
            code,
            dictionary_len,
        }
    }

    /// Create a missing input file error.
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInputFile { path: path.into() }
    }

    /// Create an invalid file name error.
    pub fn invalid_file_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFileName {
            name: name.into(),
            reason,
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LzwError::unknown_code(700, 300);
        assert!(err.to_string().contains("700"));

        let err = LzwError::missing_input("nope.txt");
        assert!(err.to_string().contains("nope.txt"));

        let err = LzwError::InvalidText {
            alphabet: "base64",
            symbol: b'-',
        };
        assert!(err.to_string().contains("base64"));

        let err: LzwError = hex::FromHexError::OddLength.into();
        assert!(err.to_string().contains("Hex"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LzwError = io_err.into();
        assert!(matches!(err, LzwError::Io(_)));
    }
}
