//! Codec configuration: code widths, cipher key and text mode.

use crate::error::{LzwError, Result};
use std::fmt;
use std::str::FromStr;

/// Smallest width a variable-width stream starts at.
pub const MIN_CODE_BITS: u8 = 9;
/// Largest width any stream may use.
pub const MAX_CODE_BITS: u8 = 16;

/// LZW code width parameters.
///
/// A fixed-width stream has `min_bits == max_bits`; a variable-width stream
/// starts at `min_bits` and widens one bit at a time up to `max_bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwConfig {
    /// Width used right after a dictionary reset.
    pub min_bits: u8,
    /// Ceiling; reaching it with a full table triggers a reset.
    pub max_bits: u8,
}

impl LzwConfig {
    /// Fixed 12-bit codes (the default).
    pub const FIXED: Self = Self {
        min_bits: 12,
        max_bits: 12,
    };

    /// Variable-width codes growing from 9 to 16 bits.
    pub const VARIABLE: Self = Self {
        min_bits: MIN_CODE_BITS,
        max_bits: MAX_CODE_BITS,
    };

    /// Create a configuration with the given bounds.
    pub fn new(min_bits: u8, max_bits: u8) -> Self {
        Self { min_bits, max_bits }
    }

    /// Fixed-width codes of `bits` bits.
    pub fn fixed(bits: u8) -> Self {
        Self::new(bits, bits)
    }

    /// Whether the width may change during a pass.
    pub fn is_variable(&self) -> bool {
        self.min_bits < self.max_bits
    }

    /// Check the width bounds.
    pub fn validate(&self) -> Result<()> {
        if self.min_bits < MIN_CODE_BITS || self.min_bits > MAX_CODE_BITS {
            return Err(LzwError::InvalidBitWidth(self.min_bits));
        }
        if self.max_bits < self.min_bits || self.max_bits > MAX_CODE_BITS {
            return Err(LzwError::InvalidBitWidth(self.max_bits));
        }
        Ok(())
    }

    /// Dictionary limit for `bits`: every code except the EOF sentinel.
    pub fn limit_for(bits: u8) -> u32 {
        (1u32 << bits) - 1
    }
}

impl Default for LzwConfig {
    fn default() -> Self {
        Self::FIXED
    }
}

/// Binary-to-text encoding applied to the packed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Raw bytes.
    #[default]
    None,
    /// Two lowercase hex digits per byte.
    Hex,
    /// One base64 character per 6-bit group, no padding.
    Base64,
}

impl TextMode {
    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hex => "hex",
            Self::Base64 => "base64",
        }
    }
}

impl fmt::Display for TextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            other => Err(format!("unknown text mode: {other}")),
        }
    }
}

/// Everything a compress or decompress pass needs to agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveOptions {
    /// Code width parameters.
    pub lzw: LzwConfig,
    /// Cipher key; `None` disables the cipher.
    pub key: Option<u64>,
    /// Text transcoding.
    pub text: TextMode,
}

impl ArchiveOptions {
    /// Default options: fixed 12-bit codes, no cipher, raw bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given width parameters.
    pub fn with_lzw(mut self, lzw: LzwConfig) -> Self {
        self.lzw = lzw;
        self
    }

    /// Switch to variable-width codes (9..16 bits).
    pub fn with_variable_width(self) -> Self {
        self.with_lzw(LzwConfig::VARIABLE)
    }

    /// Enable the stream cipher.
    pub fn with_key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }

    /// Select the text encoding.
    pub fn with_text(mut self, text: TextMode) -> Self {
        self.text = text;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_config() {
        let config = LzwConfig::FIXED;
        assert_eq!(config.min_bits, 12);
        assert_eq!(config.max_bits, 12);
        assert!(!config.is_variable());
        assert_eq!(LzwConfig::limit_for(12), 4095);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_variable_config() {
        let config = LzwConfig::VARIABLE;
        assert_eq!(config.min_bits, 9);
        assert_eq!(config.max_bits, 16);
        assert!(config.is_variable());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_widths() {
        assert!(matches!(
            LzwConfig::fixed(8).validate(),
            Err(LzwError::InvalidBitWidth(8))
        ));
        assert!(matches!(
            LzwConfig::fixed(17).validate(),
            Err(LzwError::InvalidBitWidth(17))
        ));
        assert!(LzwConfig::new(12, 10).validate().is_err());
    }

    #[test]
    fn test_text_mode_parse() {
        assert_eq!("hex".parse::<TextMode>().unwrap(), TextMode::Hex);
        assert_eq!("Base64".parse::<TextMode>().unwrap(), TextMode::Base64);
        assert_eq!("none".parse::<TextMode>().unwrap(), TextMode::None);
        assert!("rot13".parse::<TextMode>().is_err());
        assert_eq!(TextMode::Base64.to_string(), "base64");
    }

    #[test]
    fn test_options_builder() {
        let options = ArchiveOptions::new()
            .with_variable_width()
            .with_key(42)
            .with_text(TextMode::Hex);
        assert_eq!(options.lzw, LzwConfig::VARIABLE);
        assert_eq!(options.key, Some(42));
        assert_eq!(options.text, TextMode::Hex);
        assert_eq!(ArchiveOptions::default().lzw, LzwConfig::FIXED);
    }
}
