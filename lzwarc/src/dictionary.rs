//! LZW dictionary (code table) management.

use crate::config::LzwConfig;
use crate::error::{LzwError, Result};
use log::debug;
use std::collections::HashMap;

/// Number of single-byte entries present after every reset.
pub const BASE_ENTRIES: usize = 256;

/// LZW dictionary together with the active code width.
///
/// The compressor looks strings up through the reverse map, the
/// decompressor looks codes up through the table; each direction populates
/// only the side it needs. Resets clear the entries and return the width to
/// its minimum in one step.
#[derive(Debug)]
pub struct LzwDictionary {
    /// Code table: code -> byte sequence (decoding).
    table: Vec<Vec<u8>>,
    /// Reverse lookup: byte sequence -> code (encoding).
    reverse: HashMap<Vec<u8>, u32>,
    /// Configuration.
    config: LzwConfig,
    /// Current code bit width.
    current_bits: u8,
}

impl LzwDictionary {
    /// Create a new LZW dictionary with the given configuration.
    ///
    /// The dictionary is empty until one of the reset methods is called.
    pub fn new(config: LzwConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            table: Vec::new(),
            reverse: HashMap::new(),
            config,
            current_bits: config.min_bits,
        })
    }

    /// Reset to the 256 single-byte strings for compression.
    pub fn reset_for_compress(&mut self) {
        self.table.clear();
        self.reverse.clear();
        self.reverse
            .extend((0..BASE_ENTRIES).map(|i| (vec![i as u8], i as u32)));
        self.current_bits = self.config.min_bits;
    }

    /// Reset to the 256 single-byte strings for decompression.
    pub fn reset_for_decompress(&mut self) {
        self.reverse.clear();
        self.table.clear();
        self.table.extend((0..BASE_ENTRIES).map(|i| vec![i as u8]));
        self.current_bits = self.config.min_bits;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.table.len().max(self.reverse.len())
    }

    /// Whether the dictionary has no entries (only before the first reset).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry limit at the current width. The code `limit` itself is the EOF
    /// sentinel and is never assigned.
    pub fn limit(&self) -> u32 {
        LzwConfig::limit_for(self.current_bits)
    }

    /// EOF sentinel at the current width.
    pub fn eof_code(&self) -> u32 {
        self.limit()
    }

    /// Whether the table has reached the limit of the current width.
    ///
    /// This is the compressor's test, made right after emitting a code and
    /// before inserting the phrase that code ends.
    pub fn is_full(&self) -> bool {
        self.len() as u32 >= self.limit()
    }

    /// The decompressor's test, one entry earlier than [`is_full`].
    ///
    /// The decoder can only add the entry for a code once it has seen the
    /// first byte of the following code, so when that insertion is still
    /// pending its table is one entry behind the encoder's.
    ///
    /// [`is_full`]: Self::is_full
    pub fn is_full_lagged(&self) -> bool {
        self.len() as u32 + 1 >= self.limit()
    }

    /// Widen codes by one bit if below the ceiling.
    pub fn advance_width(&mut self) -> bool {
        if self.current_bits < self.config.max_bits {
            self.current_bits += 1;
            debug!("code width advanced to {} bits", self.current_bits);
            true
        } else {
            false
        }
    }

    /// Add a new string to the dictionary (for encoding).
    ///
    /// Returns the assigned code, or error if table is full.
    pub fn add_string(&mut self, string: Vec<u8>) -> Result<u32> {
        let code = self.reverse.len() as u32;
        if code >= self.limit() {
            return Err(LzwError::TableFull {
                max_codes: self.limit(),
            });
        }

        self.reverse.insert(string, code);
        Ok(code)
    }

    /// Add a string to the dictionary (for decoding).
    pub fn add_string_decode(&mut self, string: Vec<u8>) -> Result<u32> {
        let code = self.table.len() as u32;
        if code >= self.limit() {
            return Err(LzwError::TableFull {
                max_codes: self.limit(),
            });
        }

        self.table.push(string);
        Ok(code)
    }

    /// Get the byte sequence for a code.
    pub fn get_string(&self, code: u32) -> Option<&[u8]> {
        self.table.get(code as usize).map(|v| v.as_slice())
    }

    /// Find the code for a byte sequence (for encoding).
    pub fn find_code(&self, string: &[u8]) -> Option<u32> {
        self.reverse.get(string).copied()
    }

    /// Get the current bit width.
    pub fn current_bits(&self) -> u8 {
        self.current_bits
    }

    /// Get the configuration.
    pub fn config(&self) -> &LzwConfig {
        &self.config
    }
}
