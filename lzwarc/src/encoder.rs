//! LZW encoder (compression).

use crate::config::LzwConfig;
use crate::dictionary::LzwDictionary;
use crate::error::Result;
use crate::stream::CodeSink;
use log::debug;
use std::io::Read;

/// LZW encoder for compression.
///
/// One encoder drives a whole multi-entry pass: the dictionary carries over
/// from one entry to the next, and every entry is closed by the EOF
/// sentinel of the width active at that point.
#[derive(Debug)]
pub struct LzwEncoder {
    /// Dictionary for string lookup.
    dict: LzwDictionary,
    /// Resets forced by a full table at the width ceiling.
    resets: u64,
    /// Widest code width used so far.
    peak_bits: u8,
}

impl LzwEncoder {
    /// Create a new LZW encoder with the given configuration.
    pub fn new(config: LzwConfig) -> Result<Self> {
        let dict = LzwDictionary::new(config)?;
        Ok(Self {
            dict,
            resets: 0,
            peak_bits: config.min_bits,
        })
    }

    /// Reset the dictionary and announce the starting width to `sink`.
    pub fn begin<S: CodeSink + ?Sized>(&mut self, sink: &mut S) {
        self.dict.reset_for_compress();
        self.resets = 0;
        self.peak_bits = self.dict.current_bits();
        sink.set_code_width(self.dict.current_bits());
    }

    /// Encode one entry, terminated by the EOF sentinel.
    ///
    /// # Algorithm
    ///
    /// 1. Build the longest string `S` found in the dictionary
    /// 2. On the first byte `C` with `S+C` unknown, output the code for `S`
    /// 3. Add `S+C` (widening or resetting the table when it is full)
    /// 4. Restart from `C`
    /// 5. At end of input, output the code for `S`, then the EOF sentinel
    ///
    /// Returns the number of input bytes consumed.
    pub fn encode_entry<R: Read, S: CodeSink + ?Sized>(
        &mut self,
        input: R,
        sink: &mut S,
    ) -> Result<u64> {
        let mut bytes = input.bytes();

        let Some(first) = bytes.next().transpose()? else {
            // Empty entry: just the sentinel
            sink.write_code(self.dict.eof_code())?;
            return Ok(0);
        };

        let mut consumed = 1u64;
        let mut current = vec![first];
        let mut current_code = u32::from(first);

        for byte in bytes {
            let byte = byte?;
            consumed += 1;

            current.push(byte);
            if let Some(code) = self.dict.find_code(&current) {
                // String exists in dictionary - continue building
                current_code = code;
                continue;
            }

            // `current` now holds S+C; S is already known by its code
            sink.write_code(current_code)?;
            self.update_table(sink, Some(current))?;

            current = vec![byte];
            current_code = u32::from(byte);
        }

        sink.write_code(current_code)?;
        // Same width bookkeeping as inside the loop so the decoder, which
        // cannot tell the last code of an entry apart, stays in step.
        self.update_table(sink, None)?;
        sink.write_code(self.dict.eof_code())?;

        Ok(consumed)
    }

    /// Write the trailing zero code and flush the stream.
    pub fn finish<S: CodeSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        sink.write_code(0)?;
        sink.finish()
    }

    /// Post-emission step: grow or reset a full table, then register
    /// `phrase` unless the table was just reset.
    fn update_table<S: CodeSink + ?Sized>(
        &mut self,
        sink: &mut S,
        phrase: Option<Vec<u8>>,
    ) -> Result<()> {
        if self.dict.is_full() {
            if self.dict.advance_width() {
                self.peak_bits = self.peak_bits.max(self.dict.current_bits());
                sink.set_code_width(self.dict.current_bits());
            } else {
                debug!(
                    "dictionary full at {} bits, resetting",
                    self.dict.current_bits()
                );
                self.dict.reset_for_compress();
                self.resets += 1;
                sink.set_code_width(self.dict.current_bits());
                return Ok(());
            }
        }

        if let Some(phrase) = phrase {
            self.dict.add_string(phrase)?;
        }
        Ok(())
    }

    /// Current code width.
    pub fn current_bits(&self) -> u8 {
        self.dict.current_bits()
    }

    /// Widest code width used since [`begin`](Self::begin).
    pub fn peak_bits(&self) -> u8 {
        self.peak_bits
    }

    /// Number of full-table resets since [`begin`](Self::begin).
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// The dictionary.
    pub fn dictionary(&self) -> &LzwDictionary {
        &self.dict
    }
}
