//! LZW decoder (decompression).
//!
//! The decoder mirrors the encoder's width bookkeeping code for code. It can
//! only register the entry for a code after the first byte of the next code
//! is known, so it keeps that insertion pending and tests fullness one entry
//! early while it does.

use crate::config::LzwConfig;
use crate::dictionary::LzwDictionary;
use crate::error::{LzwError, Result};
use crate::framer::EntrySink;
use crate::stream::CodeSource;
use log::{debug, warn};

/// LZW decoder for decompression.
#[derive(Debug)]
pub struct LzwDecoder {
    /// Dictionary for code lookup.
    dict: LzwDictionary,
    /// Resets forced by a full table at the width ceiling.
    resets: u64,
}

impl LzwDecoder {
    /// Create a new LZW decoder with the given configuration.
    pub fn new(config: LzwConfig) -> Result<Self> {
        let dict = LzwDictionary::new(config)?;
        Ok(Self { dict, resets: 0 })
    }

    /// Decode entries from `source` into `out`.
    ///
    /// Decoding ends once `out` has received one EOF sentinel per entry it
    /// expects; the trailing zero code and padding after that are never
    /// read. Running out of input earlier ends decoding quietly with the
    /// entries decoded so far.
    ///
    /// # Errors
    ///
    /// [`LzwError::UnknownCode`] when a code is neither in the dictionary
    /// nor the one entry the decoder is about to add.
    pub fn decode<S, O>(&mut self, source: &mut S, out: &mut O) -> Result<()>
    where
        S: CodeSource + ?Sized,
        O: EntrySink + ?Sized,
    {
        self.dict.reset_for_decompress();
        self.resets = 0;
        source.set_code_width(self.dict.current_bits());

        // String of the previous code while its entry is still pending.
        let mut pending: Option<Vec<u8>> = None;

        while !out.is_finished() {
            let Some(code) = source.read_code()? else {
                warn!(
                    "input ended before the last entry was complete ({} bit codes)",
                    self.dict.current_bits()
                );
                break;
            };

            if code == self.dict.eof_code() {
                out.end_entry()?;
                pending = None;
                continue;
            }

            let string = match (self.dict.get_string(code), &pending) {
                // Code exists in dictionary - this is the common case
                (Some(string), _) => string.to_vec(),
                // Special case: code not yet in dictionary (KwKwK). The
                // string is the previous string plus its own first byte.
                (None, Some(prev)) if code as usize == self.dict.len() => {
                    let mut string = prev.clone();
                    string.push(prev[0]);
                    string
                }
                (None, _) => return Err(LzwError::unknown_code(code, self.dict.len())),
            };

            out.write_all(&string)?;

            let full = if pending.is_some() {
                self.dict.is_full_lagged()
            } else {
                self.dict.is_full()
            };

            if full {
                if self.dict.advance_width() {
                    source.set_code_width(self.dict.current_bits());
                } else {
                    debug!(
                        "dictionary full at {} bits, resetting",
                        self.dict.current_bits()
                    );
                    self.dict.reset_for_decompress();
                    self.resets += 1;
                    source.set_code_width(self.dict.current_bits());
                    pending = None;
                    continue;
                }
            }

            if let Some(mut entry) = pending.take() {
                entry.push(string[0]);
                self.dict.add_string_decode(entry)?;
            }
            pending = Some(string);
        }

        Ok(())
    }

    /// Current code width.
    pub fn current_bits(&self) -> u8 {
        self.dict.current_bits()
    }

    /// Number of full-table resets during the last [`decode`](Self::decode).
    pub fn resets(&self) -> u64 {
        self.resets
    }
}
