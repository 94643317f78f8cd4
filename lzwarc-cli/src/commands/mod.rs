//! Command implementations for the lzwarc CLI.

pub mod compress;
pub mod decompress;
pub mod list;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use list::cmd_list;
