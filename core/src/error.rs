//! Error types for table decoding and configuration I/O.

use std::io;

/// Failure while decoding one of the binary table formats.
///
/// Only `Io` and `Truncated` ever abort a load. `InvalidOffset` and
/// `UnsupportedEncoding` come out of the strict glyph helpers; the tables
/// recover from them locally when resolving candidate text.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("truncated input at byte {offset}: {needed} more bytes required")]
    Truncated { offset: usize, needed: usize },

    #[error("phrase offset {offset} outside phrase area of {len} bytes")]
    InvalidOffset { offset: usize, len: usize },

    #[error("glyph bytes are not valid UTF-8: {0:02x?}")]
    UnsupportedEncoding(Vec<u8>),
}

/// Failure while reading or writing a TOML configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
