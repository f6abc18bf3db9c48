use serde::{de, ser};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while packing or unpacking XDR data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A numeric value does not fit the XDR width it is being packed into
    #[error("value {value} out of range for XDR {ty}")]
    Range { ty: &'static str, value: i128 },

    /// Structural mismatch: wrong fixed length, unmapped enum, bad list indicator
    #[error("conversion error: {0}")]
    Conversion(String),

    /// The decode needs more bytes than remain in the buffer
    #[error("buffer underflow: needed {needed} bytes, {remaining} remaining")]
    BufferUnderflow { needed: usize, remaining: usize },

    /// Decoding finished with unconsumed bytes (advisory)
    #[error("unextracted data remains: {0} bytes")]
    TrailingData(usize),

    /// A cursor position outside the buffer
    #[error("position {position} outside buffer of length {len}")]
    InvalidPosition { position: usize, len: usize },

    /// A declared length or count exceeded the configured limit
    #[error("length exceeded: {found} > {max}")]
    LengthExceeded { found: usize, max: usize },

    /// XDR has no encoding for this serde data model type
    #[error("XDR does not support type: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// True for conditions a caller may choose to treat as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::TrailingData(_))
    }

    pub(crate) fn conversion(msg: impl fmt::Display) -> Self {
        Error::Conversion(msg.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::conversion(msg)
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::conversion(msg)
    }
}
