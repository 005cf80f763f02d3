//! AMF0 error type.

use std::io;

use crate::Amf0Marker;

/// Result type.
pub type Result<T> = std::result::Result<T, Amf0Error>;

/// AMF0 error.
#[derive(thiserror::Error, Debug)]
pub enum Amf0Error {
    /// IO error other than a short read.
    #[error("io error: {0}")]
    Io(io::Error),
    /// A fixed-size or length-prefixed field ended before all of its bytes could be read.
    #[error("truncated input")]
    Truncated,
    /// The input ended cleanly at a value boundary.
    ///
    /// Also produced by the object-end marker in value position and by marker bytes
    /// that do not belong to AMF0.
    #[error("stream exhausted")]
    StreamExhausted,
    /// An empty property name was followed by something other than the object-end marker.
    #[error("invalid object-end-marker '{0}'")]
    InvalidObjectEnd(u8),
    /// Unexpected type.
    #[error("unexpected type: expected one of {expected:?}, got {got:?}")]
    UnexpectedType {
        /// The expected types.
        expected: &'static [Amf0Marker],
        /// The actual type.
        got: Amf0Marker,
    },
    /// A strict array declared a negative element count.
    #[error("invalid element count: {0}")]
    InvalidCount(i32),
    /// A declared length or count is above the configured limit.
    #[error("{what} too long: {len} exceeds limit {limit}")]
    TooLong {
        /// What was being decoded.
        what: &'static str,
        /// The declared length.
        len: u64,
        /// The configured limit.
        limit: u64,
    },
    /// Values are nested deeper than the configured limit.
    #[error("nesting deeper than {0} levels")]
    TooDeep(u32),
}

impl From<io::Error> for Amf0Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Amf0Error::Truncated
        } else {
            Amf0Error::Io(err)
        }
    }
}

impl Amf0Error {
    /// Returns `true` if the input ended cleanly at a value boundary.
    pub fn is_stream_exhausted(&self) -> bool {
        matches!(self, Amf0Error::StreamExhausted)
    }

    /// Returns `true` if a field was cut short.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Amf0Error::Truncated)
    }

    /// Returns `true` if the input is malformed.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Amf0Error::InvalidObjectEnd(_)
                | Amf0Error::UnexpectedType { .. }
                | Amf0Error::InvalidCount(_)
                | Amf0Error::TooLong { .. }
                | Amf0Error::TooDeep(_)
        )
    }
}
