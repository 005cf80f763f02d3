//! Error types.

use std::io;

use flvprobe_amf0::Amf0Error;

/// Error type for FLV processing.
#[derive(Debug, thiserror::Error)]
pub enum FlvError {
    /// IO error other than a short read.
    #[error("io: {0}")]
    Io(io::Error),
    /// A header field ended before all of its bytes could be read.
    #[error("truncated input")]
    Truncated,
    /// The input ended cleanly at a tag boundary.
    #[error("stream exhausted")]
    StreamExhausted,
    /// The FLV signature (magic bytes) is invalid.
    #[error("invalid signature '{}'", String::from_utf8_lossy(.0))]
    InvalidSignature([u8; 3]),
    /// The header size in the FLV header is not 9.
    #[error("invalid header size: {0}")]
    InvalidHeaderSize(u32),
    /// A tag type other than audio, video or script data.
    #[error("unknown tag type {0}")]
    UnknownTagType(u8),
    /// AMF0 error.
    #[error("amf0: {0}")]
    Amf0(#[from] Amf0Error),
}

impl From<io::Error> for FlvError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FlvError::Truncated
        } else {
            FlvError::Io(err)
        }
    }
}

impl FlvError {
    /// Returns `true` if the input ended cleanly, at a tag or value boundary.
    pub fn is_stream_exhausted(&self) -> bool {
        match self {
            FlvError::StreamExhausted => true,
            FlvError::Amf0(err) => err.is_stream_exhausted(),
            _ => false,
        }
    }

    /// Returns `true` if the input is malformed.
    pub fn is_format_error(&self) -> bool {
        match self {
            FlvError::InvalidSignature(_) | FlvError::InvalidHeaderSize(_) | FlvError::UnknownTagType(_) => true,
            FlvError::Amf0(err) => err.is_format_error(),
            _ => false,
        }
    }

    /// Returns `true` if a field was cut short.
    pub fn is_truncated(&self) -> bool {
        match self {
            FlvError::Truncated => true,
            FlvError::Amf0(err) => err.is_truncated(),
            _ => false,
        }
    }
}
