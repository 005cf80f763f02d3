//! An AMF0 decoder that can either materialize a value or skip over it.
//!
//! Both modes consume exactly the same bytes for every kind of value, so a caller
//! can pick out the properties it cares about and skip the rest while the reader
//! stays positioned at the next sibling value.
//!
//! # Limitations
//!
//! - References are treated as zero-length and are never resolved.
//! - Does not support the AVM+ Type Marker. (see AMF 0 spec, 3.1)
//!
//! # Examples
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn std::error::Error>> {
//! use flvprobe_amf0::{Amf0Decoder, Amf0Encoder, Amf0Value};
//!
//! let mut bytes = Vec::new();
//! Amf0Encoder::new(&mut bytes).encode_value(&Amf0Value::Number(12.5))?;
//! Amf0Encoder::new(&mut bytes).encode_value(&Amf0Value::Boolean(true))?;
//!
//! let mut decoder = Amf0Decoder::new(bytes.as_slice());
//! decoder.skip_value()?;
//! assert_eq!(decoder.decode_value()?, Amf0Value::Boolean(true));
//! # Ok(())
//! # }
//! # test().expect("test failed");
//! ```
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod limits;
pub mod value;

pub use decoder::Amf0Decoder;
pub use encoder::Amf0Encoder;
pub use error::{Amf0Error, Result};
pub use limits::DecodeLimits;
pub use value::{Amf0Object, Amf0Value};

/// AMF0 marker types.
///
/// Defined by:
/// - AMF 0 spec, 2.1.
#[derive(Debug, PartialEq, Eq, Clone, Copy, num_derive::FromPrimitive)]
#[repr(u8)]
pub enum Amf0Marker {
    /// number-marker
    Number = 0x00,
    /// boolean-marker
    Boolean = 0x01,
    /// string-marker
    String = 0x02,
    /// object-marker
    Object = 0x03,
    /// movieclip-marker
    ///
    /// reserved, skipped as a short string
    MovieClipMarker = 0x04,
    /// null-marker
    Null = 0x05,
    /// undefined-marker
    Undefined = 0x06,
    /// reference-marker
    Reference = 0x07,
    /// ecma-array-marker
    EcmaArray = 0x08,
    /// object-end-marker
    ObjectEnd = 0x09,
    /// strict-array-marker
    StrictArray = 0x0a,
    /// date-marker
    Date = 0x0b,
    /// long-string-marker
    LongString = 0x0c,
    /// unsupported-marker
    Unsupported = 0x0d,
    /// recordset-marker
    ///
    /// reserved, not supported
    Recordset = 0x0e,
    /// xml-document-marker
    XmlDocument = 0x0f,
    /// typed-object-marker
    TypedObject = 0x10,
    /// avmplus-object-marker
    ///
    /// AMF3 marker
    AVMPlusObject = 0x11,
}
