//! AMF0 decoder

use std::io::{self, Read};

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use crate::{Amf0Error, Amf0Marker, Amf0Object, Amf0Value, DecodeLimits, Result};

/// Most elements reserved up front for a strict array. The rest grow as they are read.
const MAX_PREALLOCATED_ELEMENTS: u32 = 1024;

/// AMF0 decoder.
///
/// Wraps a reader positioned at a marker byte. Every value can either be decoded or
/// skipped; both leave the reader at the first byte of the next sibling value.
///
/// Pass `&mut reader` to decode from a reader that is shared with other code.
#[derive(Debug)]
pub struct Amf0Decoder<R> {
    reader: R,
    limits: DecodeLimits,
    depth: u32,
}

impl<R> Amf0Decoder<R> {
    /// Create a new decoder with the default [`DecodeLimits`].
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, DecodeLimits::default())
    }

    /// Create a new decoder with the given limits.
    pub fn with_limits(reader: R, limits: DecodeLimits) -> Self {
        Self { reader, limits, depth: 0 }
    }

    /// The limits this decoder enforces.
    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Mutable access to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume the decoder and return the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> Amf0Decoder<R>
where
    R: io::Read,
{
    /// Read one byte, mapping a clean end of input to [`Amf0Error::StreamExhausted`].
    fn read_boundary_u8(&mut self) -> Result<u8> {
        match self.reader.read_u8() {
            Ok(byte) => Ok(byte),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(Amf0Error::StreamExhausted),
            Err(err) => Err(err.into()),
        }
    }

    /// Read the marker of the next value.
    ///
    /// Bytes outside the AMF0 marker table, and the markers this decoder cannot size
    /// (recordset and AVM+), end the stream.
    pub fn read_marker(&mut self) -> Result<Amf0Marker> {
        let byte = self.read_boundary_u8()?;

        match Amf0Marker::from_u8(byte) {
            Some(Amf0Marker::Recordset | Amf0Marker::AVMPlusObject) | None => {
                tracing::debug!(marker = byte, "marker ends the value stream");
                Err(Amf0Error::StreamExhausted)
            }
            Some(marker) => Ok(marker),
        }
    }

    /// Read the marker of a value that must be one of `expect`.
    pub fn expect_marker(&mut self, expect: &'static [Amf0Marker]) -> Result<Amf0Marker> {
        let marker = self.read_marker()?;

        if expect.contains(&marker) {
            Ok(marker)
        } else if marker == Amf0Marker::ObjectEnd {
            Err(Amf0Error::StreamExhausted)
        } else {
            Err(Amf0Error::UnexpectedType { expected: expect, got: marker })
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.limits.max_depth {
            return Err(Amf0Error::TooDeep(self.limits.max_depth));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Discard exactly `len` bytes without buffering them.
    pub fn skip_bytes(&mut self, len: u64) -> Result<()> {
        let skipped = io::copy(&mut self.reader.by_ref().take(len), &mut io::sink())?;

        if skipped < len {
            return Err(Amf0Error::Truncated);
        }

        Ok(())
    }

    fn read_text(&mut self, len: u32) -> Result<String> {
        self.limits.check_string(len)?;

        let mut buf = vec![0; len as usize];
        self.reader.read_exact(&mut buf)?;

        Ok(match String::from_utf8(buf) {
            Ok(s) => s,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        })
    }

    fn read_short_string(&mut self) -> Result<String> {
        let len = self.reader.read_u16::<BigEndian>()?;
        self.read_text(len.into())
    }

    fn read_long_string(&mut self) -> Result<String> {
        let len = self.reader.read_u32::<BigEndian>()?;
        self.read_text(len)
    }

    fn read_strict_array_len(&mut self) -> Result<u32> {
        let count = self.reader.read_i32::<BigEndian>()?;
        u32::try_from(count).map_err(|_| Amf0Error::InvalidCount(count))
    }

    // --- Scalars ---

    /// Decode a number.
    pub fn decode_number(&mut self) -> Result<f64> {
        self.expect_marker(&[Amf0Marker::Number])?;
        Ok(self.reader.read_f64::<BigEndian>()?)
    }

    /// Decode a boolean. Any non-zero byte is `true`.
    pub fn decode_boolean(&mut self) -> Result<bool> {
        self.expect_marker(&[Amf0Marker::Boolean])?;
        Ok(self.reader.read_u8()? != 0)
    }

    /// Decode a short string, long string or XML document as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn decode_string(&mut self) -> Result<String> {
        let marker = self.expect_marker(&[Amf0Marker::String, Amf0Marker::LongString, Amf0Marker::XmlDocument])?;

        if marker == Amf0Marker::String {
            self.read_short_string()
        } else {
            self.read_long_string()
        }
    }

    // --- Property lists ---

    /// Read the name of the next property in an object.
    ///
    /// Returns `None` once the empty name and object-end marker that close the list
    /// have been consumed. An empty name followed by anything else is an
    /// [`Amf0Error::InvalidObjectEnd`].
    pub fn read_property_name(&mut self) -> Result<Option<String>> {
        let len = self.read_property_name_len()?;

        if len == 0 {
            self.expect_object_end()?;
            return Ok(None);
        }

        self.read_text(len.into()).map(Some)
    }

    fn read_property_name_len(&mut self) -> Result<u16> {
        let hi = self.read_boundary_u8()?;
        let lo = self.reader.read_u8()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn expect_object_end(&mut self) -> Result<()> {
        let byte = self.reader.read_u8()?;

        if byte != Amf0Marker::ObjectEnd as u8 {
            return Err(Amf0Error::InvalidObjectEnd(byte));
        }

        Ok(())
    }

    fn decode_properties(&mut self) -> Result<Amf0Object> {
        self.nested(|this| {
            let mut properties = Amf0Object::new();

            while let Some(key) = this.read_property_name()? {
                let value = this.decode_value()?;
                properties.push((key, value));
            }

            Ok(properties)
        })
    }

    fn skip_properties(&mut self) -> Result<()> {
        self.nested(|this| {
            loop {
                let len = this.read_property_name_len()?;

                if len == 0 {
                    return this.expect_object_end();
                }

                this.skip_bytes(len.into())?;
                this.skip_value()?;
            }
        })
    }

    /// Read the header of an object or ECMA array, leaving the reader at its first property name.
    ///
    /// Returns the ECMA array count hint, or `None` for a plain object.
    pub fn decode_object_header(&mut self) -> Result<Option<u32>> {
        let marker = self.expect_marker(&[Amf0Marker::Object, Amf0Marker::EcmaArray])?;

        if marker == Amf0Marker::EcmaArray {
            Ok(Some(self.reader.read_u32::<BigEndian>()?))
        } else {
            Ok(None)
        }
    }

    // --- Arrays ---

    /// Decode a strict array of numbers directly into a vector.
    pub fn decode_number_array(&mut self) -> Result<Vec<f64>> {
        self.expect_marker(&[Amf0Marker::StrictArray])?;
        let len = self.read_strict_array_len()?;
        self.limits.check_array(len)?;

        let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATED_ELEMENTS) as usize);
        for _ in 0..len {
            values.push(self.decode_number()?);
        }

        Ok(values)
    }

    // --- Any value ---

    /// Decode the next value.
    pub fn decode_value(&mut self) -> Result<Amf0Value> {
        let marker = self.read_marker()?;
        self.decode_value_body(marker)
    }

    fn decode_value_body(&mut self, marker: Amf0Marker) -> Result<Amf0Value> {
        match marker {
            Amf0Marker::Number => Ok(Amf0Value::Number(self.reader.read_f64::<BigEndian>()?)),
            Amf0Marker::Boolean => Ok(Amf0Value::Boolean(self.reader.read_u8()? != 0)),
            Amf0Marker::String => self.read_short_string().map(Amf0Value::String),
            Amf0Marker::LongString => self.read_long_string().map(Amf0Value::LongString),
            Amf0Marker::XmlDocument => self.read_long_string().map(Amf0Value::XmlDocument),
            Amf0Marker::MovieClipMarker => self.read_short_string().map(Amf0Value::MovieClip),
            Amf0Marker::Null => Ok(Amf0Value::Null),
            Amf0Marker::Undefined => Ok(Amf0Value::Undefined),
            Amf0Marker::Reference => Ok(Amf0Value::Reference),
            Amf0Marker::Unsupported => Ok(Amf0Value::Unsupported),
            Amf0Marker::Object => self.decode_properties().map(Amf0Value::Object),
            Amf0Marker::EcmaArray => {
                let count_hint = self.reader.read_u32::<BigEndian>()?;
                let properties = self.decode_properties()?;
                Ok(Amf0Value::EcmaArray { count_hint, properties })
            }
            Amf0Marker::TypedObject => {
                let class_name = self.read_short_string()?;
                let properties = self.decode_properties()?;
                Ok(Amf0Value::TypedObject { class_name, properties })
            }
            Amf0Marker::StrictArray => {
                let len = self.read_strict_array_len()?;
                self.limits.check_array(len)?;

                self.nested(|this| {
                    let mut values = Vec::with_capacity(len.min(MAX_PREALLOCATED_ELEMENTS) as usize);
                    for _ in 0..len {
                        values.push(this.decode_value()?);
                    }
                    Ok(Amf0Value::StrictArray(values))
                })
            }
            Amf0Marker::Date => {
                let millis = self.reader.read_f64::<BigEndian>()?;
                let timezone = self.reader.read_i16::<BigEndian>()?;
                Ok(Amf0Value::Date { millis, timezone })
            }
            Amf0Marker::ObjectEnd | Amf0Marker::Recordset | Amf0Marker::AVMPlusObject => Err(Amf0Error::StreamExhausted),
        }
    }

    /// Skip the next value without materializing it.
    ///
    /// Consumes exactly as many bytes as [`Amf0Decoder::decode_value`] would.
    pub fn skip_value(&mut self) -> Result<()> {
        let marker = self.read_marker()?;

        match marker {
            Amf0Marker::Number => self.skip_bytes(8),
            Amf0Marker::Boolean => self.skip_bytes(1),
            Amf0Marker::String | Amf0Marker::MovieClipMarker => {
                let len = self.reader.read_u16::<BigEndian>()?;
                self.skip_bytes(len.into())
            }
            Amf0Marker::LongString | Amf0Marker::XmlDocument => {
                let len = self.reader.read_u32::<BigEndian>()?;
                self.skip_bytes(len.into())
            }
            Amf0Marker::Null | Amf0Marker::Undefined | Amf0Marker::Reference | Amf0Marker::Unsupported => Ok(()),
            Amf0Marker::Object => self.skip_properties(),
            Amf0Marker::EcmaArray => {
                self.reader.read_u32::<BigEndian>()?;
                self.skip_properties()
            }
            Amf0Marker::TypedObject => {
                let len = self.reader.read_u16::<BigEndian>()?;
                self.skip_bytes(len.into())?;
                self.skip_properties()
            }
            Amf0Marker::StrictArray => {
                let len = self.read_strict_array_len()?;

                self.nested(|this| {
                    for _ in 0..len {
                        this.skip_value()?;
                    }
                    Ok(())
                })
            }
            // timestamp and timezone
            Amf0Marker::Date => self.skip_bytes(10),
            Amf0Marker::ObjectEnd | Amf0Marker::Recordset | Amf0Marker::AVMPlusObject => Err(Amf0Error::StreamExhausted),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::Amf0Encoder;

    fn encode(values: &[Amf0Value]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut encoder = Amf0Encoder::new(&mut buf);
        for value in values {
            encoder.encode_value(value).unwrap();
        }
        buf
    }

    fn sample_values() -> Vec<Amf0Value> {
        vec![
            Amf0Value::Number(12.5),
            Amf0Value::Boolean(true),
            Amf0Value::from("onMetaData"),
            Amf0Value::LongString("a longer string".to_owned()),
            Amf0Value::Null,
            Amf0Value::Undefined,
            Amf0Value::Reference,
            Amf0Value::MovieClip("clip".to_owned()),
            Amf0Value::Date {
                millis: 1_700_000_000_000.0,
                timezone: 0,
            },
            Amf0Value::Object(vec![
                ("width".to_owned(), Amf0Value::Number(1920.0)),
                (
                    "nested".to_owned(),
                    Amf0Value::Object(vec![("flag".to_owned(), Amf0Value::Boolean(false))]),
                ),
            ]),
            Amf0Value::EcmaArray {
                count_hint: 0,
                properties: vec![("creator".to_owned(), Amf0Value::from("encoder"))],
            },
            Amf0Value::StrictArray(vec![Amf0Value::Number(1.0), Amf0Value::from("x"), Amf0Value::Null]),
            Amf0Value::TypedObject {
                class_name: "Point".to_owned(),
                properties: vec![("x".to_owned(), Amf0Value::Number(1.0))],
            },
            Amf0Value::XmlDocument("<xmp/>".to_owned()),
            Amf0Value::Unsupported,
        ]
    }

    #[test]
    fn decode_each_kind() {
        for value in sample_values() {
            let bytes = encode(std::slice::from_ref(&value));
            let mut decoder = Amf0Decoder::new(bytes.as_slice());
            assert_eq!(decoder.decode_value().unwrap(), value);
            assert!(decoder.into_inner().is_empty(), "{value:?} left bytes behind");
        }
    }

    #[test]
    fn skip_and_decode_consume_the_same_bytes() {
        for value in sample_values() {
            // The sentinel after the value must be the next thing either mode sees.
            let bytes = encode(&[value.clone(), Amf0Value::Boolean(true)]);

            let mut reader = Cursor::new(bytes.as_slice());
            Amf0Decoder::new(&mut reader).skip_value().unwrap();
            let skipped = reader.position();

            let mut reader = Cursor::new(bytes.as_slice());
            Amf0Decoder::new(&mut reader).decode_value().unwrap();
            let decoded = reader.position();

            assert_eq!(skipped, decoded, "{value:?}");
            assert_eq!(skipped as usize, value.encoded_len(), "{value:?}");

            let mut decoder = Amf0Decoder::new(&mut reader);
            assert_eq!(decoder.decode_value().unwrap(), Amf0Value::Boolean(true));
        }
    }

    #[test]
    fn object_leaves_cursor_at_sibling() {
        #[rustfmt::skip]
        let bytes = [
            Amf0Marker::Object as u8,
            0, 1, b'a',
            Amf0Marker::Number as u8, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 1, b'b',
            Amf0Marker::Null as u8,
            0, 0, Amf0Marker::ObjectEnd as u8,
            // sibling
            Amf0Marker::Boolean as u8, 1,
        ];

        let mut reader = Cursor::new(&bytes[..]);
        Amf0Decoder::new(&mut reader).skip_value().unwrap();
        assert_eq!(reader.position(), 20);

        let mut decoder = Amf0Decoder::new(&mut reader);
        assert!(decoder.decode_boolean().unwrap());
    }

    #[test]
    fn invalid_object_end() {
        #[rustfmt::skip]
        let bytes = [
            Amf0Marker::Object as u8,
            0, 0, // empty name
            7,
        ];

        let err = Amf0Decoder::new(&bytes[..]).decode_value().unwrap_err();
        assert!(matches!(err, Amf0Error::InvalidObjectEnd(7)));
        assert!(err.is_format_error());

        let err = Amf0Decoder::new(&bytes[..]).skip_value().unwrap_err();
        assert!(matches!(err, Amf0Error::InvalidObjectEnd(7)));
    }

    #[test]
    fn empty_input_is_exhausted() {
        let err = Amf0Decoder::new(&[0u8; 0][..]).decode_value().unwrap_err();
        assert!(err.is_stream_exhausted());

        let err = Amf0Decoder::new(&[0u8; 0][..]).skip_value().unwrap_err();
        assert!(err.is_stream_exhausted());
    }

    #[test]
    fn sentinel_markers_are_exhausted() {
        for marker in [Amf0Marker::ObjectEnd as u8, Amf0Marker::Recordset as u8, 0x11, 0x42] {
            let err = Amf0Decoder::new(&[marker][..]).decode_value().unwrap_err();
            assert!(err.is_stream_exhausted(), "marker {marker}");

            let err = Amf0Decoder::new(&[marker][..]).skip_value().unwrap_err();
            assert!(err.is_stream_exhausted(), "marker {marker}");
        }
    }

    #[test]
    fn truncated_fields() {
        let cases: &[&[u8]] = &[
            // number with 3 bytes
            &[Amf0Marker::Number as u8, 0, 0, 0],
            // string declaring 5 bytes, carrying 2
            &[Amf0Marker::String as u8, 0, 5, b'a', b'b'],
            // long string cut inside the length
            &[Amf0Marker::LongString as u8, 0, 0],
            // date without timezone
            &[Amf0Marker::Date as u8, 0, 0, 0, 0, 0, 0, 0, 0],
            // object cut inside a property name
            &[Amf0Marker::Object as u8, 0, 4, b'n'],
        ];

        for bytes in cases {
            let err = Amf0Decoder::new(*bytes).decode_value().unwrap_err();
            assert!(err.is_truncated(), "decode {bytes:?}: {err}");

            let err = Amf0Decoder::new(*bytes).skip_value().unwrap_err();
            assert!(err.is_truncated(), "skip {bytes:?}: {err}");
        }
    }

    #[test]
    fn number_array() {
        let mut bytes = Vec::new();
        Amf0Encoder::new(&mut bytes).encode_number_array(&[0.0, 1.5, 3.0]).unwrap();

        let values = Amf0Decoder::new(bytes.as_slice()).decode_number_array().unwrap();
        assert_eq!(values, vec![0.0, 1.5, 3.0]);
    }

    #[test]
    fn number_array_rejects_other_elements() {
        let mut bytes = Vec::new();
        Amf0Encoder::new(&mut bytes)
            .encode_strict_array(&[Amf0Value::Number(1.0), Amf0Value::from("no")])
            .unwrap();

        let err = Amf0Decoder::new(bytes.as_slice()).decode_number_array().unwrap_err();
        assert!(matches!(
            err,
            Amf0Error::UnexpectedType {
                got: Amf0Marker::String,
                ..
            }
        ));
    }

    #[test]
    fn negative_array_count() {
        let bytes = [Amf0Marker::StrictArray as u8, 0xff, 0xff, 0xff, 0xff];

        let err = Amf0Decoder::new(&bytes[..]).skip_value().unwrap_err();
        assert!(matches!(err, Amf0Error::InvalidCount(-1)));
    }

    #[test]
    fn limits_reject_large_declarations() {
        let limits = DecodeLimits {
            max_string_len: 8,
            max_array_len: 4,
            max_depth: 2,
        };

        // string declaring 0xffff bytes
        let bytes = [Amf0Marker::String as u8, 0xff, 0xff];
        let err = Amf0Decoder::with_limits(&bytes[..], limits).decode_value().unwrap_err();
        assert!(matches!(err, Amf0Error::TooLong { what: "string", .. }));

        // array declaring 0x7fffffff elements
        let bytes = [Amf0Marker::StrictArray as u8, 0x7f, 0xff, 0xff, 0xff];
        let err = Amf0Decoder::with_limits(&bytes[..], limits).decode_value().unwrap_err();
        assert!(matches!(err, Amf0Error::TooLong { what: "array", .. }));

        let nested = encode(&[Amf0Value::Object(vec![(
            "a".to_owned(),
            Amf0Value::Object(vec![("b".to_owned(), Amf0Value::Object(Vec::new()))]),
        )])]);
        let err = Amf0Decoder::with_limits(nested.as_slice(), limits).skip_value().unwrap_err();
        assert!(matches!(err, Amf0Error::TooDeep(2)));
    }

    #[test]
    fn declared_counts_do_not_reserve_memory() {
        // 60 nested arrays, each declaring 1 << 20 elements and carrying none
        let bytes: Vec<u8> = (0..60)
            .flat_map(|_| [Amf0Marker::StrictArray as u8, 0x00, 0x10, 0x00, 0x00])
            .collect();

        let mut decoder = Amf0Decoder::new(bytes.as_slice());
        assert!(decoder.decode_value().unwrap_err().is_stream_exhausted());

        let mut decoder = Amf0Decoder::new(bytes.as_slice());
        assert!(decoder.skip_value().unwrap_err().is_stream_exhausted());

        // the array ends after its first element
        let mut bytes = vec![Amf0Marker::StrictArray as u8, 0x00, 0x10, 0x00, 0x00];
        bytes.push(Amf0Marker::Number as u8);
        bytes.extend_from_slice(&1.0f64.to_be_bytes());
        let err = Amf0Decoder::new(bytes.as_slice()).decode_number_array().unwrap_err();
        assert!(err.is_stream_exhausted());
    }

    #[test]
    fn skip_ignores_length_limits() {
        let limits = DecodeLimits {
            max_string_len: 1,
            ..Default::default()
        };

        let bytes = encode(&[Amf0Value::from("longer than one byte")]);
        let mut decoder = Amf0Decoder::with_limits(bytes.as_slice(), limits);
        decoder.skip_value().unwrap();
        assert!(decoder.into_inner().is_empty());
    }

    #[test]
    fn typed_decoders() {
        let bytes = encode(&[Amf0Value::Number(2.0), Amf0Value::Boolean(false), Amf0Value::from("s")]);
        let mut decoder = Amf0Decoder::new(bytes.as_slice());

        assert_eq!(decoder.decode_number().unwrap(), 2.0);
        assert!(!decoder.decode_boolean().unwrap());
        assert_eq!(decoder.decode_string().unwrap(), "s");
    }

    #[test]
    fn object_header_and_properties() {
        let bytes = encode(&[Amf0Value::EcmaArray {
            count_hint: 1,
            properties: vec![("duration".to_owned(), Amf0Value::Number(1.0))],
        }]);
        let mut decoder = Amf0Decoder::new(bytes.as_slice());

        assert_eq!(decoder.decode_object_header().unwrap(), Some(1));
        assert_eq!(decoder.read_property_name().unwrap().as_deref(), Some("duration"));
        assert_eq!(decoder.decode_number().unwrap(), 1.0);
        assert_eq!(decoder.read_property_name().unwrap(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let bytes = [Amf0Marker::String as u8, 0, 2, 0xff, b'a'];
        let value = Amf0Decoder::new(&bytes[..]).decode_string().unwrap();
        assert_eq!(value, "\u{fffd}a");
    }
}
