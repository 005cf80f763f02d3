//! AMF0 encoder

use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use crate::{Amf0Error, Amf0Marker, Amf0Object, Amf0Value};

/// AMF0 encoder.
///
/// Provides various functions to encode different types of AMF0 values into a writer.
#[derive(Debug)]
pub struct Amf0Encoder<W> {
    writer: W,
}

impl<W> Amf0Encoder<W> {
    /// Create a new encoder from a writer.
    pub fn new(writer: W) -> Self {
        Amf0Encoder { writer }
    }

    /// Consume the encoder and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn short_len(value: &str) -> Result<u16, Amf0Error> {
    u16::try_from(value.len()).map_err(|_| Amf0Error::TooLong {
        what: "string",
        len: value.len() as u64,
        limit: u16::MAX.into(),
    })
}

fn long_len(len: usize, what: &'static str) -> Result<u32, Amf0Error> {
    u32::try_from(len).map_err(|_| Amf0Error::TooLong {
        what,
        len: len as u64,
        limit: u32::MAX.into(),
    })
}

impl<W> Amf0Encoder<W>
where
    W: io::Write,
{
    /// Encode a [`bool`] as a AMF0 boolean value.
    pub fn encode_boolean(&mut self, value: bool) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::Boolean as u8)?;
        self.writer.write_u8(value as u8)?;
        Ok(())
    }

    /// Encode a [`f64`] as a AMF0 number value.
    pub fn encode_number(&mut self, value: f64) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::Number as u8)?;
        self.writer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    /// Encode a [`&str`](str) as a AMF0 short string value.
    pub fn encode_string(&mut self, value: &str) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::String as u8)?;
        self.write_short_string(value)
    }

    /// Encode a [`&str`](str) as a AMF0 long string value.
    pub fn encode_long_string(&mut self, value: &str) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::LongString as u8)?;
        self.write_long_string(value)
    }

    /// Encode AMF0 Null value.
    pub fn encode_null(&mut self) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::Null as u8)?;
        Ok(())
    }

    /// Encode AMF0 Undefined value.
    pub fn encode_undefined(&mut self) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::Undefined as u8)?;
        Ok(())
    }

    /// Encode an AMF0 Date value.
    pub fn encode_date(&mut self, millis: f64, timezone: i16) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::Date as u8)?;
        self.writer.write_f64::<BigEndian>(millis)?;
        self.writer.write_i16::<BigEndian>(timezone)?;
        Ok(())
    }

    /// Encode a slice of values as an AMF0 StrictArray value.
    pub fn encode_strict_array(&mut self, values: &[Amf0Value]) -> Result<(), Amf0Error> {
        self.encode_strict_array_header(long_len(values.len(), "array")?)?;

        for value in values {
            self.encode_value(value)?;
        }

        Ok(())
    }

    /// Encode a slice of numbers as an AMF0 StrictArray of numbers.
    pub fn encode_number_array(&mut self, values: &[f64]) -> Result<(), Amf0Error> {
        self.encode_strict_array_header(long_len(values.len(), "array")?)?;

        for value in values {
            self.encode_number(*value)?;
        }

        Ok(())
    }

    /// Write a StrictArray marker and its element count.
    pub fn encode_strict_array_header(&mut self, len: u32) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::StrictArray as u8)?;
        self.writer.write_u32::<BigEndian>(len)?;
        Ok(())
    }

    /// Encode an [`Amf0Object`] as an AMF0 Object value.
    pub fn encode_object(&mut self, properties: &Amf0Object) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::Object as u8)?;
        self.encode_properties(properties)
    }

    /// Encode an [`Amf0Object`] as an AMF0 ECMA array value.
    pub fn encode_ecma_array(&mut self, count_hint: u32, properties: &Amf0Object) -> Result<(), Amf0Error> {
        self.encode_ecma_array_header(count_hint)?;
        self.encode_properties(properties)
    }

    /// Write an ECMA array marker and its count hint.
    pub fn encode_ecma_array_header(&mut self, count_hint: u32) -> Result<(), Amf0Error> {
        self.writer.write_u8(Amf0Marker::EcmaArray as u8)?;
        self.writer.write_u32::<BigEndian>(count_hint)?;
        Ok(())
    }

    /// Write a property name. Property names are short strings without a marker.
    pub fn encode_object_key(&mut self, key: &str) -> Result<(), Amf0Error> {
        self.write_short_string(key)
    }

    /// Write the empty property name and object-end marker that close a property list.
    pub fn encode_object_end(&mut self) -> Result<(), Amf0Error> {
        self.writer.write_u24::<BigEndian>(Amf0Marker::ObjectEnd as u32)?;
        Ok(())
    }

    fn encode_properties(&mut self, properties: &Amf0Object) -> Result<(), Amf0Error> {
        for (key, value) in properties {
            self.encode_object_key(key)?;
            self.encode_value(value)?;
        }

        self.encode_object_end()
    }

    fn write_short_string(&mut self, value: &str) -> Result<(), Amf0Error> {
        self.writer.write_u16::<BigEndian>(short_len(value)?)?;
        self.writer.write_all(value.as_bytes())?;
        Ok(())
    }

    fn write_long_string(&mut self, value: &str) -> Result<(), Amf0Error> {
        self.writer.write_u32::<BigEndian>(long_len(value.len(), "string")?)?;
        self.writer.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Encode any [`Amf0Value`].
    pub fn encode_value(&mut self, value: &Amf0Value) -> Result<(), Amf0Error> {
        match value {
            Amf0Value::Number(n) => self.encode_number(*n),
            Amf0Value::Boolean(b) => self.encode_boolean(*b),
            Amf0Value::String(s) => self.encode_string(s),
            Amf0Value::LongString(s) => self.encode_long_string(s),
            Amf0Value::Object(properties) => self.encode_object(properties),
            Amf0Value::EcmaArray { count_hint, properties } => self.encode_ecma_array(*count_hint, properties),
            Amf0Value::StrictArray(values) => self.encode_strict_array(values),
            Amf0Value::Date { millis, timezone } => self.encode_date(*millis, *timezone),
            Amf0Value::Null => self.encode_null(),
            Amf0Value::Undefined => self.encode_undefined(),
            Amf0Value::MovieClip(s) => {
                self.writer.write_u8(Amf0Marker::MovieClipMarker as u8)?;
                self.write_short_string(s)
            }
            Amf0Value::Reference => {
                self.writer.write_u8(Amf0Marker::Reference as u8)?;
                Ok(())
            }
            Amf0Value::Unsupported => {
                self.writer.write_u8(Amf0Marker::Unsupported as u8)?;
                Ok(())
            }
            Amf0Value::XmlDocument(s) => {
                self.writer.write_u8(Amf0Marker::XmlDocument as u8)?;
                self.write_long_string(s)
            }
            Amf0Value::TypedObject { class_name, properties } => {
                self.writer.write_u8(Amf0Marker::TypedObject as u8)?;
                self.write_short_string(class_name)?;
                self.encode_properties(properties)
            }
        }
    }
}
