//! AMF0 value types.

use crate::Amf0Marker;

/// Properties of an AMF0 object, in the order they appear on the wire.
pub type Amf0Object = Vec<(String, Amf0Value)>;

/// Represents any AMF0 value.
#[derive(Debug, PartialEq, Clone)]
pub enum Amf0Value {
    /// AMF0 Number.
    Number(f64),
    /// AMF0 Boolean.
    Boolean(bool),
    /// AMF0 String.
    String(String),
    /// AMF0 Object.
    Object(Amf0Object),
    /// Legacy movie clip, carried as a short string.
    MovieClip(String),
    /// AMF0 Null.
    Null,
    /// AMF0 Undefined.
    Undefined,
    /// AMF0 Reference.
    Reference,
    /// AMF0 ECMA array.
    EcmaArray {
        /// The element count written before the properties.
        ///
        /// Encoders do not always keep this accurate, the object-end marker terminates the list.
        count_hint: u32,
        /// The properties.
        properties: Amf0Object,
    },
    /// AMF0 Strict array.
    StrictArray(Vec<Amf0Value>),
    /// AMF0 Date.
    Date {
        /// Milliseconds since the unix epoch.
        millis: f64,
        /// Timezone offset, reserved and conventionally zero.
        timezone: i16,
    },
    /// AMF0 Long string.
    LongString(String),
    /// AMF0 Unsupported.
    Unsupported,
    /// AMF0 XML document.
    XmlDocument(String),
    /// AMF0 Typed object.
    TypedObject {
        /// The registered class name.
        class_name: String,
        /// The properties.
        properties: Amf0Object,
    },
}

impl Amf0Value {
    /// The marker this value is encoded with.
    pub fn marker(&self) -> Amf0Marker {
        match self {
            Amf0Value::Number(_) => Amf0Marker::Number,
            Amf0Value::Boolean(_) => Amf0Marker::Boolean,
            Amf0Value::String(_) => Amf0Marker::String,
            Amf0Value::Object(_) => Amf0Marker::Object,
            Amf0Value::MovieClip(_) => Amf0Marker::MovieClipMarker,
            Amf0Value::Null => Amf0Marker::Null,
            Amf0Value::Undefined => Amf0Marker::Undefined,
            Amf0Value::Reference => Amf0Marker::Reference,
            Amf0Value::EcmaArray { .. } => Amf0Marker::EcmaArray,
            Amf0Value::StrictArray(_) => Amf0Marker::StrictArray,
            Amf0Value::Date { .. } => Amf0Marker::Date,
            Amf0Value::LongString(_) => Amf0Marker::LongString,
            Amf0Value::Unsupported => Amf0Marker::Unsupported,
            Amf0Value::XmlDocument(_) => Amf0Marker::XmlDocument,
            Amf0Value::TypedObject { .. } => Amf0Marker::TypedObject,
        }
    }

    /// Number of bytes this value occupies when encoded, marker included.
    pub fn encoded_len(&self) -> usize {
        fn properties_len(properties: &Amf0Object) -> usize {
            properties
                .iter()
                .map(|(key, value)| 2 + key.len() + value.encoded_len())
                .sum::<usize>()
                + 3
        }

        1 + match self {
            Amf0Value::Number(_) => 8,
            Amf0Value::Boolean(_) => 1,
            Amf0Value::String(s) | Amf0Value::MovieClip(s) => 2 + s.len(),
            Amf0Value::LongString(s) | Amf0Value::XmlDocument(s) => 4 + s.len(),
            Amf0Value::Object(properties) => properties_len(properties),
            Amf0Value::EcmaArray { properties, .. } => 4 + properties_len(properties),
            Amf0Value::TypedObject { class_name, properties } => 2 + class_name.len() + properties_len(properties),
            Amf0Value::StrictArray(values) => 4 + values.iter().map(Amf0Value::encoded_len).sum::<usize>(),
            Amf0Value::Date { .. } => 10,
            Amf0Value::Null | Amf0Value::Undefined | Amf0Value::Reference | Amf0Value::Unsupported => 0,
        }
    }

    /// Returns the number, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text of a short string, long string or XML document.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) | Amf0Value::LongString(s) | Amf0Value::XmlDocument(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the properties of an object, ECMA array or typed object.
    pub fn properties(&self) -> Option<&Amf0Object> {
        match self {
            Amf0Value::Object(properties)
            | Amf0Value::EcmaArray { properties, .. }
            | Amf0Value::TypedObject { properties, .. } => Some(properties),
            _ => None,
        }
    }
}

impl From<f64> for Amf0Value {
    fn from(value: f64) -> Self {
        Amf0Value::Number(value)
    }
}

impl From<bool> for Amf0Value {
    fn from(value: bool) -> Self {
        Amf0Value::Boolean(value)
    }
}

impl From<String> for Amf0Value {
    fn from(value: String) -> Self {
        Amf0Value::String(value)
    }
}

impl From<&str> for Amf0Value {
    fn from(value: &str) -> Self {
        Amf0Value::String(value.to_owned())
    }
}

impl From<Vec<Amf0Value>> for Amf0Value {
    fn from(value: Vec<Amf0Value>) -> Self {
        Amf0Value::StrictArray(value)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::Amf0Value;
    use crate::Amf0Marker;

    #[test]
    fn encoded_len_of_scalars() {
        assert_eq!(Amf0Value::Number(1.0).encoded_len(), 9);
        assert_eq!(Amf0Value::Boolean(true).encoded_len(), 2);
        assert_eq!(Amf0Value::from("abc").encoded_len(), 6);
        assert_eq!(Amf0Value::LongString("abc".to_owned()).encoded_len(), 8);
        assert_eq!(Amf0Value::Null.encoded_len(), 1);
        assert_eq!(
            Amf0Value::Date {
                millis: 0.0,
                timezone: 0
            }
            .encoded_len(),
            11
        );
    }

    #[test]
    fn encoded_len_of_composites() {
        // marker, "a" key, boolean, empty key + end marker
        let object = Amf0Value::Object(vec![("a".to_owned(), Amf0Value::Boolean(true))]);
        assert_eq!(object.encoded_len(), 1 + 3 + 2 + 3);

        let ecma = Amf0Value::EcmaArray {
            count_hint: 1,
            properties: vec![("a".to_owned(), Amf0Value::Boolean(true))],
        };
        assert_eq!(ecma.encoded_len(), object.encoded_len() + 4);

        let array = Amf0Value::from(vec![Amf0Value::Number(1.0), Amf0Value::Null]);
        assert_eq!(array.encoded_len(), 1 + 4 + 9 + 1);
        assert_eq!(array.marker(), Amf0Marker::StrictArray);
    }

    #[test]
    fn accessors() {
        assert_eq!(Amf0Value::Number(2.0).as_number(), Some(2.0));
        assert_eq!(Amf0Value::Null.as_number(), None);
        assert_eq!(Amf0Value::XmlDocument("<x/>".to_owned()).as_str(), Some("<x/>"));
        assert_eq!(Amf0Value::Boolean(false).as_bool(), Some(false));
        assert!(Amf0Value::Object(Vec::new()).properties().is_some());
    }
}
