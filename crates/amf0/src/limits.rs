//! Bounds on stream-declared allocations.

use crate::{Amf0Error, Result};

/// Limits applied while decoding.
///
/// Strings and arrays are sized by lengths the stream declares, so a corrupt length
/// field could otherwise request an arbitrarily large allocation. Skipping never
/// allocates and is only bounded by [`DecodeLimits::max_depth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecodeLimits {
    /// Longest string, in bytes, that will be materialized.
    pub max_string_len: u32,
    /// Largest strict array, in elements, that will be materialized.
    pub max_array_len: u32,
    /// Deepest nesting of objects and arrays, for both decoding and skipping.
    pub max_depth: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_string_len: 1 << 20,
            max_array_len: 1 << 20,
            max_depth: 64,
        }
    }
}

impl DecodeLimits {
    pub(crate) fn check_string(&self, len: u32) -> Result<()> {
        if len > self.max_string_len {
            return Err(Amf0Error::TooLong {
                what: "string",
                len: len.into(),
                limit: self.max_string_len.into(),
            });
        }

        Ok(())
    }

    pub(crate) fn check_array(&self, len: u32) -> Result<()> {
        if len > self.max_array_len {
            return Err(Amf0Error::TooLong {
                what: "array",
                len: len.into(),
                limit: self.max_array_len.into(),
            });
        }

        Ok(())
    }
}
