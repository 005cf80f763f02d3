//! FLV Tag processing

use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use nutype_enum::nutype_enum;

use crate::error::FlvError;

nutype_enum! {
    /// FLV Tag Type
    ///
    /// This is the type of the tag.
    ///
    /// Defined by:
    /// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - FLV tags)
    /// - video_file_format_spec_v10_1.pdf (Annex E.4.1 - FLV Tag)
    pub enum FlvTagType(u8) {
        /// [`FlvTagType::Audio`] indicates that the tag carries audio data.
        Audio = 8,
        /// [`FlvTagType::Video`] indicates that the tag carries video data.
        Video = 9,
        /// [`FlvTagType::ScriptData`] indicates that the tag carries an AMF0 script object.
        ScriptData = 18,
    }
}

/// The header in front of every FLV tag.
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - FLV tags)
/// - video_file_format_spec_v10_1.pdf (Annex E.4.1 - FLV Tag)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlvTagHeader {
    /// The type of the payload.
    pub tag_type: FlvTagType,
    /// The size of the payload that follows the header. (24 bits)
    pub data_size: u32,
    /// Timestamp in milliseconds, the extension byte is the most significant byte.
    pub timestamp_ms: u32,
    /// The stream id, always 0. (24 bits)
    pub stream_id: u32,
}

impl FlvTagHeader {
    /// Size of the tag header on the wire.
    pub const SIZE: u32 = 11;

    /// Demux a tag header from the given reader.
    ///
    /// A clean end of input before the first byte is reported as
    /// [`FlvError::StreamExhausted`], anywhere later as [`FlvError::Truncated`].
    pub fn demux(reader: &mut impl io::Read) -> Result<Self, FlvError> {
        let tag_type = FlvTagType::from(read_boundary_u8(reader)?);
        let data_size = reader.read_u24::<BigEndian>()?;
        // The timestamp is stored as 24 bits followed by an 8 bit extension that holds the upper bits.
        let timestamp_ms = reader.read_u24::<BigEndian>()? | ((reader.read_u8()? as u32) << 24);
        let stream_id = reader.read_u24::<BigEndian>()?;

        Ok(FlvTagHeader {
            tag_type,
            data_size,
            timestamp_ms,
            stream_id,
        })
    }

    /// The value the previous-tag-size field after this tag should hold.
    pub fn tag_size(&self) -> u32 {
        Self::SIZE + self.data_size
    }
}

/// Read the previous-tag-size field that precedes every tag.
///
/// A clean end of input before the first byte is reported as [`FlvError::StreamExhausted`].
pub fn read_previous_tag_size(reader: &mut impl io::Read) -> Result<u32, FlvError> {
    let hi = read_boundary_u8(reader)?;
    let lo = reader.read_u24::<BigEndian>()?;
    Ok(((hi as u32) << 24) | lo)
}

fn read_boundary_u8(reader: &mut impl io::Read) -> Result<u8, FlvError> {
    match reader.read_u8() {
        Ok(byte) => Ok(byte),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(FlvError::StreamExhausted),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn tag_types() {
        let cases = [
            (8u8, FlvTagType::Audio, "FlvTagType::Audio"),
            (9, FlvTagType::Video, "FlvTagType::Video"),
            (18, FlvTagType::ScriptData, "FlvTagType::ScriptData"),
            (255, FlvTagType(255), "FlvTagType(255)"),
        ];

        for (value, expected, name) in cases {
            let tag_type = FlvTagType::from(value);
            assert_eq!(tag_type, expected);
            assert_eq!(format!("{:?}", tag_type), name);
        }
    }

    #[test]
    fn demux_tag_header() {
        #[rustfmt::skip]
        let bytes: [u8; 11] = [
            18, // script data
            0x00, 0x01, 0x00, // data size
            0x12, 0x34, 0x56, // timestamp
            0x01, // timestamp extension
            0, 0, 0, // stream id
        ];

        let header = FlvTagHeader::demux(&mut &bytes[..]).unwrap();
        assert_eq!(header.tag_type, FlvTagType::ScriptData);
        assert_eq!(header.data_size, 256);
        assert_eq!(header.timestamp_ms, 0x0112_3456);
        assert_eq!(header.stream_id, 0);
        assert_eq!(header.tag_size(), 267);
    }

    #[test]
    fn end_of_input() {
        assert!(matches!(
            FlvTagHeader::demux(&mut &[0u8; 0][..]).unwrap_err(),
            FlvError::StreamExhausted
        ));
        assert!(matches!(
            FlvTagHeader::demux(&mut &[8u8, 0, 0][..]).unwrap_err(),
            FlvError::Truncated
        ));
        assert!(matches!(
            read_previous_tag_size(&mut &[0u8; 0][..]).unwrap_err(),
            FlvError::StreamExhausted
        ));
        assert!(matches!(read_previous_tag_size(&mut &[0u8, 0][..]).unwrap_err(), FlvError::Truncated));
        assert_eq!(read_previous_tag_size(&mut &[0u8, 0, 1, 11][..]).unwrap(), 267);
    }
}
