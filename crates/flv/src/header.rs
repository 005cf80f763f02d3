//! FLV header processing

use std::io;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::FlvError;

/// The FLV header
/// Whenever a FLV file is read these are the first 9 bytes of the file.
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV Header - Page 8)
/// - video_file_format_spec_v10_1.pdf (Annex E.2 - The FLV Header)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlvHeader {
    /// The signature, `FLV` in a valid file.
    pub signature: [u8; 3],
    /// The version of the FLV file.
    pub version: u8,
    /// The type flags. Bit 2 marks audio, bit 0 marks video.
    pub flags: u8,
    /// The size of this header, 9 in a valid file.
    pub header_size: u32,
}

impl FlvHeader {
    /// The only header size this crate accepts.
    pub const SIZE: u32 = 9;

    /// Demux the FLV header from the given reader.
    ///
    /// Reads exactly 9 bytes and does not validate them, see [`FlvHeader::validate`].
    pub fn demux(reader: &mut impl io::Read) -> Result<Self, FlvError> {
        let mut signature = [0; 3];
        reader.read_exact(&mut signature)?;

        let version = reader.read_u8()?;
        let flags = reader.read_u8()?;
        let header_size = reader.read_u32::<BigEndian>()?;

        Ok(FlvHeader {
            signature,
            version,
            flags,
            header_size,
        })
    }

    /// Check the signature (case-insensitively) and the header size.
    pub fn validate(&self) -> Result<(), FlvError> {
        if !self.signature.eq_ignore_ascii_case(b"FLV") {
            return Err(FlvError::InvalidSignature(self.signature));
        }

        if self.header_size != Self::SIZE {
            return Err(FlvError::InvalidHeaderSize(self.header_size));
        }

        Ok(())
    }

    /// Returns `true` if [`FlvHeader::validate`] passes.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Whether the file declares audio tags.
    pub fn has_audio(&self) -> bool {
        self.flags & 0b0000_0100 != 0
    }

    /// Whether the file declares video tags.
    pub fn has_video(&self) -> bool {
        self.flags & 0b0000_0001 != 0
    }

    /// The signature as text.
    pub fn signature_str(&self) -> String {
        String::from_utf8_lossy(&self.signature).into_owned()
    }
}
