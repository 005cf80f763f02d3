//! FLV file processing

use std::io::{self, SeekFrom};

use flvprobe_amf0::DecodeLimits;

use crate::error::FlvError;
use crate::header::FlvHeader;
use crate::script::{MetadataRecord, decode_on_meta_data};
use crate::sink::TraversalSink;
use crate::tag::{FlvTagHeader, FlvTagType, read_previous_tag_size};

/// Counts of the tags seen during a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSummary {
    /// Number of audio tags.
    pub audio: u64,
    /// Number of video tags.
    pub video: u64,
    /// Number of script data tags.
    pub script: u64,
    /// The largest tag timestamp, in milliseconds.
    pub max_timestamp_ms: u32,
}

/// How a traversal ended.
#[derive(Debug)]
pub enum TraversalStatus {
    /// The input ended cleanly at a tag or value boundary.
    Done,
    /// A malformed or truncated input stopped the traversal.
    Failed(FlvError),
}

/// The result of walking an FLV file.
///
/// An FLV file is a [`FlvHeader`] followed by the FLV File Body, a series of tags each
/// preceded by the size of the tag before it. Audio and video payloads are skipped,
/// script data tags are decoded as `onMetaData`.
///
/// The FLV File Body is defined by:
/// - Legacy FLV spec, Annex E.3
#[derive(Debug)]
pub struct FlvTraversal {
    /// The file header, if 9 bytes could be read.
    pub header: Option<FlvHeader>,
    /// The record decoded from the most recent script data tag.
    ///
    /// All fields are unset if no script data tag was reached.
    pub metadata: MetadataRecord,
    /// The tags that were traversed.
    pub summary: TagSummary,
    /// How the traversal ended.
    pub status: TraversalStatus,
}

impl FlvTraversal {
    /// Walk an FLV file with the default limits and no sink.
    pub fn run<R>(reader: &mut R) -> Self
    where
        R: io::Read + io::Seek,
    {
        Self::run_with(reader, &mut (), DecodeLimits::default())
    }

    /// Walk an FLV file, reporting every header and tag to `sink`.
    ///
    /// The reader must be positioned at the start of the file. Errors never escape: they end
    /// the traversal and are reported in [`FlvTraversal::status`] next to whatever was
    /// decoded before them.
    pub fn run_with<R, S>(reader: &mut R, sink: &mut S, limits: DecodeLimits) -> Self
    where
        R: io::Read + io::Seek,
        S: TraversalSink + ?Sized,
    {
        let mut traversal = FlvTraversal {
            header: None,
            metadata: MetadataRecord::default(),
            summary: TagSummary::default(),
            status: TraversalStatus::Done,
        };

        match traversal.walk(reader, sink, limits) {
            Ok(()) => {}
            Err(err) if err.is_stream_exhausted() => {
                tracing::debug!(summary = ?traversal.summary, "reached end of stream");
            }
            Err(err) => {
                tracing::debug!(error = %err, "traversal failed");
                traversal.status = TraversalStatus::Failed(err);
            }
        }

        traversal
    }

    fn walk<R, S>(&mut self, reader: &mut R, sink: &mut S, limits: DecodeLimits) -> Result<(), FlvError>
    where
        R: io::Read + io::Seek,
        S: TraversalSink + ?Sized,
    {
        let header = FlvHeader::demux(reader)?;
        tracing::debug!(
            signature = %header.signature_str(),
            version = header.version,
            audio = header.has_audio(),
            video = header.has_video(),
            header_size = header.header_size,
            "flv header"
        );
        sink.on_header(&header);
        let header = self.header.insert(header);
        header.validate()?;

        let mut expected_previous_tag_size = 0;

        loop {
            let previous_tag_size = read_previous_tag_size(reader)?;
            if previous_tag_size != expected_previous_tag_size {
                tracing::warn!(
                    previous_tag_size,
                    expected = expected_previous_tag_size,
                    "previous tag size does not match the last tag"
                );
            }

            let tag = FlvTagHeader::demux(reader)?;
            tracing::trace!(
                tag_type = ?tag.tag_type,
                data_size = tag.data_size,
                timestamp_ms = tag.timestamp_ms,
                stream_id = tag.stream_id,
                "tag header"
            );
            sink.on_tag(&tag);

            match tag.tag_type {
                FlvTagType::Audio => {
                    reader.seek(SeekFrom::Current(tag.data_size.into()))?;
                    self.summary.audio += 1;
                }
                FlvTagType::Video => {
                    reader.seek(SeekFrom::Current(tag.data_size.into()))?;
                    self.summary.video += 1;
                }
                FlvTagType::ScriptData => {
                    self.summary.script += 1;
                    self.decode_script_tag(reader, &tag, sink, limits)?;
                }
                FlvTagType(other) => return Err(FlvError::UnknownTagType(other)),
            }

            self.summary.max_timestamp_ms = self.summary.max_timestamp_ms.max(tag.timestamp_ms);
            expected_previous_tag_size = tag.tag_size();
        }
    }

    fn decode_script_tag<R, S>(
        &mut self,
        reader: &mut R,
        tag: &FlvTagHeader,
        sink: &mut S,
        limits: DecodeLimits,
    ) -> Result<(), FlvError>
    where
        R: io::Read + io::Seek,
        S: TraversalSink + ?Sized,
    {
        let start = reader.stream_position()?;
        let end = start + u64::from(tag.data_size);

        // Each script data tag replaces the record of the one before it, even when it
        // fails part way through.
        let mut metadata = MetadataRecord::default();
        // An object left open at the end of the payload ends there instead of reading into the next tag.
        let mut payload = io::Read::take(&mut *reader, u64::from(tag.data_size));
        let result = decode_on_meta_data(&mut payload, &mut metadata, sink, limits);
        self.metadata = metadata;
        let status = result?;

        let position = reader.stream_position()?;
        if position != end {
            tracing::debug!(?status, position, end, "realigning to the end of the script data tag");
        }
        reader.seek(SeekFrom::Start(end))?;

        Ok(())
    }

    /// Whether the header was read and is valid.
    pub fn header_valid(&self) -> bool {
        self.header.as_ref().is_some_and(FlvHeader::is_valid)
    }

    /// Whether the traversal reached the end of the input without an error.
    pub fn is_done(&self) -> bool {
        matches!(self.status, TraversalStatus::Done)
    }

    /// The error that stopped the traversal, if any.
    pub fn error(&self) -> Option<&FlvError> {
        match &self.status {
            TraversalStatus::Done => None,
            TraversalStatus::Failed(err) => Some(err),
        }
    }
}
