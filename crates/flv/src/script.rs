//! Script data structures

use std::io;

use flvprobe_amf0::{Amf0Decoder, Amf0Error, Amf0Value, DecodeLimits};

use crate::codec::{SoundFormat, VideoCodecId};
use crate::sink::TraversalSink;

/// The keyframe index of an `onMetaData` object.
///
/// `positions[i]` is the byte offset of the keyframe that plays at `times[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframes {
    /// Byte offsets of the keyframe tags, from `filepositions`.
    pub positions: Vec<i64>,
    /// Timestamps of the keyframes in seconds, from `times`.
    pub times: Vec<f64>,
}

impl Keyframes {
    /// Returns `true` if no keyframes were decoded.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.times.is_empty()
    }

    /// Both sequences have the same length.
    ///
    /// A truncated script tag can leave one of them shorter.
    pub fn is_consistent(&self) -> bool {
        self.positions.len() == self.times.len()
    }

    /// Index-aligned `(position, time)` pairs, up to the shorter sequence.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.positions.iter().copied().zip(self.times.iter().copied())
    }

    /// Byte offset of the last keyframe at or before `time` seconds.
    pub fn position_for(&self, time: f64) -> Option<i64> {
        self.iter().take_while(|(_, t)| *t <= time).last().map(|(position, _)| position)
    }
}

/// FLV `onMetaData` script data
///
/// Every property is optional, a file only carries what its encoder wrote.
///
/// Defined by:
/// - Legacy FLV spec, Annex E.5
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetadataRecord {
    /// Total duration of the file, in seconds.
    pub duration: Option<f64>,
    /// Width of the video, in pixels.
    pub width: Option<i64>,
    /// Height of the video, in pixels.
    pub height: Option<i64>,
    /// Video bitrate, in kilobits per second.
    pub video_data_rate: Option<f64>,
    /// Number of frames per second.
    pub frame_rate: Option<f64>,
    /// Video codec ID used in the file.
    pub video_codec_id: Option<i64>,
    /// Audio bitrate, in kilobits per second.
    pub audio_data_rate: Option<f64>,
    /// Delay introduced by the audio codec, in seconds.
    pub audio_delay: Option<f64>,
    /// Frequency at which the audio stream is replayed.
    pub audio_sample_rate: Option<f64>,
    /// Resolution of a single audio sample.
    pub audio_sample_size: Option<i64>,
    /// Indicating the last video frame is a key frame.
    pub can_seek_to_end: Option<bool>,
    /// Creation date and time.
    pub creation_date: Option<String>,
    /// Indicates stereo audio.
    pub stereo: Option<bool>,
    /// Audio codec ID used in the file.
    pub audio_codec_id: Option<i64>,
    /// Total size of the file, in bytes.
    pub file_size: Option<i64>,
    /// Timestamp of the last tag, in seconds.
    pub last_timestamp: Option<f64>,
    /// Byte offset of the last keyframe.
    pub last_keyframe_location: Option<i64>,
    /// Timestamp of the last keyframe, in seconds.
    pub last_keyframe_timestamp: Option<f64>,
    /// The tool that produced the file.
    pub creator: Option<String>,
    /// The tool that injected this metadata.
    pub metadata_creator: Option<String>,
    /// Whether the keyframe index is present.
    pub has_keyframes: Option<bool>,
    /// Whether the file has video tags.
    pub has_video: Option<bool>,
    /// Whether the file has audio tags.
    pub has_audio: Option<bool>,
    /// Whether the metadata was injected.
    pub has_metadata: Option<bool>,
    /// Size of the tag payloads, in bytes.
    pub data_size: Option<i64>,
    /// Size of the video tags, in bytes.
    pub video_size: Option<i64>,
    /// Size of the audio tags, in bytes.
    pub audio_size: Option<i64>,
    /// The keyframe index.
    pub keyframes: Keyframes,
}

impl MetadataRecord {
    /// The audio codec as a [`SoundFormat`].
    pub fn sound_format(&self) -> Option<SoundFormat> {
        self.audio_codec_id
            .and_then(|id| u8::try_from(id).ok())
            .map(SoundFormat::from)
    }

    /// The video codec as a [`VideoCodecId`].
    pub fn video_codec(&self) -> Option<VideoCodecId> {
        self.video_codec_id
            .and_then(|id| u8::try_from(id).ok())
            .map(VideoCodecId::from)
    }
}

/// How an `onMetaData` property is stored.
#[derive(Clone, Copy)]
enum Property {
    Float(fn(&mut MetadataRecord, f64)),
    /// Decoded as a number and truncated towards zero.
    Integer(fn(&mut MetadataRecord, i64)),
    Boolean(fn(&mut MetadataRecord, bool)),
    Text(fn(&mut MetadataRecord, String)),
    KeyframeIndex,
}

fn known_property(name: &str) -> Option<Property> {
    use Property::*;

    let property = match name {
        "duration" => Float(|m, v| m.duration = Some(v)),
        "width" => Integer(|m, v| m.width = Some(v)),
        "height" => Integer(|m, v| m.height = Some(v)),
        "videodatarate" => Float(|m, v| m.video_data_rate = Some(v)),
        "framerate" => Float(|m, v| m.frame_rate = Some(v)),
        "videocodecid" => Integer(|m, v| m.video_codec_id = Some(v)),
        "audiodatarate" => Float(|m, v| m.audio_data_rate = Some(v)),
        "audiodelay" => Float(|m, v| m.audio_delay = Some(v)),
        "audiosamplerate" => Float(|m, v| m.audio_sample_rate = Some(v)),
        "audiosamplesize" => Integer(|m, v| m.audio_sample_size = Some(v)),
        "canSeekToEnd" => Boolean(|m, v| m.can_seek_to_end = Some(v)),
        "creationdate" => Text(|m, v| m.creation_date = Some(v)),
        "stereo" => Boolean(|m, v| m.stereo = Some(v)),
        "audiocodecid" => Integer(|m, v| m.audio_codec_id = Some(v)),
        "filesize" => Integer(|m, v| m.file_size = Some(v)),
        "lasttimestamp" => Float(|m, v| m.last_timestamp = Some(v)),
        "lastkeyframelocation" => Integer(|m, v| m.last_keyframe_location = Some(v)),
        "lastkeyframetimestamp" => Float(|m, v| m.last_keyframe_timestamp = Some(v)),
        "creator" => Text(|m, v| m.creator = Some(v)),
        "metadatacreator" => Text(|m, v| m.metadata_creator = Some(v)),
        "hasKeyframes" => Boolean(|m, v| m.has_keyframes = Some(v)),
        "hasVideo" => Boolean(|m, v| m.has_video = Some(v)),
        "hasAudio" => Boolean(|m, v| m.has_audio = Some(v)),
        "hasMetadata" => Boolean(|m, v| m.has_metadata = Some(v)),
        "datasize" => Integer(|m, v| m.data_size = Some(v)),
        "videosize" => Integer(|m, v| m.video_size = Some(v)),
        "audiosize" => Integer(|m, v| m.audio_size = Some(v)),
        "keyframes" => KeyframeIndex,
        _ => return None,
    };

    Some(property)
}

/// How decoding a script tag ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// The object-end marker closed the property list.
    Complete,
    /// The input ended before the property list was closed. The record holds what was read.
    Exhausted,
}

/// Decode an `onMetaData` script tag payload into `record`.
///
/// The reader must be positioned at the start of the payload. Known properties are stored
/// in `record` as they are read, so on error it holds everything decoded up to that point.
/// Unknown properties are skipped and reported to `sink`.
pub fn decode_on_meta_data<R, S>(
    reader: &mut R,
    record: &mut MetadataRecord,
    sink: &mut S,
    limits: DecodeLimits,
) -> Result<ScriptStatus, Amf0Error>
where
    R: io::Read,
    S: TraversalSink + ?Sized,
{
    let mut decoder = Amf0Decoder::with_limits(reader, limits);

    match decode_properties(&mut decoder, record, sink) {
        Ok(()) => Ok(ScriptStatus::Complete),
        Err(err) if err.is_stream_exhausted() => {
            tracing::debug!("script data ended before the object-end marker");
            Ok(ScriptStatus::Exhausted)
        }
        Err(err) => Err(err),
    }
}

fn decode_properties<R, S>(
    decoder: &mut Amf0Decoder<R>,
    record: &mut MetadataRecord,
    sink: &mut S,
) -> Result<(), Amf0Error>
where
    R: io::Read,
    S: TraversalSink + ?Sized,
{
    // The event name, conventionally "onMetaData".
    decoder.skip_value()?;
    decoder.decode_object_header()?;

    while let Some(name) = decoder.read_property_name()? {
        let Some(property) = known_property(&name) else {
            tracing::info!(property = %name, "skipped unknown property");
            sink.on_skipped_property(&name);
            decoder.skip_value()?;
            continue;
        };

        if let Property::KeyframeIndex = property {
            decode_keyframes(decoder, &mut record.keyframes)?;
            continue;
        }

        let value = decoder.decode_value()?;
        match (property, value) {
            (Property::Float(set), Amf0Value::Number(n)) => set(record, n),
            (Property::Integer(set), Amf0Value::Number(n)) => set(record, n as i64),
            (Property::Boolean(set), Amf0Value::Boolean(b)) => set(record, b),
            (Property::Text(set), Amf0Value::String(s) | Amf0Value::LongString(s)) => set(record, s),
            (_, value) => {
                tracing::warn!(property = %name, marker = ?value.marker(), "ignored property with unexpected type");
            }
        }
    }

    Ok(())
}

fn decode_keyframes<R>(decoder: &mut Amf0Decoder<R>, keyframes: &mut Keyframes) -> Result<(), Amf0Error>
where
    R: io::Read,
{
    decoder.decode_object_header()?;

    while let Some(name) = decoder.read_property_name()? {
        match name.as_str() {
            "filepositions" => {
                keyframes.positions = decoder.decode_number_array()?.into_iter().map(|n| n as i64).collect();
            }
            "times" => keyframes.times = decoder.decode_number_array()?,
            _ => {
                tracing::debug!(property = %name, "skipped keyframes property");
                decoder.skip_value()?;
            }
        }
    }

    if !keyframes.is_consistent() {
        tracing::warn!(
            positions = keyframes.positions.len(),
            times = keyframes.times.len(),
            "keyframe positions and times differ in length"
        );
    }

    Ok(())
}
