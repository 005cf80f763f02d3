use std::io::{self, Write};

use flvprobe::{FlvHeader, FlvTagHeader, FlvTraversal, MetadataRecord, TagSummary, TraversalSink};

/// Prints a line per header, tag and skipped property as the walker reaches them.
pub(crate) struct TagPrinter<W> {
    out: W,
    quiet: bool,
    tags: u64,
}

impl<W: Write> TagPrinter<W> {
    pub(crate) fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet, tags: 0 }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if self.quiet {
            return;
        }

        if let Err(err) = writeln!(self.out, "{args}") {
            tracing::warn!(error = %err, "failed to print trace line");
        }
    }
}

impl<W: Write> TraversalSink for TagPrinter<W> {
    fn on_header(&mut self, header: &FlvHeader) {
        self.line(format_args!(
            "header signature={} version={} audio={} video={} size={}",
            header.signature_str(),
            header.version,
            header.has_audio(),
            header.has_video(),
            header.header_size
        ));
    }

    fn on_tag(&mut self, tag: &FlvTagHeader) {
        self.tags += 1;
        let tags = self.tags;
        let tag_type = format!("{:?}", tag.tag_type);
        self.line(format_args!(
            "tag #{:<6} {:<12} size={:<8} timestamp={}ms",
            tags, tag_type, tag.data_size, tag.timestamp_ms
        ));
    }

    fn on_skipped_property(&mut self, name: &str) {
        self.line(format_args!("  skipped property {name}"));
    }
}

#[derive(serde_derive::Serialize)]
struct Report<'a> {
    header: Option<&'a FlvHeader>,
    header_valid: bool,
    summary: &'a TagSummary,
    metadata: &'a MetadataRecord,
    error: Option<String>,
}

pub(crate) fn print_json(traversal: &FlvTraversal) -> io::Result<()> {
    let report = Report {
        header: traversal.header.as_ref(),
        header_valid: traversal.header_valid(),
        summary: &traversal.summary,
        metadata: &traversal.metadata,
        error: traversal.error().map(ToString::to_string),
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)
}

macro_rules! field {
    ($name:literal, $value:expr) => {
        if let Some(value) = &$value {
            println!("  {:<24}{}", $name, value);
        }
    };
}

pub(crate) fn print_text(traversal: &FlvTraversal) {
    let summary = &traversal.summary;
    println!(
        "summary audio={} video={} script={} max_timestamp={}ms",
        summary.audio, summary.video, summary.script, summary.max_timestamp_ms
    );

    let m = &traversal.metadata;
    if *m == MetadataRecord::default() {
        println!("no onMetaData");
        return;
    }

    println!("onMetaData");
    field!("duration", m.duration);
    field!("width", m.width);
    field!("height", m.height);
    field!("framerate", m.frame_rate);
    field!("videodatarate", m.video_data_rate);
    field!("videocodecid", m.video_codec_id);
    if let Some(codec) = m.video_codec() {
        println!("  {:<24}{codec:?}", "video codec");
    }
    field!("audiodatarate", m.audio_data_rate);
    field!("audiodelay", m.audio_delay);
    field!("audiosamplerate", m.audio_sample_rate);
    field!("audiosamplesize", m.audio_sample_size);
    field!("audiocodecid", m.audio_codec_id);
    if let Some(format) = m.sound_format() {
        println!("  {:<24}{format:?}", "sound format");
    }
    field!("stereo", m.stereo);
    field!("canSeekToEnd", m.can_seek_to_end);
    field!("creationdate", m.creation_date);
    field!("creator", m.creator);
    field!("metadatacreator", m.metadata_creator);
    field!("filesize", m.file_size);
    field!("datasize", m.data_size);
    field!("videosize", m.video_size);
    field!("audiosize", m.audio_size);
    field!("lasttimestamp", m.last_timestamp);
    field!("lastkeyframelocation", m.last_keyframe_location);
    field!("lastkeyframetimestamp", m.last_keyframe_timestamp);
    field!("hasKeyframes", m.has_keyframes);
    field!("hasVideo", m.has_video);
    field!("hasAudio", m.has_audio);
    field!("hasMetadata", m.has_metadata);

    let keyframes = &m.keyframes;
    if !keyframes.is_empty() {
        println!(
            "  {:<24}{} positions, {} times",
            "keyframes",
            keyframes.positions.len(),
            keyframes.times.len()
        );
        for (position, time) in keyframes.iter() {
            println!("    {time:>10.3}s @ {position}");
        }
    }
}
