//! Observer for the tag-stream walk.

use crate::header::FlvHeader;
use crate::tag::FlvTagHeader;

/// Receives the headers and tags as they are traversed.
///
/// Every method defaults to doing nothing, and `()` implements the trait for headless use.
/// The walker also emits the same events through [`tracing`].
pub trait TraversalSink {
    /// Called once with the file header, before it is validated.
    fn on_header(&mut self, header: &FlvHeader) {
        let _ = header;
    }

    /// Called for every tag header, before its payload is processed.
    fn on_tag(&mut self, tag: &FlvTagHeader) {
        let _ = tag;
    }

    /// Called for every `onMetaData` property whose name is not recognised.
    fn on_skipped_property(&mut self, name: &str) {
        let _ = name;
    }
}

impl TraversalSink for () {}

impl<S: TraversalSink + ?Sized> TraversalSink for &mut S {
    fn on_header(&mut self, header: &FlvHeader) {
        (**self).on_header(header);
    }

    fn on_tag(&mut self, tag: &FlvTagHeader) {
        (**self).on_tag(tag);
    }

    fn on_skipped_property(&mut self, name: &str) {
        (**self).on_skipped_property(name);
    }
}
