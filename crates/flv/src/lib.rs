//! Walks the tags of an FLV file and decodes its `onMetaData` script object.
//!
//! Audio and video payloads are skipped without being read, script data tags are
//! decoded into a [`MetadataRecord`](script::MetadataRecord) with the `flvprobe-amf0`
//! decoder. A traversal never panics on malformed input: it stops and reports the
//! error next to everything it decoded up to that point.
//!
//! ## Specifications
//!
//! | Name | Version | Link | Comments |
//! | --- | --- | --- | --- |
//! | Video File Format Specification | `10` | <https://github.com/veovera/enhanced-rtmp/blob/main/docs/legacy/video-file-format-v10-0-spec.pdf> | |
//! | Adobe Flash Video File Format Specification | `10.1` | <https://github.com/veovera/enhanced-rtmp/blob/main/docs/legacy/video-file-format-v10-1-spec.pdf> | Refered to as 'Legacy FLV spec' in this documentation |
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use flvprobe::file::FlvTraversal;
//!
//! // header only: "FLV", version 1, audio and video, header size 9
//! let data = [b'F', b'L', b'V', 1, 5, 0, 0, 0, 9];
//! let traversal = FlvTraversal::run(&mut Cursor::new(data));
//!
//! assert!(traversal.header_valid());
//! assert!(traversal.is_done());
//! assert_eq!(traversal.metadata.duration, None);
//! ```
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

pub mod codec;
pub mod error;
pub mod file;
pub mod header;
pub mod script;
pub mod sink;
pub mod tag;

pub use error::FlvError;
pub use file::{FlvTraversal, TagSummary, TraversalStatus};
pub use header::FlvHeader;
pub use script::{Keyframes, MetadataRecord, ScriptStatus, decode_on_meta_data};
pub use sink::TraversalSink;
pub use tag::{FlvTagHeader, FlvTagType};
