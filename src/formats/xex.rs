//! DOS binary load file (XEX) segment loader.
//!
//! A load file is a sequence of segments, each introduced by a header of
//! two little-endian words: start address and inclusive end address. The
//! body follows immediately. A `FF FF` marker opens the file and may be
//! repeated in front of any later header.
//!
//! ```text
//! [FF FF] start:u16 end:u16 body[end-start+1] [FF FF] start:u16 end:u16 ...
//! ```
//!
//! A header whose end precedes its start, or whose body would run past the
//! end of the stream, stops loading with [`DisasmError::MalformedSegment`].
//! Segments read before that point stay valid. One to three bytes left
//! after the last segment are reported as [`TrailingData`].

use tracing::{debug, warn};

use crate::error::{DisasmError, Result};
use crate::formats::{magic, read_u16, HEADER_SIZE};
use crate::types::{LoadReport, Segment, TrailingData};

/// Lazy reader yielding the segments of a load file in file order.
///
/// The reader is fused: after the stream is exhausted, or after it yields
/// an error, every further call to `next` returns `None`.
#[derive(Debug, Clone)]
pub struct SegmentReader<'a> {
    data: &'a [u8],
    pos: usize,
    started: bool,
    done: bool,
    markers: usize,
    trailing: Option<TrailingData>,
}

impl<'a> SegmentReader<'a> {
    /// Create a reader over a complete load file.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            started: false,
            done: false,
            markers: 0,
            trailing: None,
        }
    }

    /// Current stream offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of markers consumed so far.
    pub fn markers(&self) -> usize {
        self.markers
    }

    /// Residual bytes found at the end of the stream, once reached.
    pub fn trailing(&self) -> Option<&TrailingData> {
        self.trailing.as_ref()
    }

    /// Consume the reader, returning its trailing-data diagnostic.
    pub fn into_trailing(self) -> Option<TrailingData> {
        self.trailing
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn skip_marker(&mut self) {
        if read_u16(self.data, self.pos) == Some(magic::MARKER) {
            debug!(offset = self.pos, "segment marker");
            self.pos += 2;
            self.markers += 1;
        }
    }

    fn read_segment(&mut self) -> Option<Result<Segment>> {
        if !self.started {
            self.started = true;
            self.skip_marker();
        }
        self.skip_marker();

        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }
        if remaining < HEADER_SIZE {
            let trailing = TrailingData {
                offset: self.pos,
                bytes: self.data[self.pos..].to_vec(),
            };
            warn!(
                offset = trailing.offset,
                len = trailing.bytes.len(),
                "trailing data after last segment"
            );
            self.pos = self.data.len();
            self.trailing = Some(trailing);
            return None;
        }

        let offset = self.pos;
        let start = read_u16(self.data, offset)?;
        let end = read_u16(self.data, offset + 2)?;
        self.pos += HEADER_SIZE;

        let available = self.remaining();
        let needed = end.checked_sub(start).map_or(0, |span| span as usize + 1);
        if needed == 0 || needed > available {
            warn!(offset, start, end, needed, available, "malformed segment");
            return Some(Err(DisasmError::MalformedSegment {
                offset,
                start,
                end,
                needed,
                available,
            }));
        }

        let bytes = self.data[self.pos..self.pos + needed].to_vec();
        self.pos += needed;
        debug!(offset, start, end, len = needed, "segment");

        Some(Ok(Segment { start, end, bytes }))
    }
}

impl Iterator for SegmentReader<'_> {
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_segment();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl std::iter::FusedIterator for SegmentReader<'_> {}

/// Scan an entire load file.
pub fn load(data: &[u8]) -> LoadReport {
    load_limited(data, None)
}

/// Scan a load file, stopping after `max_segments` segments if given.
pub fn load_limited(data: &[u8], max_segments: Option<usize>) -> LoadReport {
    let mut reader = SegmentReader::new(data);
    let mut report = LoadReport::default();

    while max_segments.map_or(true, |max| report.segments.len() < max) {
        match reader.next() {
            Some(Ok(segment)) => report.segments.push(segment),
            Some(Err(e)) => {
                report.error = Some(e);
                break;
            }
            None => break,
        }
    }

    report.markers = reader.markers();
    report.trailing = reader.into_trailing();
    report
}
