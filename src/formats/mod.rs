//! Load file format parsers.
//!
//! This module provides the two input interpretations:
//! - XEX: DOS binary load file made of address-tagged segments
//! - Raw: headerless image placed at a caller-supplied address

pub mod raw;
pub mod xex;

use byteorder::{ByteOrder, LittleEndian};

use crate::types::{InputFormat, LoadReport};

/// Magic values for format detection.
pub mod magic {
    /// Segment marker, stored little-endian as `FF FF`.
    pub const MARKER: u16 = 0xFFFF;
}

/// Size of a segment header (start and end address).
pub const HEADER_SIZE: usize = 4;

/// Detected layout of a load file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    /// Starts with the 0xFFFF marker
    Xex,
    /// No leading marker; the first two bytes are read as a start address
    Unmarked,
    /// Too short to hold a header
    Empty,
}

/// Detect the load file layout from its leading bytes.
pub fn detect_format(data: &[u8]) -> DetectedFormat {
    match read_u16(data, 0) {
        Some(magic::MARKER) => DetectedFormat::Xex,
        Some(_) if data.len() >= HEADER_SIZE => DetectedFormat::Unmarked,
        _ => DetectedFormat::Empty,
    }
}

/// Load all segments according to `format`.
pub fn load(data: &[u8], format: InputFormat, max_segments: Option<usize>) -> LoadReport {
    match format {
        InputFormat::Xex => xex::load_limited(data, max_segments),
        InputFormat::Raw { base } => raw::load(data, base),
    }
}

/// Read a little-endian u16, or `None` past the end of `data`.
pub fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    data.get(offset..end).map(LittleEndian::read_u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_marker() {
        assert_eq!(detect_format(&[0xFF, 0xFF, 0x00, 0x10]), DetectedFormat::Xex);
        assert_eq!(
            detect_format(&[0x00, 0x10, 0x00, 0x10, 0xEA]),
            DetectedFormat::Unmarked
        );
        assert_eq!(detect_format(&[0x00]), DetectedFormat::Empty);
        assert_eq!(detect_format(&[]), DetectedFormat::Empty);
    }

    #[test]
    fn test_read_u16() {
        let data = [0x34, 0x12, 0xCD];
        assert_eq!(read_u16(&data, 0), Some(0x1234));
        assert_eq!(read_u16(&data, 1), Some(0xCD12));
        assert_eq!(read_u16(&data, 2), None);
        assert_eq!(read_u16(&data, usize::MAX), None);
    }
}
