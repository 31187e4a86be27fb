//! XEX Disasm - Segment Loader and 6502 Disassembler
//!
//! This library recovers readable structure from 8-bit binary load files:
//! it splits a DOS binary load file into its address-tagged segments and
//! decodes each segment into 6502 assembly.
//!
//! # Features
//!
//! - **Segment Loading**: Parses `FF FF`-marked load files, tolerating
//!   missing and repeated markers
//! - **Best-Effort Decoding**: Unknown opcodes and truncated instructions
//!   are reported inline instead of aborting
//! - **Exact Branch Targets**: Relative branches are resolved with 16-bit
//!   wrap-around
//! - **Multiple Outputs**: Assembler listing, JSON, and segment summaries
//!
//! # Quick Start
//!
//! ```rust
//! use xex_disasm::{disassemble_bytes, formatter::format_decoded};
//!
//! let data = [0xFF, 0xFF, 0x00, 0x10, 0x02, 0x10, 0xA9, 0x05, 0x4C];
//! let result = disassemble_bytes(&data);
//!
//! let lines: Vec<String> = result.segments[0]
//!     .instructions
//!     .iter()
//!     .map(format_decoded)
//!     .collect();
//! assert_eq!(lines[0], "1000  A9 05     LDA #$05");
//! assert_eq!(lines[1], "1002: 4C (Partial)");
//! ```
//!
//! # Error Handling
//!
//! Nothing that goes wrong inside a file discards what was already decoded.
//! A malformed segment header stops loading but keeps earlier segments;
//! unknown opcodes and partial instructions are ordinary
//! [`Decoded`] values.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod architectures;
pub mod decoder;
pub mod error;
pub mod formats;
pub mod formatter;
pub mod types;

pub use decoder::{decode, Decoder};
pub use error::{DisasmError, Result};
pub use formats::xex::SegmentReader;
pub use types::{
    AddressingMode, Decoded, DecodedSegment, DisasmOptions, Disassembly, InputFormat,
    Instruction, LoadReport, OpcodeEntry, Operand, Segment, TrailingData,
};

use std::path::Path;
use tracing::debug;

/// Disassemble a load file by path.
///
/// # Errors
///
/// Returns [`DisasmError::ConfigError`] for invalid options and
/// [`DisasmError::Io`] if the file cannot be read. Problems inside
/// the file are reported in the returned [`Disassembly`].
///
/// # Example
///
/// ```rust,no_run
/// use xex_disasm::{disassemble_file, DisasmOptions};
///
/// let result = disassemble_file("game.xex", &DisasmOptions::new())?;
/// println!("{} segments", result.segments.len());
/// # Ok::<(), xex_disasm::DisasmError>(())
/// ```
pub fn disassemble_file<P: AsRef<Path>>(path: P, options: &DisasmOptions) -> Result<Disassembly> {
    options.validate()?;
    let data = std::fs::read(path)?;
    Ok(disassemble_bytes_with_options(&data, options))
}

/// Disassemble a load file held in memory with default options.
pub fn disassemble_bytes(data: &[u8]) -> Disassembly {
    disassemble_bytes_with_options(data, &DisasmOptions::new())
}

/// Disassemble an in-memory buffer with custom options.
///
/// Segments are decoded in file order. Loader diagnostics (trailing bytes,
/// a malformed header) are carried in the result alongside every segment
/// read before them.
pub fn disassemble_bytes_with_options(data: &[u8], options: &DisasmOptions) -> Disassembly {
    let report = formats::load(data, options.format, options.max_segments);
    debug!(
        format = %options.format,
        layout = ?formats::detect_format(data),
        segments = report.segments.len(),
        markers = report.markers,
        "loaded"
    );

    let segments = report
        .segments
        .into_iter()
        .map(|segment| {
            let instructions = if options.decode {
                decoder::decode_segment(&segment)
            } else {
                Vec::new()
            };
            DecodedSegment {
                segment,
                instructions,
            }
        })
        .collect();

    Disassembly {
        format: options.format,
        segments,
        trailing: report.trailing,
        error: report.error,
        markers: report.markers,
    }
}

/// Split a load file into segments without decoding them.
pub fn load_segments(data: &[u8]) -> LoadReport {
    formats::xex::load(data)
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_end_to_end() {
        let data = [
            0xFF, 0xFF, 0x00, 0x10, 0x02, 0x10, 0xA9, 0x05, 0x4C,
        ];
        let result = disassemble_bytes(&data);

        assert!(result.is_complete());
        assert!(result.trailing.is_none());
        assert_eq!(result.segments.len(), 1);

        let seg = &result.segments[0];
        assert_eq!(seg.segment.start, 0x1000);
        assert_eq!(seg.segment.end, 0x1002);
        assert_eq!(seg.segment.bytes, vec![0xA9, 0x05, 0x4C]);
        assert_eq!(seg.instructions.len(), 2);

        let lda = seg.instructions[0].as_instruction().unwrap();
        assert_eq!(lda.address, 0x1000);
        assert_eq!(lda.mnemonic, "LDA");
        assert_eq!(lda.operand, Some(Operand::Byte(0x05)));
        assert_eq!(formatter::instruction_text(lda), "LDA #$05");

        assert_eq!(
            seg.instructions[1],
            Decoded::Partial {
                address: 0x1002,
                opcode: 0x4C,
                bytes: vec![0x4C],
                expected_len: 3,
            }
        );
    }

    #[test]
    fn test_segments_decoded_independently() {
        let data = [
            0xFF, 0xFF, 0x00, 0x20, 0x00, 0x20, 0x20, // JSR cut short
            0xFF, 0xFF, 0x00, 0x30, 0x00, 0x30, 0x60, // RTS
        ];
        let result = disassemble_bytes(&data);

        assert_eq!(result.segments.len(), 2);
        assert!(result.segments[0].instructions[0].is_partial());
        let rts = result.segments[1].instructions[0].as_instruction().unwrap();
        assert_eq!(rts.mnemonic, "RTS");
        assert_eq!(rts.address, 0x3000);
    }

    #[test]
    fn test_malformed_keeps_earlier_segments() {
        let data = [
            0xFF, 0xFF, 0x00, 0x10, 0x00, 0x10, 0xEA, // ok
            0x00, 0x20, 0x10, 0x20, 0xEA, // 17 bytes declared, 1 present
        ];
        let result = disassemble_bytes(&data);

        assert!(!result.is_complete());
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.instruction_count(), 1);
        assert!(result.error.as_ref().is_some_and(DisasmError::is_malformed));
    }

    #[test]
    fn test_summary_options() {
        let data = [0xFF, 0xFF, 0x00, 0x10, 0x01, 0x10, 0xEA, 0xEA];
        let result = disassemble_bytes_with_options(&data, &DisasmOptions::summary());
        assert_eq!(result.segments.len(), 1);
        assert!(result.segments[0].instructions.is_empty());
    }

    #[test]
    fn test_raw_options() {
        let data = [0xFF, 0xFF, 0xEA];
        let result = disassemble_bytes_with_options(&data, &DisasmOptions::raw(0x0600));
        assert_eq!(result.markers, 0);
        assert_eq!(result.instruction_count(), 3);
        assert_eq!(result.segments[0].instructions[2].address(), 0x0602);
    }

    #[test]
    fn test_max_segments_option() {
        let data = [
            0x00, 0x10, 0x00, 0x10, 0xEA, 0x00, 0x11, 0x00, 0x11, 0xEA,
        ];
        let options = DisasmOptions {
            max_segments: Some(1),
            ..DisasmOptions::new()
        };
        let result = disassemble_bytes_with_options(&data, &options);
        assert_eq!(result.segments.len(), 1);
    }

    #[test]
    fn test_load_segments() {
        let report = load_segments(&[0xFF, 0xFF, 0x00, 0x10, 0x00, 0x10, 0xEA, 0x00]);
        assert_eq!(report.segments.len(), 1);
        assert_eq!(report.trailing.map(|t| t.offset), Some(7));
    }

    #[test]
    fn test_disassemble_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFF, 0x00, 0x06, 0x02, 0x06, 0xA2, 0x00, 0x60])
            .unwrap();

        let result = disassemble_file(file.path(), &DisasmOptions::new()).unwrap();
        assert_eq!(result.instruction_count(), 2);
    }

    #[test]
    fn test_disassemble_missing_file() {
        let err = disassemble_file("/nonexistent/game.xex", &DisasmOptions::new()).unwrap_err();
        assert!(matches!(err, DisasmError::Io(_)));
    }
}
