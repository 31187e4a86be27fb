//! Output formatters for disassembly results.
//!
//! This module provides the pure operand renderer used everywhere an
//! instruction becomes text, plus trait-based formatters that render a
//! whole [`Disassembly`] as an assembler listing, JSON, or a one-line
//! per-segment summary.

use crate::error::DisasmError;
use crate::types::{
    AddressingMode, DecodedSegment, Decoded, Disassembly, Instruction, Operand, TrailingData,
};
use std::path::Path;

/// Width of the raw-bytes column: three bytes, space separated.
pub const BYTES_COLUMN_WIDTH: usize = 8;

// =============================================================================
// Operand rendering
// =============================================================================

/// Render an operand in conventional 6502 assembler syntax.
///
/// Relative operands render as the branch destination. Missing operand
/// data renders as an empty string so the function is total.
pub fn format_operand(
    mode: AddressingMode,
    operand: Option<Operand>,
    branch_target: Option<u16>,
) -> String {
    let value = operand.map(Operand::value);
    match (mode, value) {
        (AddressingMode::Accumulator, _) => "A".to_string(),
        (AddressingMode::Relative, _) => match (branch_target, value) {
            (Some(target), _) => format!("${:04X}", target),
            (None, Some(v)) => format!("${:02X}", v),
            (None, None) => String::new(),
        },
        (AddressingMode::Implicit, _) | (_, None) => String::new(),
        (AddressingMode::Immediate, Some(v)) => format!("#${:02X}", v),
        (AddressingMode::ZeroPage, Some(v)) => format!("${:02X}", v),
        (AddressingMode::ZeroPageX, Some(v)) => format!("${:02X},X", v),
        (AddressingMode::ZeroPageY, Some(v)) => format!("${:02X},Y", v),
        (AddressingMode::Absolute, Some(v)) => format!("${:04X}", v),
        (AddressingMode::AbsoluteX, Some(v)) => format!("${:04X},X", v),
        (AddressingMode::AbsoluteY, Some(v)) => format!("${:04X},Y", v),
        (AddressingMode::Indirect, Some(v)) => format!("(${:04X})", v),
        (AddressingMode::IndexedIndirect, Some(v)) => format!("(${:02X},X)", v),
        (AddressingMode::IndirectIndexed, Some(v)) => format!("(${:02X}),Y", v),
    }
}

/// Render mnemonic and operand, e.g. `LDA #$05`.
pub fn format_instruction_text(
    mnemonic: &str,
    mode: AddressingMode,
    operand: Option<Operand>,
    branch_target: Option<u16>,
) -> String {
    let operand = format_operand(mode, operand, branch_target);
    if operand.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{} {}", mnemonic, operand)
    }
}

/// Render a decoded instruction's assembler text.
pub fn instruction_text(insn: &Instruction) -> String {
    format_instruction_text(insn.mnemonic, insn.mode, insn.operand, insn.branch_target)
}

/// Space-separated upper-case hex bytes.
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one listing line.
///
/// ```text
/// 1000  A9 05     LDA #$05
/// 1002: 02 ???
/// 1003: 4C 00 (Partial)
/// ```
pub fn format_decoded(decoded: &Decoded) -> String {
    match decoded {
        Decoded::Instruction(insn) => format!(
            "{:04X}  {:<width$}  {}",
            insn.address,
            format_bytes(&insn.bytes),
            instruction_text(insn),
            width = BYTES_COLUMN_WIDTH
        ),
        Decoded::Unknown { address, opcode } => format!("{:04X}: {:02X} ???", address, opcode),
        Decoded::Partial { address, bytes, .. } => {
            format!("{:04X}: {} (Partial)", address, format_bytes(bytes))
        }
    }
}

// =============================================================================
// Listing formatters
// =============================================================================

/// Trait for formatting disassembly results.
///
/// Implementors render each component of a [`Disassembly`]; the default
/// [`format_listing`](ListingFormatter::format_listing) stitches them
/// together in file order.
pub trait ListingFormatter {
    /// Format the per-file header.
    fn format_header(&self, path: &Path, disasm: &Disassembly) -> Option<String>;

    /// Format one segment and its decoded contents.
    fn format_segment(&self, segment: &DecodedSegment) -> String;

    /// Format the trailing-data diagnostic.
    fn format_trailing(&self, trailing: &TrailingData) -> Option<String>;

    /// Format the error that stopped loading.
    fn format_error(&self, error: &DisasmError) -> Option<String>;

    /// Format the complete listing.
    fn format_listing(&self, disasm: &Disassembly, path: &Path) -> String {
        let mut parts = Vec::new();

        if let Some(s) = self.format_header(path, disasm) {
            parts.push(s);
        }
        for segment in &disasm.segments {
            parts.push(self.format_segment(segment));
        }
        if let Some(s) = disasm.trailing.as_ref().and_then(|t| self.format_trailing(t)) {
            parts.push(s);
        }
        if let Some(s) = disasm.error.as_ref().and_then(|e| self.format_error(e)) {
            parts.push(s);
        }

        parts.join("")
    }
}

/// Assembler listing formatter.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    /// Print a file header with format and segment counts
    pub verbose: bool,
}

impl HumanFormatter {
    /// Create a new listing formatter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter that also prints a file header.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl ListingFormatter for HumanFormatter {
    fn format_header(&self, path: &Path, disasm: &Disassembly) -> Option<String> {
        if !self.verbose {
            return None;
        }
        Some(format!(
            "; File: {}\n; Format: {}, {} segment(s), {} marker(s), {} item(s)\n",
            path.display(),
            disasm.format,
            disasm.segments.len(),
            disasm.markers,
            disasm.instruction_count()
        ))
    }

    fn format_segment(&self, segment: &DecodedSegment) -> String {
        let mut s = format!("; Segment {}\n", segment.segment);
        for decoded in &segment.instructions {
            s.push_str(&format_decoded(decoded));
            s.push('\n');
        }
        s.push_str(";\n");
        s
    }

    fn format_trailing(&self, trailing: &TrailingData) -> Option<String> {
        Some(format!(
            "; Trailing data at offset {}: {}\n",
            trailing.offset,
            hex::encode(&trailing.bytes)
        ))
    }

    fn format_error(&self, error: &DisasmError) -> Option<String> {
        Some(format!("; Error: {}\n", error))
    }
}

/// JSON output formatter.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonFormatter {
    /// Create a new JSON formatter with pretty printing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact JSON formatter.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl ListingFormatter for JsonFormatter {
    fn format_header(&self, _path: &Path, _disasm: &Disassembly) -> Option<String> {
        None // Handled in format_listing
    }

    fn format_segment(&self, _segment: &DecodedSegment) -> String {
        String::new() // Handled in format_listing
    }

    fn format_trailing(&self, _trailing: &TrailingData) -> Option<String> {
        None // Handled in format_listing
    }

    fn format_error(&self, _error: &DisasmError) -> Option<String> {
        None // Handled in format_listing
    }

    fn format_listing(&self, disasm: &Disassembly, path: &Path) -> String {
        #[derive(serde::Serialize)]
        struct JsonOutput {
            file: String,
            format: String,
            markers: usize,
            segments: Vec<SegmentJson>,
            trailing: Option<TrailingJson>,
            error: Option<String>,
        }

        #[derive(serde::Serialize)]
        struct SegmentJson {
            start: String,
            end: String,
            len: usize,
            instructions: Vec<InstructionJson>,
        }

        #[derive(serde::Serialize)]
        struct InstructionJson {
            address: String,
            bytes: String,
            kind: &'static str,
            mnemonic: Option<&'static str>,
            mode: Option<&'static str>,
            operand: Option<u16>,
            branch_target: Option<String>,
            text: String,
        }

        #[derive(serde::Serialize)]
        struct TrailingJson {
            offset: usize,
            bytes: String,
        }

        let instruction_json = |d: &Decoded| {
            let (kind, insn) = match d {
                Decoded::Instruction(insn) => ("instruction", Some(insn)),
                Decoded::Unknown { .. } => ("unknown", None),
                Decoded::Partial { .. } => ("partial", None),
            };
            InstructionJson {
                address: format!("{:04X}", d.address()),
                bytes: format_bytes(d.bytes()),
                kind,
                mnemonic: insn.map(|i| i.mnemonic),
                mode: insn.map(|i| i.mode.name()),
                operand: insn.and_then(|i| i.operand).map(Operand::value),
                branch_target: insn
                    .and_then(|i| i.branch_target)
                    .map(|t| format!("{:04X}", t)),
                text: match insn {
                    Some(i) => instruction_text(i),
                    None if d.is_unknown() => "???".to_string(),
                    None => "(Partial)".to_string(),
                },
            }
        };

        let output = JsonOutput {
            file: path.display().to_string(),
            format: disasm.format.to_string(),
            markers: disasm.markers,
            segments: disasm
                .segments
                .iter()
                .map(|s| SegmentJson {
                    start: format!("{:04X}", s.segment.start),
                    end: format!("{:04X}", s.segment.end),
                    len: s.segment.len(),
                    instructions: s.instructions.iter().map(&instruction_json).collect(),
                })
                .collect(),
            trailing: disasm.trailing.as_ref().map(|t| TrailingJson {
                offset: t.offset,
                bytes: hex::encode(&t.bytes),
            }),
            error: disasm.error.as_ref().map(ToString::to_string),
        };

        let mut s = if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        };
        s.push('\n');
        s
    }
}

/// Segment summary formatter, one line per segment.
#[derive(Debug, Clone, Default)]
pub struct ShortFormatter {
    /// Omit the file line
    pub quiet: bool,
}

impl ShortFormatter {
    /// Create a new short formatter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListingFormatter for ShortFormatter {
    fn format_header(&self, path: &Path, disasm: &Disassembly) -> Option<String> {
        if self.quiet {
            return None;
        }
        Some(format!(
            "File: {} ({}, {} marker(s))\n",
            path.display(),
            disasm.format,
            disasm.markers
        ))
    }

    fn format_segment(&self, segment: &DecodedSegment) -> String {
        let seg = &segment.segment;
        format!(
            "Segment: Start ${:04X}, End ${:04X}, Len {} bytes\n",
            seg.start,
            seg.end,
            seg.len()
        )
    }

    fn format_trailing(&self, trailing: &TrailingData) -> Option<String> {
        Some(format!(
            "Trailing data at {}: {}\n",
            trailing.offset,
            hex::encode(&trailing.bytes)
        ))
    }

    fn format_error(&self, error: &DisasmError) -> Option<String> {
        Some(format!("Error: {}\n", error))
    }
}
