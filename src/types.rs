//! Core types for the disassembler.
//!
//! This module defines the values that flow between the segment loader,
//! the instruction decoder and the formatters: segments, opcode
//! descriptors, decoded instructions and the options that drive a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DisasmError;

// =============================================================================
// Segments
// =============================================================================

/// A contiguous block of program bytes destined for a fixed memory range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// First load address.
    pub start: u16,
    /// Last load address (inclusive).
    pub end: u16,
    /// Segment body; `end - start + 1` bytes.
    pub bytes: Vec<u8>,
}

impl Segment {
    /// Number of bytes in the segment body.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the segment body is empty. Loaded segments never are.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}-{:04X}", self.start, self.end)
    }
}

/// Residue at the end of a load file that is too short to be a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingData {
    /// Stream offset of the first residual byte.
    pub offset: usize,
    /// The residual bytes (1 to 3 of them).
    pub bytes: Vec<u8>,
}

/// Outcome of scanning a whole load file for segments.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Segments in file order.
    pub segments: Vec<Segment>,
    /// Residual bytes that could not form a header.
    pub trailing: Option<TrailingData>,
    /// The condition that stopped the scan early, if any.
    pub error: Option<DisasmError>,
    /// Number of 0xFFFF markers consumed.
    pub markers: usize,
}

impl LoadReport {
    /// Total bytes held by all segment bodies.
    pub fn payload_len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}

// =============================================================================
// Opcode table types
// =============================================================================

/// Operand encoding scheme of a 6502 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressingMode {
    /// No operand (`CLC`).
    Implicit,
    /// Operates on the accumulator (`ASL A`).
    Accumulator,
    /// `#$nn`
    Immediate,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`
    ZeroPageX,
    /// `$nn,Y`
    ZeroPageY,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
    /// `($nnnn)`, only used by `JMP`.
    Indirect,
    /// `($nn,X)`
    IndexedIndirect,
    /// `($nn),Y`
    IndirectIndexed,
    /// Signed 8-bit displacement from the next instruction.
    Relative,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u8 {
        match self {
            AddressingMode::Implicit | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed
            | AddressingMode::Relative => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }

    /// Short name used in JSON and debug output.
    pub const fn name(self) -> &'static str {
        match self {
            AddressingMode::Implicit => "implicit",
            AddressingMode::Accumulator => "accumulator",
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zero_page",
            AddressingMode::ZeroPageX => "zero_page_x",
            AddressingMode::ZeroPageY => "zero_page_y",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute_x",
            AddressingMode::AbsoluteY => "absolute_y",
            AddressingMode::Indirect => "indirect",
            AddressingMode::IndexedIndirect => "indexed_indirect",
            AddressingMode::IndirectIndexed => "indirect_indexed",
            AddressingMode::Relative => "relative",
        }
    }

    /// All addressing modes.
    pub const ALL: [AddressingMode; 13] = [
        AddressingMode::Implicit,
        AddressingMode::Accumulator,
        AddressingMode::Immediate,
        AddressingMode::ZeroPage,
        AddressingMode::ZeroPageX,
        AddressingMode::ZeroPageY,
        AddressingMode::Absolute,
        AddressingMode::AbsoluteX,
        AddressingMode::AbsoluteY,
        AddressingMode::Indirect,
        AddressingMode::IndexedIndirect,
        AddressingMode::IndirectIndexed,
        AddressingMode::Relative,
    ];
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Static descriptor of one defined opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    /// Opcode byte.
    pub opcode: u8,
    /// Assembler mnemonic, upper case.
    pub mnemonic: &'static str,
    /// Operand encoding.
    pub mode: AddressingMode,
    /// Total instruction length including the opcode (1 to 3).
    pub len: u8,
}

// =============================================================================
// Decoded instructions
// =============================================================================

/// Operand value as stored in the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// Single operand byte.
    Byte(u8),
    /// Two operand bytes, little-endian.
    Word(u16),
}

impl Operand {
    /// Operand widened to 16 bits.
    pub const fn value(self) -> u16 {
        match self {
            Operand::Byte(b) => b as u16,
            Operand::Word(w) => w,
        }
    }
}

/// A fully decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Load address of the opcode byte.
    pub address: u16,
    /// Opcode byte.
    pub opcode: u8,
    /// Opcode and operand bytes as they appear in the segment.
    pub bytes: Vec<u8>,
    /// Assembler mnemonic.
    pub mnemonic: &'static str,
    /// Addressing mode.
    pub mode: AddressingMode,
    /// Operand, absent for implicit and accumulator modes.
    pub operand: Option<Operand>,
    /// Branch destination, present only in relative mode.
    pub branch_target: Option<u16>,
}

/// Result of decoding one position in a segment.
///
/// Unknown opcodes and truncated instructions are ordinary outcomes so a
/// listing shows exactly what the decoder saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoded {
    /// A complete instruction.
    Instruction(Instruction),
    /// A byte with no opcode table entry.
    Unknown {
        /// Address of the byte.
        address: u16,
        /// The byte itself.
        opcode: u8,
    },
    /// An opcode whose operand runs past the end of the segment.
    Partial {
        /// Address of the opcode byte.
        address: u16,
        /// The opcode byte.
        opcode: u8,
        /// All bytes left in the segment, opcode first.
        bytes: Vec<u8>,
        /// Length the opcode requires.
        expected_len: u8,
    },
}

impl Decoded {
    /// Address of the first byte.
    pub fn address(&self) -> u16 {
        match self {
            Decoded::Instruction(insn) => insn.address,
            Decoded::Unknown { address, .. } | Decoded::Partial { address, .. } => *address,
        }
    }

    /// Bytes consumed from the segment.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Decoded::Instruction(insn) => &insn.bytes,
            Decoded::Unknown { opcode, .. } => std::slice::from_ref(opcode),
            Decoded::Partial { bytes, .. } => bytes,
        }
    }

    /// Number of bytes consumed.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Always false; every outcome consumes at least the opcode byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Address immediately after the consumed bytes, wrapping at 64K.
    pub fn next_address(&self) -> u16 {
        self.address().wrapping_add(self.len() as u16)
    }

    /// The instruction, if decoding succeeded.
    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            Decoded::Instruction(insn) => Some(insn),
            _ => None,
        }
    }

    /// Whether this is an unknown opcode.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Decoded::Unknown { .. })
    }

    /// Whether this is a truncated instruction.
    pub fn is_partial(&self) -> bool {
        matches!(self, Decoded::Partial { .. })
    }
}

/// A segment together with its decoded contents.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedSegment {
    /// The loaded segment.
    pub segment: Segment,
    /// Decoder output; empty when decoding was disabled.
    pub instructions: Vec<Decoded>,
}

/// Result of disassembling a whole input buffer.
#[derive(Debug)]
pub struct Disassembly {
    /// How the input was interpreted.
    pub format: InputFormat,
    /// Segments in file order with their decoded contents.
    pub segments: Vec<DecodedSegment>,
    /// Residual bytes at the end of the stream.
    pub trailing: Option<TrailingData>,
    /// The condition that stopped segment loading early, if any.
    pub error: Option<DisasmError>,
    /// Number of 0xFFFF markers consumed.
    pub markers: usize,
}

impl Disassembly {
    /// Total decoded items across all segments.
    pub fn instruction_count(&self) -> usize {
        self.segments.iter().map(|s| s.instructions.len()).sum()
    }

    /// Whether the whole input was consumed without a loader error.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

// =============================================================================
// Options
// =============================================================================

/// How the input buffer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Segmented load file with optional 0xFFFF markers.
    Xex,
    /// Headerless image loaded at `base`.
    Raw {
        /// Load address of the first byte.
        base: u16,
    },
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Xex => write!(f, "XEX"),
            InputFormat::Raw { base } => write!(f, "Raw @ ${:04X}", base),
        }
    }
}

/// Options controlling a disassembly run.
#[derive(Debug, Clone)]
pub struct DisasmOptions {
    /// Input interpretation.
    pub format: InputFormat,
    /// Stop loading after this many segments
    pub max_segments: Option<usize>,
    /// Decode segment contents; false produces a segment summary only.
    pub decode: bool,
}

impl DisasmOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            format: InputFormat::Xex,
            max_segments: None,
            decode: true,
        }
    }

    /// Create options that only list segments.
    pub fn summary() -> Self {
        Self {
            decode: false,
            ..Self::new()
        }
    }

    /// Create options for a headerless image at `base`.
    pub fn raw(base: u16) -> Self {
        Self {
            format: InputFormat::Raw { base },
            ..Self::new()
        }
    }
}

impl DisasmOptions {
    /// Check that the options describe a run that can produce output.
    pub fn validate(&self) -> Result<(), DisasmError> {
        if self.max_segments == Some(0) {
            return Err(DisasmError::ConfigError {
                message: "max_segments must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DisasmOptions {
    fn default() -> Self {
        Self::new()
    }
}
