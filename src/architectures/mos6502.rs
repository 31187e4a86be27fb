//! MOS 6502 opcode table.
//!
//! The NMOS 6502 used in the Atari 8-bit line, the Apple II and the
//! Commodore machines defines 151 documented opcodes across 56 mnemonics.
//! The remaining 105 byte values are undocumented or jam the CPU; the
//! decoder reports them as unknown rather than guessing at their behavior.
//!
//! Key characteristics:
//! - **Little-endian** 16-bit operands
//! - **Variable-length instructions**: 1 to 3 bytes, byte-aligned
//! - **Branches** take a signed 8-bit displacement from the address of the
//!   following instruction
//! - `JMP ($xxxx)` is the only indirect absolute form
//!
//! References:
//! - MOS Technology MCS6500 Microcomputer Family Programming Manual

use crate::types::{AddressingMode, OpcodeEntry};

use crate::types::AddressingMode::{
    Absolute as Abs, AbsoluteX as AbsX, AbsoluteY as AbsY, Accumulator as Acc,
    Immediate as Imm, Implicit as Impl, IndexedIndirect as IndX, Indirect as Ind,
    IndirectIndexed as IndY, Relative as Rel, ZeroPage as Zp, ZeroPageX as ZpX,
    ZeroPageY as ZpY,
};

/// Number of documented opcodes.
pub const DOCUMENTED_OPCODES: usize = 151;

const fn op(opcode: u8, mnemonic: &'static str, mode: AddressingMode) -> OpcodeEntry {
    OpcodeEntry {
        opcode,
        mnemonic,
        mode,
        len: 1 + mode.operand_len(),
    }
}

/// Every documented opcode, in opcode order.
pub const OPCODES: [OpcodeEntry; DOCUMENTED_OPCODES] = [
    // 0x00
    op(0x00, "BRK", Impl),
    op(0x01, "ORA", IndX),
    op(0x05, "ORA", Zp),
    op(0x06, "ASL", Zp),
    op(0x08, "PHP", Impl),
    op(0x09, "ORA", Imm),
    op(0x0A, "ASL", Acc),
    op(0x0D, "ORA", Abs),
    op(0x0E, "ASL", Abs),
    // 0x10
    op(0x10, "BPL", Rel),
    op(0x11, "ORA", IndY),
    op(0x15, "ORA", ZpX),
    op(0x16, "ASL", ZpX),
    op(0x18, "CLC", Impl),
    op(0x19, "ORA", AbsY),
    op(0x1D, "ORA", AbsX),
    op(0x1E, "ASL", AbsX),
    // 0x20
    op(0x20, "JSR", Abs),
    op(0x21, "AND", IndX),
    op(0x24, "BIT", Zp),
    op(0x25, "AND", Zp),
    op(0x26, "ROL", Zp),
    op(0x28, "PLP", Impl),
    op(0x29, "AND", Imm),
    op(0x2A, "ROL", Acc),
    op(0x2C, "BIT", Abs),
    op(0x2D, "AND", Abs),
    op(0x2E, "ROL", Abs),
    // 0x30
    op(0x30, "BMI", Rel),
    op(0x31, "AND", IndY),
    op(0x35, "AND", ZpX),
    op(0x36, "ROL", ZpX),
    op(0x38, "SEC", Impl),
    op(0x39, "AND", AbsY),
    op(0x3D, "AND", AbsX),
    op(0x3E, "ROL", AbsX),
    // 0x40
    op(0x40, "RTI", Impl),
    op(0x41, "EOR", IndX),
    op(0x45, "EOR", Zp),
    op(0x46, "LSR", Zp),
    op(0x48, "PHA", Impl),
    op(0x49, "EOR", Imm),
    op(0x4A, "LSR", Acc),
    op(0x4C, "JMP", Abs),
    op(0x4D, "EOR", Abs),
    op(0x4E, "LSR", Abs),
    // 0x50
    op(0x50, "BVC", Rel),
    op(0x51, "EOR", IndY),
    op(0x55, "EOR", ZpX),
    op(0x56, "LSR", ZpX),
    op(0x58, "CLI", Impl),
    op(0x59, "EOR", AbsY),
    op(0x5D, "EOR", AbsX),
    op(0x5E, "LSR", AbsX),
    // 0x60
    op(0x60, "RTS", Impl),
    op(0x61, "ADC", IndX),
    op(0x65, "ADC", Zp),
    op(0x66, "ROR", Zp),
    op(0x68, "PLA", Impl),
    op(0x69, "ADC", Imm),
    op(0x6A, "ROR", Acc),
    op(0x6C, "JMP", Ind),
    op(0x6D, "ADC", Abs),
    op(0x6E, "ROR", Abs),
    // 0x70
    op(0x70, "BVS", Rel),
    op(0x71, "ADC", IndY),
    op(0x75, "ADC", ZpX),
    op(0x76, "ROR", ZpX),
    op(0x78, "SEI", Impl),
    op(0x79, "ADC", AbsY),
    op(0x7D, "ADC", AbsX),
    op(0x7E, "ROR", AbsX),
    // 0x80
    op(0x81, "STA", IndX),
    op(0x84, "STY", Zp),
    op(0x85, "STA", Zp),
    op(0x86, "STX", Zp),
    op(0x88, "DEY", Impl),
    op(0x8A, "TXA", Impl),
    op(0x8C, "STY", Abs),
    op(0x8D, "STA", Abs),
    op(0x8E, "STX", Abs),
    // 0x90
    op(0x90, "BCC", Rel),
    op(0x91, "STA", IndY),
    op(0x94, "STY", ZpX),
    op(0x95, "STA", ZpX),
    op(0x96, "STX", ZpY),
    op(0x98, "TYA", Impl),
    op(0x99, "STA", AbsY),
    op(0x9A, "TXS", Impl),
    op(0x9D, "STA", AbsX),
    // 0xA0
    op(0xA0, "LDY", Imm),
    op(0xA1, "LDA", IndX),
    op(0xA2, "LDX", Imm),
    op(0xA4, "LDY", Zp),
    op(0xA5, "LDA", Zp),
    op(0xA6, "LDX", Zp),
    op(0xA8, "TAY", Impl),
    op(0xA9, "LDA", Imm),
    op(0xAA, "TAX", Impl),
    op(0xAC, "LDY", Abs),
    op(0xAD, "LDA", Abs),
    op(0xAE, "LDX", Abs),
    // 0xB0
    op(0xB0, "BCS", Rel),
    op(0xB1, "LDA", IndY),
    op(0xB4, "LDY", ZpX),
    op(0xB5, "LDA", ZpX),
    op(0xB6, "LDX", ZpY),
    op(0xB8, "CLV", Impl),
    op(0xB9, "LDA", AbsY),
    op(0xBA, "TSX", Impl),
    op(0xBC, "LDY", AbsX),
    op(0xBD, "LDA", AbsX),
    op(0xBE, "LDX", AbsY),
    // 0xC0
    op(0xC0, "CPY", Imm),
    op(0xC1, "CMP", IndX),
    op(0xC4, "CPY", Zp),
    op(0xC5, "CMP", Zp),
    op(0xC6, "DEC", Zp),
    op(0xC8, "INY", Impl),
    op(0xC9, "CMP", Imm),
    op(0xCA, "DEX", Impl),
    op(0xCC, "CPY", Abs),
    op(0xCD, "CMP", Abs),
    op(0xCE, "DEC", Abs),
    // 0xD0
    op(0xD0, "BNE", Rel),
    op(0xD1, "CMP", IndY),
    op(0xD5, "CMP", ZpX),
    op(0xD6, "DEC", ZpX),
    op(0xD8, "CLD", Impl),
    op(0xD9, "CMP", AbsY),
    op(0xDD, "CMP", AbsX),
    op(0xDE, "DEC", AbsX),
    // 0xE0
    op(0xE0, "CPX", Imm),
    op(0xE1, "SBC", IndX),
    op(0xE4, "CPX", Zp),
    op(0xE5, "SBC", Zp),
    op(0xE6, "INC", Zp),
    op(0xE8, "INX", Impl),
    op(0xE9, "SBC", Imm),
    op(0xEA, "NOP", Impl),
    op(0xEC, "CPX", Abs),
    op(0xED, "SBC", Abs),
    op(0xEE, "INC", Abs),
    // 0xF0
    op(0xF0, "BEQ", Rel),
    op(0xF1, "SBC", IndY),
    op(0xF5, "SBC", ZpX),
    op(0xF6, "INC", ZpX),
    op(0xF8, "SED", Impl),
    op(0xF9, "SBC", AbsY),
    op(0xFD, "SBC", AbsX),
    op(0xFE, "INC", AbsX),
];

const fn build_lookup() -> [Option<OpcodeEntry>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < OPCODES.len() {
        table[OPCODES[i].opcode as usize] = Some(OPCODES[i]);
        i += 1;
    }
    table
}

static LOOKUP: [Option<OpcodeEntry>; 256] = build_lookup();

/// Look up the descriptor for `opcode`.
#[inline]
pub fn lookup(opcode: u8) -> Option<&'static OpcodeEntry> {
    LOOKUP[opcode as usize].as_ref()
}

/// Whether `opcode` is a documented instruction.
pub fn is_documented(opcode: u8) -> bool {
    lookup(opcode).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_sorted_and_unique() {
        for pair in OPCODES.windows(2) {
            assert!(
                pair[0].opcode < pair[1].opcode,
                "opcode {:02X} out of order",
                pair[1].opcode
            );
        }
    }

    #[test]
    fn test_lookup_covers_table() {
        let defined = (0..=255u8).filter(|&b| is_documented(b)).count();
        assert_eq!(defined, DOCUMENTED_OPCODES);

        for entry in &OPCODES {
            assert_eq!(lookup(entry.opcode), Some(entry));
        }
    }

    #[test]
    fn test_mnemonic_count() {
        let mnemonics: HashSet<&str> = OPCODES.iter().map(|e| e.mnemonic).collect();
        assert_eq!(mnemonics.len(), 56);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(lookup(0xEA).map(|e| e.len), Some(1)); // NOP
        assert_eq!(lookup(0xA9).map(|e| e.len), Some(2)); // LDA #
        assert_eq!(lookup(0xD0).map(|e| e.len), Some(2)); // BNE
        assert_eq!(lookup(0x4C).map(|e| e.len), Some(3)); // JMP abs
        assert_eq!(lookup(0x6C).map(|e| e.mode), Some(AddressingMode::Indirect));
        assert_eq!(lookup(0x0A).map(|e| e.mode), Some(AddressingMode::Accumulator));
    }

    #[test]
    fn test_undocumented() {
        // KIL, SLO, undocumented NOPs
        for b in [0x02, 0x03, 0x04, 0x1A, 0x80, 0xFF] {
            assert!(!is_documented(b), "{:02X} should be undocumented", b);
        }
    }

    #[test]
    fn test_only_branches_are_relative() {
        for entry in OPCODES.iter().filter(|e| e.mode == AddressingMode::Relative) {
            assert!(entry.mnemonic.starts_with('B'));
            assert_eq!(entry.opcode & 0x1F, 0x10);
        }
    }
}
