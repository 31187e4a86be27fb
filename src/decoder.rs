//! Linear-sweep 6502 instruction decoder.
//!
//! The decoder walks a byte buffer from its first byte to its last,
//! treating every position it lands on as an opcode. It never looks ahead
//! for code/data boundaries and never aborts: bytes with no table entry
//! come out as [`Decoded::Unknown`], and an opcode whose operand would run
//! past the end of the buffer comes out as a final [`Decoded::Partial`].

use tracing::trace;

use crate::architectures::mos6502;
use crate::types::{AddressingMode, Decoded, Instruction, Operand, Segment};

/// Lazy decoder over one segment's bytes.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    base: u16,
    pc: usize,
}

impl<'a> Decoder<'a> {
    /// Decode `data` as if loaded at `base`.
    pub fn new(data: &'a [u8], base: u16) -> Self {
        Self { data, base, pc: 0 }
    }

    /// Decode the body of a loaded segment.
    pub fn for_segment(segment: &'a Segment) -> Self {
        Self::new(&segment.bytes, segment.start)
    }

    /// Offset of the next byte to decode.
    pub fn offset(&self) -> usize {
        self.pc
    }

    fn address(&self) -> u16 {
        self.base.wrapping_add(self.pc as u16)
    }

    fn decode_one(&mut self) -> Decoded {
        let address = self.address();
        let opcode = self.data[self.pc];

        let Some(entry) = mos6502::lookup(opcode) else {
            self.pc += 1;
            return Decoded::Unknown { address, opcode };
        };

        let len = entry.len as usize;
        let remaining = self.data.len() - self.pc;
        if len > remaining {
            trace!(address, opcode, len, remaining, "partial instruction");
            let bytes = self.data[self.pc..].to_vec();
            self.pc = self.data.len();
            return Decoded::Partial {
                address,
                opcode,
                bytes,
                expected_len: entry.len,
            };
        }

        let bytes = &self.data[self.pc..self.pc + len];
        let operand = match entry.mode.operand_len() {
            0 => None,
            1 => Some(Operand::Byte(bytes[1])),
            _ => Some(Operand::Word(u16::from_le_bytes([bytes[1], bytes[2]]))),
        };
        let branch_target = match (entry.mode, operand) {
            (AddressingMode::Relative, Some(Operand::Byte(offset))) => {
                Some(branch_target(address, entry.len, offset))
            }
            _ => None,
        };

        self.pc += len;
        Decoded::Instruction(Instruction {
            address,
            opcode,
            bytes: bytes.to_vec(),
            mnemonic: entry.mnemonic,
            mode: entry.mode,
            operand,
            branch_target,
        })
    }
}

impl Iterator for Decoder<'_> {
    type Item = Decoded;

    fn next(&mut self) -> Option<Decoded> {
        if self.pc >= self.data.len() {
            return None;
        }
        Some(self.decode_one())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len() - self.pc.min(self.data.len());
        ((remaining + 2) / 3, Some(remaining))
    }
}

impl std::iter::FusedIterator for Decoder<'_> {}

/// Destination of a relative branch at `address`.
///
/// The displacement is signed and counts from the instruction that follows
/// the branch. The result wraps at 64K.
pub fn branch_target(address: u16, len: u8, offset: u8) -> u16 {
    address
        .wrapping_add(u16::from(len))
        .wrapping_add_signed(i16::from(offset as i8))
}

/// Decode `data` loaded at `base`.
pub fn decode(data: &[u8], base: u16) -> Decoder<'_> {
    Decoder::new(data, base)
}

/// Decode a segment into a list.
pub fn decode_segment(segment: &Segment) -> Vec<Decoded> {
    Decoder::for_segment(segment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insn(d: &Decoded) -> &Instruction {
        d.as_instruction().expect("expected a full instruction")
    }

    #[test]
    fn test_nop_run() {
        let data = [0xEA; 16];
        let out: Vec<Decoded> = decode(&data, 0x2000).collect();

        assert_eq!(out.len(), 16);
        for (i, d) in out.iter().enumerate() {
            assert_eq!(d.address(), 0x2000 + i as u16);
            assert_eq!(d.len(), 1);
            assert_eq!(insn(d).mnemonic, "NOP");
        }
    }

    #[test]
    fn test_operand_widths() {
        let data = [
            0xA9, 0x05, // LDA #$05
            0xBD, 0x34, 0x12, // LDA $1234,X
            0x0A, // ASL A
            0xB1, 0x80, // LDA ($80),Y
        ];
        let out: Vec<Decoded> = decode(&data, 0x1000).collect();

        assert_eq!(out.len(), 4);
        assert_eq!(insn(&out[0]).operand, Some(Operand::Byte(0x05)));
        assert_eq!(insn(&out[0]).mode, AddressingMode::Immediate);
        assert_eq!(insn(&out[1]).operand, Some(Operand::Word(0x1234)));
        assert_eq!(insn(&out[1]).mode, AddressingMode::AbsoluteX);
        assert_eq!(insn(&out[2]).operand, None);
        assert_eq!(insn(&out[2]).mode, AddressingMode::Accumulator);
        assert_eq!(insn(&out[3]).address, 0x1006);
        assert_eq!(insn(&out[3]).mode, AddressingMode::IndirectIndexed);
    }

    #[test]
    fn test_branch_targets() {
        let data = [
            0xD0, 0xFE, // BNE * (self loop)
            0xF0, 0x02, // BEQ +2
            0x10, 0x80, // BPL -128
        ];
        let out: Vec<Decoded> = decode(&data, 0x0600).collect();

        assert_eq!(insn(&out[0]).branch_target, Some(0x0600));
        assert_eq!(insn(&out[1]).branch_target, Some(0x0606));
        assert_eq!(insn(&out[2]).branch_target, Some(0x0606 - 128));
        assert_eq!(insn(&out[2]).operand, Some(Operand::Byte(0x80)));
    }

    #[test]
    fn test_branch_target_property() {
        for offset in 0..=255u8 {
            let address = 0x8000;
            let signed = if offset < 128 {
                offset as i32
            } else {
                offset as i32 - 256
            };
            let expected = (address as i32 + 2 + signed) as u16;
            assert_eq!(branch_target(address, 2, offset), expected);
        }
    }

    #[test]
    fn test_branch_target_wraps() {
        assert_eq!(branch_target(0xFFF0, 2, 0x20), 0x0012);
        assert_eq!(branch_target(0x0004, 2, 0xF0), 0xFFF6);
    }

    #[test]
    fn test_non_branch_has_no_target() {
        let out: Vec<Decoded> = decode(&[0x4C, 0x00, 0x10], 0x1000).collect();
        assert_eq!(insn(&out[0]).branch_target, None);
    }

    #[test]
    fn test_unknown_opcode() {
        let data = [0x02, 0xEA, 0xFF];
        let out: Vec<Decoded> = decode(&data, 0x3000).collect();

        assert_eq!(out.len(), 3);
        assert_eq!(
            out[0],
            Decoded::Unknown {
                address: 0x3000,
                opcode: 0x02,
            }
        );
        assert!(out[1].as_instruction().is_some());
        assert!(out[2].is_unknown());
    }

    #[test]
    fn test_partial_single_byte() {
        let out: Vec<Decoded> = decode(&[0x4C], 0x1000).collect();
        assert_eq!(
            out,
            vec![Decoded::Partial {
                address: 0x1000,
                opcode: 0x4C,
                bytes: vec![0x4C],
                expected_len: 3,
            }]
        );
    }

    #[test]
    fn test_partial_consumes_remaining() {
        let out: Vec<Decoded> = decode(&[0xEA, 0x8D, 0x00], 0x1000).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].address(), 0x1001);
        assert_eq!(out[1].bytes(), &[0x8D, 0x00]);
        assert!(out[1].is_partial());
    }

    #[test]
    fn test_tiling() {
        let data = [
            0xA2, 0x00, 0xBD, 0x00, 0x20, 0x9D, 0x00, 0x30, 0xE8, 0xD0, 0xF7, 0x02, 0x60, 0x20,
        ];
        let out: Vec<Decoded> = decode(&data, 0x0600).collect();

        for pair in out.windows(2) {
            assert_eq!(pair[0].next_address(), pair[1].address());
        }
        let total: usize = out.iter().map(Decoded::len).sum();
        assert_eq!(total, data.len());
        assert!(out.last().is_some_and(Decoded::is_partial));
    }

    #[test]
    fn test_address_wraps_at_top_of_memory() {
        let out: Vec<Decoded> = decode(&[0xEA, 0xEA, 0xEA], 0xFFFF).collect();
        let addrs: Vec<u16> = out.iter().map(Decoded::address).collect();
        assert_eq!(addrs, vec![0xFFFF, 0x0000, 0x0001]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode(&[], 0x1000).count(), 0);
    }

    #[test]
    fn test_decode_segment() {
        let segment = Segment {
            start: 0x1000,
            end: 0x1002,
            bytes: vec![0xA9, 0x05, 0x4C],
        };
        let out = decode_segment(&segment);
        assert_eq!(out.len(), 2);
        assert_eq!(insn(&out[0]).mnemonic, "LDA");
        assert!(out[1].is_partial());
        assert_eq!(out[1].address(), 0x1002);
    }
}
