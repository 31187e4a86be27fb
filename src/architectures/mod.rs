//! Architecture-specific opcode tables.
//!
//! This module provides the static instruction descriptors the decoder
//! walks segments with.

pub mod mos6502;

pub use mos6502::lookup;
