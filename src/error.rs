//! Error types for the disassembler.
//!
//! Only conditions that stop work are errors. Unknown opcodes, partial
//! instructions and trailing bytes are reported as data alongside the
//! decoded output (see [`crate::types::Decoded`] and
//! [`crate::types::TrailingData`]).

use thiserror::Error;

/// Primary error type for the disassembler.
#[derive(Debug, Error)]
pub enum DisasmError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A segment header declares a non-positive length or more bytes than
    /// the stream still holds.
    #[error(
        "Malformed segment at offset {offset}: ${start:04X}-${end:04X} needs {needed} bytes, {available} available"
    )]
    MalformedSegment {
        /// Stream offset of the segment header (after any marker).
        offset: usize,
        /// Declared start address.
        start: u16,
        /// Declared end address (inclusive).
        end: u16,
        /// Bytes required by the header, or 0 when `end < start`.
        needed: usize,
        /// Bytes remaining in the stream after the header.
        available: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl DisasmError {
    /// Whether this error stopped segment loading partway through a file.
    pub fn is_malformed(&self) -> bool {
        matches!(self, DisasmError::MalformedSegment { .. })
    }
}

/// Result type alias for disassembler operations.
pub type Result<T> = std::result::Result<T, DisasmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = DisasmError::MalformedSegment {
            offset: 6,
            start: 0x2000,
            end: 0x20FF,
            needed: 256,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("$2000-$20FF"));
        assert!(msg.contains("256"));
        assert!(msg.contains("offset 6"));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DisasmError = io.into();
        assert!(err.to_string().starts_with("IO error"));
        assert!(!err.is_malformed());
    }
}
