//! Labeled, time-ranged annotations produced for each decoded transaction.

use std::fmt::{self, Write as _};

use crate::capture::TimeSpan;
use crate::instruction::Instruction;
use crate::registers::RegisterAddress;

/// Decoded content of one output segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum SegmentPayload {
    /// Leading instruction byte.
    Instruction {
        /// Classified instruction.
        instruction: Instruction,
    },
    /// Register addressed by the second byte.
    ControlRegister {
        /// Raw address byte.
        address: RegisterAddress,
        /// Register map mnemonic.
        name: &'static str,
    },
    /// `BIT_MODIFY` mask byte.
    Mask {
        /// Mask value from MOSI.
        value: u8,
    },
    /// Payload bytes in transfer order.
    Data {
        /// MISO bytes for `READ`, MOSI bytes otherwise.
        bytes: Vec<u8>,
    },
}

/// One annotation emitted for a decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutputSegment {
    /// Time range of the byte exchanges this segment summarizes.
    pub span: TimeSpan,
    /// Decoded content.
    pub payload: SegmentPayload,
}

impl OutputSegment {
    /// Creates a segment.
    #[must_use]
    pub const fn new(span: TimeSpan, payload: SegmentPayload) -> Self {
        Self { span, payload }
    }

    /// Result type key used by visualization hosts.
    #[must_use]
    pub const fn result_type(&self) -> &'static str {
        match self.payload {
            SegmentPayload::Instruction { .. } => "instruction",
            SegmentPayload::ControlRegister { .. } => "control_reg",
            SegmentPayload::Mask { .. } => "mask",
            SegmentPayload::Data { .. } => "data",
        }
    }

    /// Formatted field value without the display label.
    #[must_use]
    pub fn value_text(&self) -> String {
        match &self.payload {
            SegmentPayload::Instruction { instruction } => instruction.name().to_string(),
            SegmentPayload::ControlRegister { name, .. } => (*name).to_string(),
            SegmentPayload::Mask { value } => format_hex_byte(*value),
            SegmentPayload::Data { bytes } => format_hex_bytes(bytes),
        }
    }
}

impl fmt::Display for OutputSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            SegmentPayload::Instruction { .. } | SegmentPayload::ControlRegister { .. } => {
                f.write_str(&self.value_text())
            }
            SegmentPayload::Mask { .. } => write!(f, "Mask: {}", self.value_text()),
            SegmentPayload::Data { .. } => write!(f, "Data: {}", self.value_text()),
        }
    }
}

/// Formats one byte as `0xNN` with uppercase digits.
#[must_use]
pub fn format_hex_byte(byte: u8) -> String {
    format!("0x{byte:02X}")
}

/// Formats bytes as space-separated `0xNN` tokens.
#[must_use]
pub fn format_hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 5);
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        let _ = write!(out, "0x{byte:02X}");
    }
    out
}
