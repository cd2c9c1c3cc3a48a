//! SPI transaction decoder for the MCP2515 CAN controller.

/// Capture-layer records, timestamps and spans.
pub mod capture;
pub use capture::{CaptureRecord, RawByteEvent, TimeSpan, Timestamp};

/// MCP2515 instruction codes and classification.
pub mod instruction;
pub use instruction::{classify_instruction, Instruction, INSTRUCTION_TABLE};

/// Register map and address resolution.
pub mod registers;
pub use registers::{
    register_name, RegisterAddress, REGISTER_MAP, REGISTER_MAP_COLUMNS, REGISTER_MAP_ROWS,
};

/// Output annotations and their display formatting.
pub mod segment;
pub use segment::{format_hex_byte, format_hex_bytes, OutputSegment, SegmentPayload};

/// Error taxonomy for session and decode failures.
pub mod error;
pub use error::{DecodeError, DecodeErrorKind};

/// Host-facing configuration and trace hooks.
pub mod api;
pub use api::{
    AnalyzerConfig, NoopTraceSink, ParseRegisterPolicyError, RegisterPolicy, TraceEvent,
    TraceSink,
};

/// Transaction decode pipeline.
pub mod decoder;
pub use decoder::Decoder;

/// Record-stream session state machine.
pub mod session;
pub use session::{Session, SessionState};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
