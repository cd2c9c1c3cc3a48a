use thiserror::Error;

use crate::session::SessionState;

/// Error classes used for aggregation by hosts and policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecodeErrorKind {
    /// Record stream does not follow the start/byte/end contract.
    Protocol,
    /// Leading byte is not an MCP2515 instruction.
    Instruction,
    /// Address byte falls outside the register map.
    Address,
}

/// Failures raised while buffering or decoding one SPI transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DecodeError {
    /// A record arrived in a session state that does not accept it, or the
    /// record type itself is not part of the SPI capture contract.
    #[error("unexpected `{record}` record while session is {state}; input must be an SPI capture")]
    ProtocolViolation {
        /// Record type name as delivered by the capture layer.
        record: String,
        /// Session state observed when the record arrived.
        state: SessionState,
    },
    /// First MOSI byte of a transaction matched no instruction code.
    #[error("unknown MCP2515 instruction byte 0x{byte:02X}")]
    UnknownInstruction {
        /// Offending instruction byte.
        byte: u8,
    },
    /// Address byte column lies beyond the populated register map.
    #[error("register address 0x{address:02X} is outside the MCP2515 register map")]
    AddressOutOfRange {
        /// Offending address byte.
        address: u8,
    },
}

impl DecodeError {
    /// Builds a protocol violation for `record` observed in `state`.
    #[must_use]
    pub fn protocol_violation(record: impl Into<String>, state: SessionState) -> Self {
        Self::ProtocolViolation {
            record: record.into(),
            state,
        }
    }

    /// Returns the aggregation class for this error.
    #[must_use]
    pub const fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::ProtocolViolation { .. } => DecodeErrorKind::Protocol,
            Self::UnknownInstruction { .. } => DecodeErrorKind::Instruction,
            Self::AddressOutOfRange { .. } => DecodeErrorKind::Address,
        }
    }

    /// Errors caused by a misconfigured upstream source rather than by the
    /// contents of a single transaction.
    #[must_use]
    pub const fn is_session_fault(&self) -> bool {
        matches!(self, Self::ProtocolViolation { .. })
    }
}
