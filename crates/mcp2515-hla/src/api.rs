//! Host-facing configuration and trace hook contracts.

use std::str::FromStr;

use thiserror::Error;

use crate::capture::Timestamp;
use crate::error::DecodeError;
use crate::instruction::Instruction;

/// Which instructions get their second byte resolved as a register address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RegisterPolicy {
    /// Resolve the second byte of every transaction, whatever the instruction.
    #[default]
    Unconditional,
    /// Resolve only for `READ`, `WRITE` and `BIT_MODIFY`.
    AddressedOnly,
}

impl RegisterPolicy {
    /// Returns true when the second byte of `instruction` is resolved.
    #[must_use]
    pub const fn resolves(self, instruction: Instruction) -> bool {
        match self {
            Self::Unconditional => true,
            Self::AddressedOnly => instruction.carries_address(),
        }
    }
}

/// Error returned when parsing an unknown register policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown register policy `{0}` (expected `unconditional` or `addressed-only`)")]
pub struct ParseRegisterPolicyError(pub String);

impl FromStr for RegisterPolicy {
    type Err = ParseRegisterPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unconditional" => Ok(Self::Unconditional),
            "addressed-only" => Ok(Self::AddressedOnly),
            other => Err(ParseRegisterPolicyError(other.to_string())),
        }
    }
}

/// Top-level immutable configuration for an analyzer session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AnalyzerConfig {
    /// Register resolution policy for the second transaction byte.
    pub register_policy: RegisterPolicy,
    /// Enables trace callback dispatch.
    pub tracing_enabled: bool,
}

/// Trace events emitted at session boundaries when enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A start marker opened a transaction.
    TransactionStarted {
        /// Time of the start marker.
        time: Timestamp,
    },
    /// A byte exchange was appended to the open transaction.
    ByteBuffered {
        /// Zero-based index within the transaction.
        index: usize,
        /// MOSI byte.
        mosi: u8,
        /// MISO byte.
        miso: u8,
    },
    /// An end marker closed a transaction that decoded successfully.
    TransactionDecoded {
        /// Time of the end marker.
        time: Timestamp,
        /// Number of buffered byte exchanges.
        bytes: usize,
        /// Number of emitted segments.
        segments: usize,
    },
    /// An end marker closed a transaction that failed to decode.
    TransactionFailed {
        /// Time of the end marker.
        time: Timestamp,
        /// Decode failure.
        error: DecodeError,
    },
    /// An open transaction was dropped by a restart or protocol violation.
    TransactionDiscarded {
        /// Number of byte exchanges dropped.
        bytes: usize,
    },
}

/// Sink trait for session trace hooks.
pub trait TraceSink {
    /// Records an event in arrival order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Trace sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
