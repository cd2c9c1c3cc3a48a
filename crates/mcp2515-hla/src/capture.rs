//! Capture-layer input records.
//!
//! The capture layer delivers SPI traffic already split into one record per
//! exchanged byte, bracketed by chip-select assert/deassert markers.

use std::fmt;

/// Capture timestamp in the capture layer's sample units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Timestamp(pub u64);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive time range covered by one or more byte exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TimeSpan {
    /// Start of the first covered exchange.
    pub start: Timestamp,
    /// End of the last covered exchange.
    pub end: Timestamp,
}

impl TimeSpan {
    /// Creates a span from explicit bounds.
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Span from the start of `first` to the end of `last`.
    #[must_use]
    pub const fn covering(first: &RawByteEvent, last: &RawByteEvent) -> Self {
        Self {
            start: first.start,
            end: last.end,
        }
    }
}

/// One full-duplex SPI byte exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RawByteEvent {
    /// First clock edge of the byte.
    pub start: Timestamp,
    /// Last clock edge of the byte.
    pub end: Timestamp,
    /// Byte driven by the host (MOSI).
    pub mosi: u8,
    /// Byte driven by the MCP2515 (MISO).
    pub miso: u8,
}

impl RawByteEvent {
    /// Creates a byte exchange record.
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp, mosi: u8, miso: u8) -> Self {
        Self {
            start,
            end,
            mosi,
            miso,
        }
    }

    /// Time range of this single exchange.
    #[must_use]
    pub const fn span(&self) -> TimeSpan {
        TimeSpan::covering(self, self)
    }
}

/// One record from the capture layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CaptureRecord {
    /// Chip select asserted; a transaction begins.
    StartMarker {
        /// Time of the assert edge.
        time: Timestamp,
    },
    /// One byte exchanged while chip select is asserted.
    ByteExchange(RawByteEvent),
    /// Chip select released; the transaction is complete.
    EndMarker {
        /// Time of the release edge.
        time: Timestamp,
    },
    /// Any record type outside the SPI capture contract.
    Unsupported {
        /// Record type name reported by the capture layer.
        kind: String,
    },
}

impl CaptureRecord {
    /// Record type name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::StartMarker { .. } => "start_marker",
            Self::ByteExchange(_) => "byte_exchange",
            Self::EndMarker { .. } => "end_marker",
            Self::Unsupported { kind } => kind,
        }
    }
}
