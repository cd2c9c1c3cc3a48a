//! Chip-select scoped transaction buffering.

use std::fmt;

use log::{debug, warn};

use crate::api::{AnalyzerConfig, NoopTraceSink, TraceEvent, TraceSink};
use crate::capture::{CaptureRecord, RawByteEvent, Timestamp};
use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::segment::OutputSegment;

/// Session state machine for record-stream handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum SessionState {
    /// No transaction is open; only a start marker is accepted.
    #[default]
    Idle,
    /// Chip select is asserted and byte exchanges are being buffered.
    Collecting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Collecting => f.write_str("collecting"),
        }
    }
}

/// Owner of the in-flight transaction buffer.
///
/// Feed capture records one at a time with [`Session::process`]; segments are
/// returned when an end marker closes a transaction.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: AnalyzerConfig,
    state: SessionState,
    buffer: Vec<RawByteEvent>,
}

impl Session {
    /// Creates an idle session with the given configuration.
    #[must_use]
    pub const fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            buffer: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Configuration this session was created with.
    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Byte exchanges buffered for the open transaction.
    #[must_use]
    pub fn buffered(&self) -> &[RawByteEvent] {
        &self.buffer
    }

    /// Drops any open transaction and returns to idle.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.buffer.clear();
    }

    /// Handles one capture record.
    ///
    /// Returns `Ok(Some(segments))` when an end marker closed a transaction and
    /// `Ok(None)` for every other accepted record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ProtocolViolation`] for records the current state
    /// does not accept, and the decoder's error when the closed transaction
    /// cannot be decoded. In every error case the session is left idle or
    /// unchanged, never holding a partially consumed buffer.
    pub fn process(
        &mut self,
        record: CaptureRecord,
    ) -> Result<Option<Vec<OutputSegment>>, DecodeError> {
        self.process_traced(record, &mut NoopTraceSink)
    }

    /// Handles one capture record, delivering trace events to `sink` when
    /// tracing is enabled in the configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Session::process`].
    pub fn process_traced<T: TraceSink + ?Sized>(
        &mut self,
        record: CaptureRecord,
        sink: &mut T,
    ) -> Result<Option<Vec<OutputSegment>>, DecodeError> {
        match (self.state, record) {
            (_, CaptureRecord::StartMarker { time }) => {
                self.start(time, sink);
                Ok(None)
            }
            (SessionState::Collecting, CaptureRecord::ByteExchange(event)) => {
                self.trace(
                    sink,
                    TraceEvent::ByteBuffered {
                        index: self.buffer.len(),
                        mosi: event.mosi,
                        miso: event.miso,
                    },
                );
                self.buffer.push(event);
                Ok(None)
            }
            (SessionState::Collecting, CaptureRecord::EndMarker { time }) => {
                self.finish(time, sink).map(Some)
            }
            (
                SessionState::Idle,
                record @ (CaptureRecord::ByteExchange(_) | CaptureRecord::EndMarker { .. }),
            ) => {
                warn!("{} record outside of a transaction", record.name());
                Err(DecodeError::protocol_violation(
                    record.name(),
                    SessionState::Idle,
                ))
            }
            (state, CaptureRecord::Unsupported { kind }) => {
                warn!("unsupported capture record `{kind}`; expected SPI input");
                self.discard(sink);
                self.state = SessionState::Idle;
                Err(DecodeError::protocol_violation(kind, state))
            }
        }
    }

    fn start<T: TraceSink + ?Sized>(&mut self, time: Timestamp, sink: &mut T) {
        if self.state == SessionState::Collecting {
            warn!("start marker at {time} restarted an open transaction");
            self.discard(sink);
        }
        self.state = SessionState::Collecting;
        debug!("transaction started at {time}");
        self.trace(sink, TraceEvent::TransactionStarted { time });
    }

    fn finish<T: TraceSink + ?Sized>(
        &mut self,
        time: Timestamp,
        sink: &mut T,
    ) -> Result<Vec<OutputSegment>, DecodeError> {
        let events = std::mem::take(&mut self.buffer);
        self.state = SessionState::Idle;

        match Decoder::decode(&events, self.config.register_policy) {
            Ok(segments) => {
                debug!(
                    "transaction ended at {time}: {} bytes, {} segments",
                    events.len(),
                    segments.len()
                );
                self.trace(
                    sink,
                    TraceEvent::TransactionDecoded {
                        time,
                        bytes: events.len(),
                        segments: segments.len(),
                    },
                );
                Ok(segments)
            }
            Err(error) => {
                warn!("transaction ended at {time} failed to decode: {error}");
                self.trace(
                    sink,
                    TraceEvent::TransactionFailed {
                        time,
                        error: error.clone(),
                    },
                );
                Err(error)
            }
        }
    }

    fn discard<T: TraceSink + ?Sized>(&mut self, sink: &mut T) {
        if self.state == SessionState::Collecting {
            let bytes = self.buffer.len();
            self.buffer.clear();
            self.trace(sink, TraceEvent::TransactionDiscarded { bytes });
        }
    }

    fn trace<T: TraceSink + ?Sized>(&self, sink: &mut T, event: TraceEvent) {
        if self.config.tracing_enabled {
            sink.on_event(event);
        }
    }
}
