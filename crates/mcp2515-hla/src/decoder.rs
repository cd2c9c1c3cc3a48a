//! Transaction decoder for MCP2515 SPI traffic.
//!
//! Turns the byte exchanges of one chip-select window into instruction,
//! register, mask and data segments.

use crate::api::RegisterPolicy;
use crate::capture::{RawByteEvent, TimeSpan};
use crate::error::DecodeError;
use crate::instruction::{classify_instruction, Instruction};
use crate::registers::RegisterAddress;
use crate::segment::{OutputSegment, SegmentPayload};

/// Index of the register address byte within a transaction.
const ADDRESS_INDEX: usize = 1;
/// Index where the mask (`BIT_MODIFY`) or data phase begins.
const PAYLOAD_INDEX: usize = 2;

/// Stateless transaction decoder.
pub struct Decoder;

impl Decoder {
    /// Decodes one buffered transaction.
    ///
    /// Segments are returned in wire order: instruction, register, mask, data.
    /// Short transactions produce a shorter list rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownInstruction`] when the first MOSI byte is
    /// not an instruction code, and [`DecodeError::AddressOutOfRange`] when the
    /// register address is resolved and lies outside the register map.
    pub fn decode(
        events: &[RawByteEvent],
        policy: RegisterPolicy,
    ) -> Result<Vec<OutputSegment>, DecodeError> {
        let Some(first) = events.first() else {
            return Ok(Vec::new());
        };

        let instruction = Self::classify(first)?;
        let mut segments = Vec::with_capacity(4);
        segments.push(OutputSegment::new(
            first.span(),
            SegmentPayload::Instruction { instruction },
        ));

        if let Some(address_event) = events.get(ADDRESS_INDEX) {
            if policy.resolves(instruction) {
                segments.push(Self::resolve_register(address_event)?);
            }
        }

        let payload = events.get(PAYLOAD_INDEX..).unwrap_or_default();
        Self::extract_payload(instruction, payload, &mut segments);

        Ok(segments)
    }

    /// Classifies the instruction byte of a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnknownInstruction`] for unassigned codes.
    pub fn classify(event: &RawByteEvent) -> Result<Instruction, DecodeError> {
        classify_instruction(event.mosi)
            .ok_or(DecodeError::UnknownInstruction { byte: event.mosi })
    }

    /// Resolves the register addressed by `event` into a register segment.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::AddressOutOfRange`] when the address column is
    /// beyond the register map.
    pub fn resolve_register(event: &RawByteEvent) -> Result<OutputSegment, DecodeError> {
        let address = RegisterAddress::new(event.mosi);
        let name = address
            .mnemonic()
            .ok_or(DecodeError::AddressOutOfRange { address: event.mosi })?;
        Ok(OutputSegment::new(
            event.span(),
            SegmentPayload::ControlRegister { address, name },
        ))
    }

    fn extract_payload(
        instruction: Instruction,
        payload: &[RawByteEvent],
        segments: &mut Vec<OutputSegment>,
    ) {
        let data = match (instruction, payload.split_first()) {
            (Instruction::BitModify, Some((mask, rest))) => {
                segments.push(OutputSegment::new(
                    mask.span(),
                    SegmentPayload::Mask { value: mask.mosi },
                ));
                rest
            }
            _ => payload,
        };

        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            return;
        };

        let bytes = data
            .iter()
            .map(|event| {
                if instruction.reads_from_device() {
                    event.miso
                } else {
                    event.mosi
                }
            })
            .collect();

        segments.push(OutputSegment::new(
            TimeSpan::covering(first, last),
            SegmentPayload::Data { bytes },
        ));
    }
}
