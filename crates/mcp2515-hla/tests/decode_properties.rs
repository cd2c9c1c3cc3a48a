//! Property coverage for classification, register resolution and segment layout.

use log as _;
use mcp2515_hla::{
    classify_instruction, register_name, CaptureRecord, DecodeError, Decoder, Instruction,
    OutputSegment, RawByteEvent, RegisterPolicy, SegmentPayload, Session, SessionState, TimeSpan,
    Timestamp, INSTRUCTION_TABLE, REGISTER_MAP,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn instruction_code() -> impl Strategy<Value = u8> {
    prop::sample::select(INSTRUCTION_TABLE.iter().map(|(code, _)| *code).collect::<Vec<_>>())
}

fn events_from(pairs: &[(u8, u8)], lead: u8) -> Vec<RawByteEvent> {
    std::iter::once((lead, 0))
        .chain(pairs.iter().copied())
        .zip(0u64..)
        .map(|((mosi, miso), index)| {
            RawByteEvent::new(Timestamp(index * 8), Timestamp(index * 8 + 7), mosi, miso)
        })
        .collect()
}

fn order_rank(segment: &OutputSegment) -> u8 {
    match segment.payload {
        SegmentPayload::Instruction { .. } => 0,
        SegmentPayload::ControlRegister { .. } => 1,
        SegmentPayload::Mask { .. } => 2,
        SegmentPayload::Data { .. } => 3,
    }
}

proptest! {
    #[test]
    fn classification_matches_table_exactly(byte in any::<u8>()) {
        let expected = INSTRUCTION_TABLE
            .iter()
            .find(|(code, _)| *code == byte)
            .map(|(_, instruction)| *instruction);
        prop_assert_eq!(classify_instruction(byte), expected);
    }

    #[test]
    fn register_resolution_is_pure_table_lookup(address in any::<u8>()) {
        let row = usize::from(address & 0x0F);
        let column = usize::from((address >> 4) & 0x0F);
        if column < 8 {
            prop_assert_eq!(register_name(address), Some(REGISTER_MAP[row][column]));
        } else {
            prop_assert_eq!(register_name(address), None);
        }
    }

    #[test]
    fn out_of_range_addresses_always_fail(code in instruction_code(), address in 0x80u8..=0xFF) {
        let events = events_from(&[(address, 0)], code);
        prop_assert_eq!(
            Decoder::decode(&events, RegisterPolicy::Unconditional),
            Err(DecodeError::AddressOutOfRange { address })
        );
    }

    #[test]
    fn segments_stay_in_wire_order_and_cover_all_bytes(
        code in instruction_code(),
        address in 0x00u8..0x80,
        tail in prop::collection::vec(any::<(u8, u8)>(), 0..12),
    ) {
        let mut pairs = vec![(address, 0)];
        pairs.extend(tail.iter().copied());
        let events = events_from(&pairs, code);
        let segments = Decoder::decode(&events, RegisterPolicy::Unconditional).expect("valid transaction");

        let ranks: Vec<u8> = segments.iter().map(order_rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(&ranks, &sorted);

        let last = events.last().expect("non-empty");
        prop_assert_eq!(segments[0].span.start, events[0].start);
        prop_assert_eq!(segments.last().map(|segment| segment.span.end), Some(last.end));
    }

    #[test]
    fn data_segment_carries_trailing_bytes_in_direction_order(
        code in instruction_code(),
        tail in prop::collection::vec(any::<(u8, u8)>(), 1..12),
    ) {
        let instruction = classify_instruction(code).expect("table code");
        let mut pairs = vec![(0x2C, 0)];
        pairs.extend(tail.iter().copied());
        let events = events_from(&pairs, code);
        let segments = Decoder::decode(&events, RegisterPolicy::Unconditional).expect("valid transaction");

        let data_tail = if instruction == Instruction::BitModify { &tail[1..] } else { &tail[..] };
        let expected: Vec<u8> = data_tail
            .iter()
            .map(|(mosi, miso)| if instruction == Instruction::Read { *miso } else { *mosi })
            .collect();

        let data = segments.iter().find_map(|segment| match &segment.payload {
            SegmentPayload::Data { bytes } => Some((bytes.clone(), segment.span)),
            _ => None,
        });
        if expected.is_empty() {
            prop_assert!(data.is_none());
        } else {
            let (bytes, span) = data.expect("data segment");
            prop_assert_eq!(bytes, expected);
            let first_index = events.len() - data_tail.len();
            prop_assert_eq!(
                span,
                TimeSpan::new(events[first_index].start, events[events.len() - 1].end)
            );
        }
    }

    #[test]
    fn session_recovers_after_any_failed_transaction(
        lead in any::<u8>(),
        second in any::<u8>(),
    ) {
        let mut session = Session::default();
        let failing = [
            CaptureRecord::StartMarker { time: Timestamp(0) },
            CaptureRecord::ByteExchange(RawByteEvent::new(Timestamp(1), Timestamp(2), lead, 0)),
            CaptureRecord::ByteExchange(RawByteEvent::new(Timestamp(3), Timestamp(4), second, 0)),
            CaptureRecord::EndMarker { time: Timestamp(5) },
        ];
        for record in failing {
            let _ = session.process(record);
        }
        prop_assert_eq!(session.state(), SessionState::Idle);
        prop_assert!(session.buffered().is_empty());

        session.process(CaptureRecord::StartMarker { time: Timestamp(10) }).expect("start");
        session
            .process(CaptureRecord::ByteExchange(RawByteEvent::new(Timestamp(11), Timestamp(12), 0xC0, 0)))
            .expect("byte");
        let segments = session
            .process(CaptureRecord::EndMarker { time: Timestamp(13) })
            .expect("decode")
            .expect("segments on end marker");
        prop_assert_eq!(segments.len(), 1);
        prop_assert_eq!(segments[0].to_string(), "RESET");
    }
}
