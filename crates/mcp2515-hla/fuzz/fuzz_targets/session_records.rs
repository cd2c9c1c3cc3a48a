#![no_main]

use libfuzzer_sys::fuzz_target;
use mcp2515_hla::{
    register_name, AnalyzerConfig, CaptureRecord, Decoder, RawByteEvent, RegisterPolicy, Session,
    Timestamp,
};

fuzz_target!(|data: &[u8]| {
    let Some((&policy_bit, rest)) = data.split_first() else {
        return;
    };
    let register_policy = if policy_bit & 1 == 0 {
        RegisterPolicy::Unconditional
    } else {
        RegisterPolicy::AddressedOnly
    };
    let mut session = Session::new(AnalyzerConfig {
        register_policy,
        tracing_enabled: false,
    });

    let mut events = Vec::new();
    for (index, chunk) in rest.chunks(3).enumerate() {
        let time = Timestamp(index as u64);
        let record = match chunk {
            [0x00, ..] => CaptureRecord::StartMarker { time },
            [0x01, ..] => CaptureRecord::EndMarker { time },
            [0x02, ..] => CaptureRecord::Unsupported {
                kind: "fuzz".to_string(),
            },
            [_, mosi, miso] => {
                let event = RawByteEvent::new(time, time, *mosi, *miso);
                events.push(event);
                CaptureRecord::ByteExchange(event)
            }
            _ => continue,
        };
        let _ = session.process(record);
        let _ = register_name(chunk[0]);
    }

    let _ = Decoder::decode(&events, register_policy);
});
