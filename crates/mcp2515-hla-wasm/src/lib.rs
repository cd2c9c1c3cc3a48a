use std::collections::BTreeMap;

use mcp2515_hla::{
    AnalyzerConfig, CaptureRecord, DecodeError, OutputSegment, RawByteEvent, RegisterPolicy,
    Session, Timestamp,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

macro_rules! console_log {
    ($($t:tt)*) => (web_sys::console::log_1(&JsValue::from_str(&format!($($t)*))))
}

/// Byte payload of an SPI analyzer result frame.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WasmFrameData {
    #[serde(default)]
    pub mosi: Vec<u8>,
    #[serde(default)]
    pub miso: Vec<u8>,
}

/// JS-compatible SPI analyzer frame: `enable`, `result` or `disable`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WasmFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default)]
    pub data: WasmFrameData,
}

/// JS-compatible version of [`OutputSegment`].
///
/// `data` holds a single entry keyed by the result type, so hosts read
/// `frame.data.instruction`, `frame.data.mask` and so on.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasmSegment {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_time: u64,
    pub end_time: u64,
    pub data: BTreeMap<String, String>,
}

impl From<&OutputSegment> for WasmSegment {
    fn from(segment: &OutputSegment) -> Self {
        let kind = segment.result_type().to_string();
        let data = BTreeMap::from([(kind.clone(), segment.value_text())]);
        Self {
            kind,
            start_time: segment.span.start.0,
            end_time: segment.span.end.0,
            data,
        }
    }
}

/// Maps an analyzer frame onto a capture record.
///
/// Only the first MOSI and MISO byte of a `result` frame is used. A `result`
/// frame missing either byte is not a byte exchange and is handed to the
/// session as an unsupported record, which discards the open transaction.
fn capture_record(frame: WasmFrame) -> CaptureRecord {
    match frame.kind.as_str() {
        "enable" => CaptureRecord::StartMarker {
            time: Timestamp(frame.start_time),
        },
        "result" => match (frame.data.mosi.first(), frame.data.miso.first()) {
            (Some(&mosi), Some(&miso)) => CaptureRecord::ByteExchange(RawByteEvent::new(
                Timestamp(frame.start_time),
                Timestamp(frame.end_time),
                mosi,
                miso,
            )),
            _ => CaptureRecord::Unsupported { kind: frame.kind },
        },
        "disable" => CaptureRecord::EndMarker {
            time: Timestamp(frame.start_time),
        },
        _ => CaptureRecord::Unsupported { kind: frame.kind },
    }
}

/// Serializes with plain objects for maps so `data.<type>` is a property.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// Feeds one frame through the session, returning output frames when the
/// frame closed a transaction.
fn decode_frame(
    session: &mut Session,
    frame: WasmFrame,
) -> Result<Option<Vec<WasmSegment>>, DecodeError> {
    let segments = session.process(capture_record(frame))?;
    Ok(segments.map(|segments| segments.iter().map(WasmSegment::from).collect()))
}

#[wasm_bindgen]
pub struct WasmAnalyzer {
    session: Session,
}

impl Default for WasmAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmAnalyzer {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            session: Session::default(),
        }
    }

    /// Creates an analyzer with `unconditional` or `addressed-only` register
    /// resolution.
    ///
    /// # Errors
    ///
    /// Fails on an unknown policy name.
    pub fn with_register_policy(policy: &str) -> Result<Self, JsError> {
        console_error_panic_hook::set_once();
        let register_policy: RegisterPolicy = policy.parse()?;
        Ok(Self {
            session: Session::new(AnalyzerConfig {
                register_policy,
                ..AnalyzerConfig::default()
            }),
        })
    }

    /// Drops any in-flight transaction.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Current session state name (`idle` or `collecting`).
    #[must_use]
    pub fn state(&self) -> String {
        self.session.state().to_string()
    }

    /// Decodes one analyzer frame.
    /// Returns `null`, or an array of output frames when a transaction closed.
    ///
    /// # Errors
    ///
    /// Fails when the frame cannot be deserialized, violates the capture
    /// contract, or closes a transaction that does not decode.
    pub fn decode(&mut self, frame: JsValue) -> Result<JsValue, JsError> {
        let frame: WasmFrame = serde_wasm_bindgen::from_value(frame)?;
        match decode_frame(&mut self.session, frame) {
            Ok(Some(segments)) => Ok(to_js(&segments)?),
            Ok(None) => Ok(JsValue::NULL),
            Err(err) => {
                console_log!("mcp2515: {}", err);
                Err(err.into())
            }
        }
    }

    /// Decodes an array of analyzer frames and concatenates every output
    /// frame produced.
    ///
    /// The batch is all-or-nothing: it stops at the first failing frame and
    /// returns only the error, dropping output frames of transactions that
    /// already decoded earlier in the same batch. Feed frames one at a time
    /// with [`WasmAnalyzer::decode`] to keep partial results.
    ///
    /// # Errors
    ///
    /// Same as [`WasmAnalyzer::decode`].
    pub fn decode_all(&mut self, frames: &js_sys::Array) -> Result<js_sys::Array, JsError> {
        let out = js_sys::Array::new();
        for value in frames.iter() {
            let frame: WasmFrame = serde_wasm_bindgen::from_value(value)?;
            match decode_frame(&mut self.session, frame) {
                Ok(Some(segments)) => {
                    for segment in &segments {
                        out.push(&to_js(segment)?);
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    console_log!("mcp2515: {}", err);
                    return Err(err.into());
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_frame, WasmFrame, WasmSegment};
    use mcp2515_hla::{DecodeError, Session, SessionState};
    use serde_json::json;

    fn frame(value: serde_json::Value) -> WasmFrame {
        serde_json::from_value(value).expect("frame json")
    }

    fn result(start: u64, mosi: u8, miso: u8) -> WasmFrame {
        frame(json!({
            "type": "result",
            "start_time": start,
            "end_time": start + 8,
            "data": { "mosi": [mosi], "miso": [miso] }
        }))
    }

    fn marker(kind: &str, time: u64) -> WasmFrame {
        frame(json!({ "type": kind, "start_time": time, "end_time": time }))
    }

    #[test]
    fn write_transaction_produces_host_frames() {
        let mut session = Session::default();
        assert!(decode_frame(&mut session, marker("enable", 0))
            .expect("enable")
            .is_none());
        for (index, mosi) in [0x02u8, 0x0F, 0x80].into_iter().enumerate() {
            let start = 10 * (index as u64 + 1);
            assert!(decode_frame(&mut session, result(start, mosi, 0x00))
                .expect("result")
                .is_none());
        }
        let segments = decode_frame(&mut session, marker("disable", 50))
            .expect("disable")
            .expect("segments");

        let rendered = serde_json::to_value(&segments).expect("serialize");
        assert_eq!(
            rendered,
            json!([
                { "type": "instruction", "start_time": 10, "end_time": 18, "data": { "instruction": "WRITE" } },
                { "type": "control_reg", "start_time": 20, "end_time": 28, "data": { "control_reg": "CANCTRL" } },
                { "type": "data", "start_time": 30, "end_time": 38, "data": { "data": "0x80" } }
            ])
        );
    }

    #[test]
    fn bit_modify_mask_uses_mask_key() {
        let mut session = Session::default();
        decode_frame(&mut session, marker("enable", 0)).expect("enable");
        for (index, mosi) in [0x05u8, 0x2C, 0x1F].into_iter().enumerate() {
            decode_frame(&mut session, result(index as u64 * 10, mosi, 0)).expect("result");
        }
        let segments = decode_frame(&mut session, marker("disable", 40))
            .expect("disable")
            .expect("segments");
        let mask: &WasmSegment = &segments[2];
        assert_eq!(mask.kind, "mask");
        assert_eq!(mask.data.get("mask").map(String::as_str), Some("0x1F"));
    }

    #[test]
    fn non_spi_frame_type_is_rejected() {
        let mut session = Session::default();
        let err = decode_frame(&mut session, marker("frame", 0)).expect_err("unsupported");
        assert_eq!(
            err,
            DecodeError::protocol_violation("frame", SessionState::Idle)
        );
    }

    #[test]
    fn result_without_bytes_is_rejected() {
        let mut session = Session::default();
        decode_frame(&mut session, marker("enable", 0)).expect("enable");
        let empty = frame(json!({ "type": "result", "start_time": 1, "end_time": 2 }));
        let err = decode_frame(&mut session, empty).expect_err("empty result");
        assert_eq!(
            err,
            DecodeError::protocol_violation("result", SessionState::Collecting)
        );
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.buffered().is_empty());
    }

    #[test]
    fn empty_result_discards_transaction_instead_of_shifting_bytes() {
        let mut session = Session::default();
        decode_frame(&mut session, marker("enable", 0)).expect("enable");
        decode_frame(&mut session, result(10, 0x05, 0)).expect("bit modify");
        decode_frame(&mut session, result(20, 0x2C, 0)).expect("address");
        let empty = frame(json!({ "type": "result", "start_time": 30, "end_time": 38 }));
        decode_frame(&mut session, empty).expect_err("empty result");

        let err = decode_frame(&mut session, result(40, 0x01, 0)).expect_err("orphan byte");
        assert_eq!(
            err,
            DecodeError::protocol_violation("byte_exchange", SessionState::Idle)
        );
        let err = decode_frame(&mut session, marker("disable", 50)).expect_err("orphan end");
        assert_eq!(
            err,
            DecodeError::protocol_violation("end_marker", SessionState::Idle)
        );
    }

    #[test]
    fn multi_byte_result_uses_first_byte() {
        let mut session = Session::default();
        decode_frame(&mut session, marker("enable", 0)).expect("enable");
        let wide = frame(json!({
            "type": "result",
            "start_time": 1,
            "end_time": 2,
            "data": { "mosi": [0xC0, 0x02], "miso": [0x00, 0x00] }
        }));
        decode_frame(&mut session, wide).expect("result");
        let segments = decode_frame(&mut session, marker("disable", 3))
            .expect("disable")
            .expect("segments");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].data.get("instruction").map(String::as_str), Some("RESET"));
    }
}
