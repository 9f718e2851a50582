//! Wire frames and the compression codec.
//!
//! A [`Frame`] is a single unit of data crossing the channel. In
//! uncompressed mode frames are structured JSON objects passed through
//! the channel's native object framing. In compressed mode frames are
//! text: either raw JSON (payload under the size gate) or the marker
//! character `z` followed by the base64 encoding of the gzip-compressed
//! JSON bytes.
//!
//! # Wire Format
//!
//! | Mode | Frame |
//! |------|-------|
//! | uncompressed | the body object itself |
//! | compressed, `len <= gate` | raw JSON text |
//! | compressed, `len > gate` or `gate == 0` | `"z" + base64(gzip(json))` |
//!
//! Compression runs on the blocking pool; both [`encode`] and [`decode`]
//! suspend while it completes.

// ============================================================================
// Imports
// ============================================================================

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::{Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Leading marker on compressed textual frames.
pub const COMPRESSED_MARKER: char = 'z';

// ============================================================================
// Frame
// ============================================================================

/// A single unit of data sent or received over the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Structured object frame (uncompressed mode).
    Object(serde_json::Value),

    /// Textual frame (compressed mode), raw JSON or marker-prefixed
    /// base64.
    Text(String),
}

impl Frame {
    /// Returns `true` if this is a marker-prefixed compressed frame.
    #[inline]
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Text(text) if text.starts_with(COMPRESSED_MARKER))
    }
}

// ============================================================================
// Encode
// ============================================================================

/// Encodes an outbound request into a wire frame.
///
/// With `compressed` off the request passes through as a structured
/// object. With it on, the request is serialized to JSON text and
/// gzip-compressed when the text exceeds `compress_length` bytes
/// (`0` compresses unconditionally).
///
/// # Errors
///
/// - [`Error::Json`] if serialization fails
/// - [`Error::Encode`] if compression fails
pub async fn encode(request: &Request, compressed: bool, compress_length: usize) -> Result<Frame> {
    if !compressed {
        return Ok(Frame::Object(serde_json::to_value(request)?));
    }

    let json = serde_json::to_string(request)?;
    if compress_length != 0 && json.len() <= compress_length {
        trace!(
            len = json.len(),
            gate = compress_length,
            "Payload under size gate, sending raw JSON"
        );
        return Ok(Frame::Text(json));
    }

    let body = gzip(json.into_bytes()).await?;
    let mut text = String::with_capacity(1 + body.len().div_ceil(3) * 4);
    text.push(COMPRESSED_MARKER);
    text.push_str(&BASE64.encode(&body));
    Ok(Frame::Text(text))
}

// ============================================================================
// Decode
// ============================================================================

/// Decodes an inbound wire frame into a response.
///
/// Object frames deserialize directly. Textual frames starting with the
/// marker are base64-decoded and gunzipped first; textual frames without
/// the marker parse as plain JSON.
///
/// # Errors
///
/// - [`Error::Base64`] on a malformed base64 remainder
/// - [`Error::Decode`] on a malformed gzip stream
/// - [`Error::Json`] on invalid JSON
pub async fn decode(frame: Frame) -> Result<Response> {
    match frame {
        Frame::Object(value) => Ok(serde_json::from_value(value)?),
        Frame::Text(text) => {
            if let Some(rest) = text.strip_prefix(COMPRESSED_MARKER) {
                let body = BASE64.decode(rest)?;
                let json = gunzip(body).await?;
                Ok(serde_json::from_slice(&json)?)
            } else {
                Ok(serde_json::from_str(&text)?)
            }
        }
    }
}

// ============================================================================
// Compression Helpers
// ============================================================================

/// Gzip-compresses bytes on the blocking pool.
async fn gzip(bytes: Vec<u8>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()
    })
    .await
    .map_err(|e| Error::encode(format!("compression task failed: {e}")))?
    .map_err(|e| Error::encode(e.to_string()))
}

/// Gunzip-decompresses bytes on the blocking pool.
async fn gunzip(bytes: Vec<u8>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut decoder = GzDecoder::new(bytes.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    })
    .await
    .map_err(|e| Error::decode(format!("decompression task failed: {e}")))?
    .map_err(|e: std::io::Error| Error::decode(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::RequestId;
    use serde_json::json;

    fn request(id: &str) -> Request {
        Request::with_id(
            RequestId::new(id),
            json!({ "method": "echo", "params": ["hello", "world"] }),
        )
        .expect("object body")
    }

    #[tokio::test]
    async fn test_uncompressed_passthrough() {
        let req = request("r1");
        let frame = encode(&req, false, 0).await.expect("encode");

        assert!(matches!(frame, Frame::Object(_)));
        assert!(!frame.is_compressed());

        let response = decode(frame).await.expect("decode");
        assert_eq!(response.id, req.id);
        assert_eq!(response.body, req.body);
    }

    #[tokio::test]
    async fn test_compressed_round_trip_gate_zero() {
        let req = request("r1");
        let frame = encode(&req, true, 0).await.expect("encode");

        // Gate 0 compresses unconditionally
        assert!(frame.is_compressed());

        let response = decode(frame).await.expect("decode");
        assert_eq!(response.id, req.id);
        assert_eq!(response.body, req.body);
    }

    #[tokio::test]
    async fn test_compressed_under_gate_is_raw_json() {
        let req = request("r1");
        let frame = encode(&req, true, 1_000_000).await.expect("encode");

        let Frame::Text(text) = &frame else {
            panic!("expected textual frame");
        };
        assert!(!frame.is_compressed());

        // The frame is the literal JSON text of the request
        let parsed: Request = serde_json::from_str(text).expect("literal JSON");
        assert_eq!(parsed, req);

        let response = decode(frame).await.expect("decode");
        assert_eq!(response.id, req.id);
    }

    #[tokio::test]
    async fn test_gate_boundary_is_inclusive() {
        let req = request("r1");
        let json_len = serde_json::to_string(&req).expect("serialize").len();

        // Exactly at the gate: raw JSON, one over: compressed
        let at_gate = encode(&req, true, json_len).await.expect("encode");
        assert!(!at_gate.is_compressed());

        let over_gate = encode(&req, true, json_len - 1).await.expect("encode");
        assert!(over_gate.is_compressed());
    }

    #[tokio::test]
    async fn test_decode_malformed_base64() {
        let frame = Frame::Text("z!!!not-base64!!!".to_string());
        let err = decode(frame).await.expect_err("must fail");
        assert!(matches!(err, Error::Base64(_)));
    }

    #[tokio::test]
    async fn test_decode_truncated_gzip_stream() {
        let encoded = BASE64.encode(b"definitely not a gzip stream");
        let frame = Frame::Text(format!("z{encoded}"));
        let err = decode(frame).await.expect_err("must fail");
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_decode_invalid_json_text() {
        let frame = Frame::Text("{ not json".to_string());
        let err = decode(frame).await.expect_err("must fail");
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_large_payload_shrinks() {
        let req = Request::with_id(
            RequestId::new("r1"),
            json!({ "blob": "a".repeat(16 * 1024) }),
        )
        .expect("object body");
        let json_len = serde_json::to_string(&req).expect("serialize").len();

        let frame = encode(&req, true, 0).await.expect("encode");
        let Frame::Text(text) = &frame else {
            panic!("expected textual frame");
        };

        assert!(text.len() < json_len);
    }

    mod round_trip_properties {
        use super::*;
        use proptest::prelude::*;
        use serde_json::{Map, Value};

        fn arb_body() -> impl Strategy<Value = Map<String, Value>> {
            let leaf = prop_oneof![
                any::<i64>().prop_map(Value::from),
                any::<bool>().prop_map(Value::from),
                "[a-zA-Z0-9 ]{0,64}".prop_map(Value::from),
            ];
            prop::collection::btree_map("[a-z_]{1,12}", leaf, 0..8).prop_map(|entries| {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key, value);
                }
                map
            })
        }

        fn block_on<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime")
                .block_on(future)
        }

        proptest! {
            #[test]
            fn compressed_round_trip(body in arb_body()) {
                let req = Request::from_parts(RequestId::generate(), body);
                let (frame_zero, frame_raw) = block_on(async {
                    (
                        encode(&req, true, 0).await.expect("encode gate 0"),
                        encode(&req, true, usize::MAX).await.expect("encode huge gate"),
                    )
                });

                prop_assert!(frame_zero.is_compressed());
                prop_assert!(!frame_raw.is_compressed());

                let (resp_zero, resp_raw) = block_on(async {
                    (
                        decode(frame_zero).await.expect("decode gate 0"),
                        decode(frame_raw).await.expect("decode raw"),
                    )
                });

                prop_assert_eq!(resp_zero.id.clone(), req.id.clone());
                prop_assert_eq!(resp_zero.body, req.body.clone());
                prop_assert_eq!(resp_raw.id, req.id);
                prop_assert_eq!(resp_raw.body, req.body);
            }
        }
    }
}
