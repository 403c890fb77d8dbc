//! Oracle response envelope and vector payload codec.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OracleError;

/// Envelope is the JSON document the oracle prints on stdout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    /// Base64 of a little-endian f32 array. Present iff `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Advisory dimensions of the encoded array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,

    /// Oracle-reported failure text. Present iff not `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decodes raw oracle stdout into a feature vector.
pub fn decode_response(stdout: &[u8]) -> Result<Vec<f32>, OracleError> {
    let env: Envelope =
        serde_json::from_slice(stdout).map_err(|e| OracleError::InvalidResponse {
            reason: e.to_string(),
            stderr: String::new(),
        })?;
    decode_envelope(&env)
}

pub(crate) fn decode_envelope(env: &Envelope) -> Result<Vec<f32>, OracleError> {
    if !env.success {
        let msg = env.error.clone().unwrap_or_else(|| "no error message".to_string());
        return Err(OracleError::Rejected(msg));
    }
    let encoding = env.encoding.as_deref().ok_or(OracleError::MissingEncoding)?;
    let vector = decode_vector(encoding)?;
    if vector.is_empty() {
        return Err(OracleError::EmptyVector);
    }

    if let Some(shape) = &env.shape {
        let want: usize = shape.iter().product();
        if want != vector.len() {
            warn!(
                "oracle shape {:?} disagrees with decoded length {}",
                shape,
                vector.len()
            );
        }
    }
    Ok(vector)
}

/// Decodes standard base64 into consecutive little-endian f32 values.
pub fn decode_vector(b64: &str) -> Result<Vec<f32>, OracleError> {
    let bytes = STANDARD.decode(b64.trim())?;
    if bytes.len() % 4 != 0 {
        return Err(OracleError::MalformedPayload { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Inverse of [`decode_vector`].
pub fn encode_vector(vector: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(v: &[f32]) -> Vec<u32> {
        v.iter().map(|f| f.to_bits()).collect()
    }

    #[test]
    fn vector_round_trip_is_bit_exact() {
        let input = [
            0.0,
            -0.0,
            1.0,
            -1.5,
            f32::MIN,
            f32::MAX,
            f32::MIN_POSITIVE,
            f32::EPSILON,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::from_bits(0x7fc0_0001), // NaN with payload
            f32::from_bits(0x0000_0001), // smallest subnormal
        ];
        let got = decode_vector(&encode_vector(&input)).unwrap();
        assert_eq!(bits(&got), bits(&input));
    }

    #[test]
    fn decode_known_bytes() {
        // 1.0f32 = 0x3f800000, -2.0f32 = 0xc0000000, little-endian.
        let b64 = STANDARD.encode([0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x00, 0xc0]);
        assert_eq!(decode_vector(&b64).unwrap(), vec![1.0, -2.0]);
    }

    #[test]
    fn decode_rejects_partial_float() {
        let b64 = STANDARD.encode([1u8, 2, 3, 4, 5, 6]);
        let err = decode_vector(&b64).unwrap_err();
        assert!(matches!(err, OracleError::MalformedPayload { len: 6 }));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        let err = decode_vector("!!not base64!!").unwrap_err();
        assert!(matches!(err, OracleError::Base64(_)));
    }

    #[test]
    fn response_success() {
        let body = format!(
            r#"{{"success": true, "encoding": "{}", "shape": [3]}}"#,
            encode_vector(&[0.25, 0.5, 0.75])
        );
        assert_eq!(decode_response(body.as_bytes()).unwrap(), vec![0.25, 0.5, 0.75]);
    }

    #[test]
    fn response_shape_mismatch_is_advisory() {
        let body = format!(
            r#"{{"success": true, "encoding": "{}", "shape": [128]}}"#,
            encode_vector(&[0.25, 0.5])
        );
        assert_eq!(decode_response(body.as_bytes()).unwrap(), vec![0.25, 0.5]);
    }

    #[test]
    fn response_failure_carries_message() {
        let err = decode_response(br#"{"success": false, "error": "No face found"}"#).unwrap_err();
        match err {
            OracleError::Rejected(msg) => assert_eq!(msg, "No face found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn response_success_without_encoding() {
        let err = decode_response(br#"{"success": true}"#).unwrap_err();
        assert!(matches!(err, OracleError::MissingEncoding));
    }

    #[test]
    fn response_empty_encoding() {
        let err = decode_response(br#"{"success": true, "encoding": ""}"#).unwrap_err();
        assert!(matches!(err, OracleError::EmptyVector));
    }

    #[test]
    fn response_not_json() {
        let err = decode_response(b"Traceback (most recent call last):").unwrap_err();
        assert!(matches!(err, OracleError::InvalidResponse { .. }));
    }
}
