//! Unverified JWT decoding, for diagnostics only.

use crate::error::AuthError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;

/// Header and payload of a JWT, signature not checked
#[derive(Debug, Clone)]
pub struct DecodedJwt {
    /// JOSE header
    pub header: Value,
    /// Claims
    pub claims: Value,
}

impl DecodedJwt {
    /// `kid` from the header
    pub fn key_id(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }

    /// `alg` from the header
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }
}

/// Split a JWT and decode header and payload without verifying anything
pub fn decode_unverified(token: &str) -> Result<DecodedJwt, AuthError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 parts, found {}",
            parts.len()
        )));
    }

    Ok(DecodedJwt {
        header: decode_segment(parts[0], "header")?,
        claims: decode_segment(parts[1], "payload")?,
    })
}

fn decode_segment(segment: &str, name: &str) -> Result<Value, AuthError> {
    // Padding is optional in JWTs; accept it either way
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("{} is not base64url: {}", name, e)))?;

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("{} is not JSON: {}", name, e)))?;

    if !value.is_object() {
        return Err(AuthError::MalformedToken(format!("{} is not a JSON object", name)));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(value: &Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    fn make_token(header: Value, claims: Value) -> String {
        format!("{}.{}.sig", segment(&header), segment(&claims))
    }

    #[test]
    fn test_decode_roundtrip() {
        let token = make_token(
            json!({"alg": "RS256", "kid": "key-1", "typ": "JWT"}),
            json!({"iss": "https://sts.windows.net/t/", "aud": "api://c"}),
        );

        let decoded = decode_unverified(&token).unwrap();
        assert_eq!(decoded.key_id(), Some("key-1"));
        assert_eq!(decoded.algorithm(), Some("RS256"));
        assert_eq!(decoded.claims["aud"], "api://c");
    }

    #[test]
    fn test_padded_segments_accepted() {
        let header = segment(&json!({"alg": "none"}));
        let claims = segment(&json!({"sub": "x"}));
        let padded = |s: &str| {
            let pad = (4 - s.len() % 4) % 4;
            format!("{}{}", s, "=".repeat(pad))
        };
        let token = format!("{}.{}.", padded(&header), padded(&claims));

        let decoded = decode_unverified(&token).unwrap();
        assert_eq!(decoded.claims["sub"], "x");
    }

    #[test]
    fn test_wrong_segment_count() {
        let err = decode_unverified("a.b").unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(msg) if msg.contains("expected 3 parts")));
    }

    #[test]
    fn test_payload_not_json() {
        let header = segment(&json!({"alg": "none"}));
        let token = format!("{}.{}.sig", header, URL_SAFE_NO_PAD.encode("not json"));
        let err = decode_unverified(&token).unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(msg) if msg.contains("payload")));
    }

    #[test]
    fn test_payload_not_object() {
        let header = segment(&json!({"alg": "none"}));
        let token = format!("{}.{}.sig", header, segment(&json!([1, 2])));
        assert!(decode_unverified(&token).is_err());
    }
}
