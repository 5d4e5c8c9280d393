//! JWT token creation and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::types::Claims;
use crate::error::AuthError;

/// Issuer stamped on every token.
pub const TOKEN_ISSUER: &str = "grafbase";

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Sign `claims` into a token valid for the default lifetime.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode_token_with_ttl(claims, secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
}

/// Sign `claims` into a token valid for `ttl`.
///
/// `iss`, `iat` and `exp` are always overwritten.
pub fn encode_token_with_ttl(
    claims: &Claims,
    secret: &str,
    ttl: Duration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let mut claims = claims.clone();
    claims.insert("iss", TOKEN_ISSUER);
    claims.insert("iat", now.timestamp());
    claims.insert("exp", (now + ttl).timestamp());

    sign(&claims, secret).map_err(|e| {
        tracing::error!("Error encoding token: {}", e);
        AuthError::Encoding(e)
    })
}

/// Verify a token and return its claims, rejecting expired tokens.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode_token_with(token, secret, true)
}

/// Verify a token and return its claims.
///
/// With `enforce_expiry` off, an expired but correctly signed token still
/// decodes.
pub fn decode_token_with(
    token: &str,
    secret: &str,
    enforce_expiry: bool,
) -> Result<Claims, AuthError> {
    verify(token, secret, enforce_expiry).map_err(|e| {
        tracing::error!("Error decoding token: {}", e);
        AuthError::Decoding(e)
    })
}

fn sign(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    if secret.is_empty() {
        return Err(ErrorKind::InvalidKeyFormat.into());
    }
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn verify(
    token: &str,
    secret: &str,
    enforce_expiry: bool,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    if secret.is_empty() {
        return Err(ErrorKind::InvalidKeyFormat.into());
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = enforce_expiry;
    // Audience is caller data here, not something this codec checks.
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret-key-for-testing-only";

    fn sample_claims() -> Claims {
        let mut claims = Claims::new();
        claims.insert("name", "Ada Lovelace");
        claims.insert("email", "ada@example.com");
        claims.insert("picture", "https://img.example.com/ada.png");
        claims.insert("role", json!(["admin"]));
        claims
    }

    #[test]
    fn test_encode_and_decode_token() {
        let claims = sample_claims();
        let token = encode_token(&claims, SECRET).expect("should encode token");
        let decoded = decode_token(&token, SECRET).expect("should decode token");

        for key in claims.keys() {
            assert_eq!(decoded.get(key), claims.get(key), "claim {key} changed");
        }
        assert_eq!(decoded.issuer(), Some(TOKEN_ISSUER));
        assert!(decoded.exp().unwrap() > Utc::now().timestamp());
        assert!(decoded.contains_key("iat"));
    }

    #[test]
    fn test_registered_claim_names_round_trip() {
        let mut claims = sample_claims();
        claims.insert("aud", "flexibble");
        claims.insert("sub", "google-oauth2|1234");
        claims.insert("nbf", Utc::now().timestamp() - 60);
        claims.insert("jti", "3f2a9c1e");
        claims.insert("iss", "someone-else");
        claims.insert("exp", 1);

        let token = encode_token(&claims, SECRET).expect("should encode token");
        let decoded = decode_token(&token, SECRET).expect("should decode token");

        for key in ["name", "email", "picture", "role", "aud", "sub", "nbf", "jti"] {
            assert_eq!(decoded.get(key), claims.get(key), "claim {key} changed");
        }
        assert_eq!(decoded.issuer(), Some(TOKEN_ISSUER));
        assert!(decoded.exp().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_audience_list_round_trips() {
        let mut claims = sample_claims();
        claims.insert("aud", json!(["flexibble", "admin-console"]));

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.get("aud"), Some(&json!(["flexibble", "admin-console"])));
    }

    #[test]
    fn test_exp_is_one_hour_out() {
        let token = encode_token(&sample_claims(), SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        let remaining = decoded.exp().unwrap() - Utc::now().timestamp();
        assert!((DEFAULT_TOKEN_TTL_SECS - 5..=DEFAULT_TOKEN_TTL_SECS).contains(&remaining));
    }

    #[test]
    fn test_caller_cannot_override_registered_claims() {
        let mut claims = sample_claims();
        claims.insert("iss", "someone-else");
        claims.insert("exp", 1);

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.issuer(), Some(TOKEN_ISSUER));
        assert!(decoded.exp().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode_token(&sample_claims(), SECRET).unwrap();
        let err = decode_token(&token, "wrong-secret").unwrap_err();
        match err {
            AuthError::Decoding(e) => assert!(matches!(e.kind(), ErrorKind::InvalidSignature)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = decode_token("invalid-token", SECRET);
        assert!(matches!(result, Err(AuthError::Decoding(_))));
    }

    #[test]
    fn test_empty_secret_fails_to_encode() {
        let result = encode_token(&sample_claims(), "");
        assert!(matches!(result, Err(AuthError::Encoding(_))));
    }

    #[test]
    fn test_empty_secret_fails_to_decode() {
        let token = encode_token(&sample_claims(), SECRET).unwrap();
        assert!(matches!(decode_token(&token, ""), Err(AuthError::Decoding(_))));
    }

    #[test]
    fn test_expired_token_rejected_when_enforced() {
        let token = encode_token_with_ttl(&sample_claims(), SECRET, Duration::hours(-2)).unwrap();
        let err = decode_token_with(&token, SECRET, true).unwrap_err();
        match err {
            AuthError::Decoding(e) => assert!(matches!(e.kind(), ErrorKind::ExpiredSignature)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_expired_token_decodes_when_not_enforced() {
        let token = encode_token_with_ttl(&sample_claims(), SECRET, Duration::hours(-2)).unwrap();
        let claims = decode_token_with(&token, SECRET, false).expect("signature is still valid");
        assert!(claims.is_expired_at(Utc::now()));
        assert_eq!(claims.email(), Some("ada@example.com"));
    }
}
