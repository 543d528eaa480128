//! Client-side reading of bearer token claims.
//!
//! Nothing here verifies a signature or expiry. The role read from a token
//! only drives what the client shows; the backend enforces access.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value;
use thiserror::Error;

/// Standard alphabet, tolerant of missing or present padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Roles that unlock the manager dashboard.
pub const MANAGER_ROLES: &[&str] = &["MANAGER", "ROLE_MANAGER"];

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has no payload segment")]
    MissingPayload,

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Claims carried in the token payload.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    payload: Value,
}

impl TokenClaims {
    /// The `role` claim when it is a string.
    pub fn role(&self) -> Option<&str> {
        self.payload.get("role").and_then(Value::as_str)
    }

    /// The `sub` claim, which the identity service sets to the username.
    pub fn subject(&self) -> Option<&str> {
        self.payload.get("sub").and_then(Value::as_str)
    }
}

/// Decode the middle segment of a `header.payload.signature` token.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segment = token
        .split('.')
        .nth(1)
        .filter(|s| !s.is_empty())
        .ok_or(TokenError::MissingPayload)?;
    let standard: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let bytes = PAYLOAD_ENGINE.decode(standard.as_bytes())?;
    let payload: Value = serde_json::from_slice(&bytes)?;
    Ok(TokenClaims { payload })
}

/// Read the role claim, yielding `""` for any malformed token or missing role.
pub fn decode_role(token: &str) -> String {
    match decode_claims(token) {
        Ok(claims) => claims.role().unwrap_or_default().to_string(),
        Err(err) => {
            tracing::debug!(error = %err, "could not decode role from token");
            String::new()
        }
    }
}

/// Whether the role unlocks manager-only views. Presentation only.
pub fn is_manager_role(role: &str) -> bool {
    MANAGER_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn token_with(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn reads_role_claim() {
        let token = token_with(r#"{"sub":"maria","role":"MANAGER"}"#);
        assert_eq!(decode_role(&token), "MANAGER");
        assert_eq!(decode_claims(&token).unwrap().subject(), Some("maria"));
    }

    #[test]
    fn url_safe_characters_are_reversed() {
        // '?' bytes encode to '_' and '>' to '-' in the URL-safe alphabet
        let token = token_with(r#"{"role":"USER","note":">>>???"}"#);
        let segment = token.split('.').nth(1).unwrap();
        assert!(segment.contains('_') || segment.contains('-'));
        assert_eq!(decode_role(&token), "USER");
    }

    #[test]
    fn padded_payload_is_accepted() {
        let padded = base64::engine::general_purpose::STANDARD.encode(r#"{"role":"USER"}"#);
        assert_eq!(decode_role(&format!("h.{padded}.s")), "USER");
    }

    #[test]
    fn malformed_tokens_yield_empty_role() {
        for token in ["", "abc", "a..c", "a.!!!.c", "a.bm90IGpzb24.c"] {
            assert_eq!(decode_role(token), "", "token {token:?}");
        }
    }

    #[test]
    fn missing_or_non_string_role_is_empty() {
        assert_eq!(decode_role(&token_with(r#"{"sub":"x"}"#)), "");
        assert_eq!(decode_role(&token_with(r#"{"role":7}"#)), "");
        assert_eq!(decode_role(&token_with(r#"[1,2]"#)), "");
    }

    #[test]
    fn manager_roles() {
        assert!(is_manager_role("MANAGER"));
        assert!(is_manager_role("ROLE_MANAGER"));
        assert!(!is_manager_role("USER"));
        assert!(!is_manager_role(""));
    }
}
