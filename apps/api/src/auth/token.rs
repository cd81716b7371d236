//! Signed sharing tokens.
//!
//! Compact HS256 JWTs (`header.claims.signature`, base64url without padding)
//! carrying the prediction id they unlock. `exp` is mandatory: a token that
//! never expires is rejected as malformed.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token is not a compact JWT")]
    Malformed,

    #[error("unsupported token algorithm")]
    Algorithm,

    #[error("signature mismatch")]
    Signature,

    #[error("claims could not be decoded")]
    Claims,

    #[error("token has no expiry")]
    MissingExpiry,

    #[error("token expired at {0}")]
    Expired(i64),

    #[error("invalid signing key")]
    Key,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareClaims {
    pub prediction_id: String,
    /// Seconds since the epoch.
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
}

/// Verified claims with their mandatory expiry unpacked.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub prediction_id: String,
    pub expires_at: DateTime<Utc>,
}

/// A freshly minted token, as returned from the share endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies sharing tokens with one shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Key)
    }

    pub fn issue(
        &self,
        prediction_id: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now + ttl;
        let claims = ShareClaims {
            prediction_id: prediction_id.to_string(),
            exp: Some(expires_at.timestamp()),
            iat: Some(now.timestamp()),
        };
        let claims_json = serde_json::to_vec(&claims).map_err(|_| TokenError::Claims)?;
        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let mut mac = self.mac()?;
        mac.update(message.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{message}.{signature}"),
            expires_at: DateTime::from_timestamp(expires_at.timestamp(), 0).unwrap_or(expires_at),
        })
    }

    /// Checks structure, algorithm, signature and expiry, in that order.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let mut parts = token.trim().split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::Malformed)?;
        let header: JwtHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::Algorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Signature)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Signature)?;

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| TokenError::Claims)?;
        let claims: ShareClaims =
            serde_json::from_slice(&claims_bytes).map_err(|_| TokenError::Claims)?;

        let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;
        if exp <= now.timestamp() {
            return Err(TokenError::Expired(exp));
        }
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(TokenError::Claims)?;

        Ok(VerifiedToken {
            prediction_id: claims.prediction_id,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn signer() -> TokenSigner {
        TokenSigner::new(SECRET)
    }

    /// Signs arbitrary claims JSON, for tokens `issue` would never produce.
    fn sign_raw(claims: &str) -> String {
        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER),
            URL_SAFE_NO_PAD.encode(claims)
        );
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        format!("{message}.{}", URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_issued_token_verifies() {
        let issued = signer()
            .issue("img-pred-1-abc", Duration::hours(24), now())
            .unwrap();
        let verified = signer().verify(&issued.token, now()).unwrap();
        assert_eq!(verified.prediction_id, "img-pred-1-abc");
        assert_eq!(verified.expires_at, now() + Duration::hours(24));
        assert_eq!(issued.expires_at, verified.expires_at);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = signer()
            .issue("img-pred-1-abc", Duration::hours(1), now())
            .unwrap();
        let later = now() + Duration::hours(1);
        assert!(matches!(
            signer().verify(&issued.token, later),
            Err(TokenError::Expired(_))
        ));
    }

    #[test]
    fn test_token_without_expiry_is_rejected() {
        let token = sign_raw(r#"{"predictionId":"img-pred-1-abc","iat":1717243200}"#);
        assert_eq!(
            signer().verify(&token, now()),
            Err(TokenError::MissingExpiry)
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issued = TokenSigner::new("another-secret-another-secret-xx")
            .issue("img-pred-1-abc", Duration::hours(1), now())
            .unwrap();
        assert_eq!(
            signer().verify(&issued.token, now()),
            Err(TokenError::Signature)
        );
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let issued = signer()
            .issue("img-pred-1-abc", Duration::hours(1), now())
            .unwrap();
        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(r#"{"predictionId":"other","exp":9999999999}"#);
        parts[1] = &forged;
        assert_eq!(
            signer().verify(&parts.join("."), now()),
            Err(TokenError::Signature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(signer().verify("", now()), Err(TokenError::Malformed));
        assert_eq!(signer().verify("a.b", now()), Err(TokenError::Malformed));
        assert_eq!(signer().verify("a.b.c.d", now()), Err(TokenError::Malformed));
    }

    #[test]
    fn test_none_algorithm_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(r#"{"predictionId":"x","exp":9999999999}"#);
        assert_eq!(
            signer().verify(&format!("{header}.{claims}."), now()),
            Err(TokenError::Algorithm)
        );
    }
}
