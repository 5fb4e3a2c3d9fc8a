use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Clock drift tolerated on `iat` between the issuing and the validating host.
pub const ISSUED_AT_LEEWAY_SECS: i64 = 5;

/// Access token signer and validator.
///
/// Uses HS256 (HMAC with SHA-256). The secret, issuer and lifetime are fixed at
/// construction and shared by every request for the life of the process.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a new signer.
    ///
    /// # Arguments
    /// * `secret` - HMAC key; should be at least 256 bits (32 bytes)
    /// * `issuer` - Value written to and required in the `iss` claim
    /// * `ttl` - Lifetime of every issued token
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            ttl,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject`, valid from `now` until `now + ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, &self.issuer, now, self.ttl);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate a token against the clock reading `now` and return its subject.
    ///
    /// The signature is checked before any claim is trusted; then the validity
    /// window, then the issuer.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match the payload
    /// * `Malformed` - Token structure, header, algorithm or claims are unreadable
    /// * `Expired` - `now` is at or past `exp`
    /// * `NotYetValid` - `iat` lies in the future beyond the leeway
    /// * `WrongIssuer` - `iss` differs from this signer's issuer
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = self.verify_signature(token)?;
        let now = now.timestamp();

        if claims.is_expired(now) {
            return Err(JwtError::Expired);
        }

        if claims.is_issued_in_future(now, ISSUED_AT_LEEWAY_SECS) {
            return Err(JwtError::NotYetValid);
        }

        if claims.iss != self.issuer {
            return Err(JwtError::WrongIssuer(claims.iss));
        }

        Ok(claims.sub)
    }

    fn verify_signature(&self, token: &str) -> Result<Claims, JwtError> {
        // Time and issuer checks run against the caller's clock, not the library's.
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn signer() -> TokenSigner {
        TokenSigner::new(SECRET, "chirpy-access", Duration::minutes(5))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn replace_char(token: &str, index: usize) -> String {
        let mut bytes = token.as_bytes().to_vec();
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let signer = signer();

        let token = signer.issue("user123", at(0)).expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let subject = signer.validate(&token, at(0)).expect("Failed to validate");
        assert_eq!(subject, "user123");
    }

    #[test]
    fn test_validity_window_boundaries() {
        let signer = signer();
        let token = signer.issue("user123", at(0)).unwrap();

        assert_eq!(signer.validate(&token, at(299)).unwrap(), "user123");
        assert_eq!(signer.validate(&token, at(300)), Err(JwtError::Expired));
        assert_eq!(signer.validate(&token, at(301)), Err(JwtError::Expired));
    }

    #[test]
    fn test_issued_at_leeway() {
        let signer = signer();
        let token = signer.issue("user123", at(100)).unwrap();

        assert!(signer
            .validate(&token, at(100 - ISSUED_AT_LEEWAY_SECS))
            .is_ok());
        assert_eq!(
            signer.validate(&token, at(100 - ISSUED_AT_LEEWAY_SECS - 1)),
            Err(JwtError::NotYetValid)
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let signer = signer();
        let token = signer.issue("user123", at(0)).unwrap();

        let header_len = token.find('.').unwrap();
        let payload_len = token[header_len + 1..].find('.').unwrap();

        for index in (header_len + 1)..(header_len + 1 + payload_len) {
            let tampered = replace_char(&token, index);
            assert_eq!(
                signer.validate(&tampered, at(0)),
                Err(JwtError::InvalidSignature),
                "payload byte {} was mutated",
                index
            );
        }
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let signer = signer();
        let token = signer.issue("user123", at(0)).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        for index in signature_start..token.len() {
            let tampered = replace_char(&token, index);
            assert_eq!(
                signer.validate(&tampered, at(0)),
                Err(JwtError::InvalidSignature)
            );
        }
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issuer = TokenSigner::new(
            b"secret1_at_least_32_bytes_long_key!",
            "chirpy-access",
            Duration::minutes(5),
        );
        let validator = TokenSigner::new(
            b"secret2_at_least_32_bytes_long_key!",
            "chirpy-access",
            Duration::minutes(5),
        );

        let token = issuer.issue("user123", at(0)).unwrap();

        assert_eq!(
            validator.validate(&token, at(0)),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let other = TokenSigner::new(SECRET, "chirpy-refresh", Duration::minutes(5));
        let token = other.issue("user123", at(0)).unwrap();

        assert_eq!(
            signer().validate(&token, at(0)),
            Err(JwtError::WrongIssuer("chirpy-refresh".to_string()))
        );
    }

    #[test]
    fn test_validate_malformed_token() {
        let signer = signer();

        assert!(matches!(
            signer.validate("invalid.token.here", at(0)),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(
            signer.validate("", at(0)),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_claims() {
        let header = Header::new(Algorithm::HS256);
        let token = encode(
            &header,
            &json!({ "sub": "user123", "iss": "chirpy-access" }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            signer().validate(&token, at(0)),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_other_algorithm() {
        let header = Header::new(Algorithm::HS512);
        let claims = Claims::for_subject("user123", "chirpy-access", at(0), Duration::minutes(5));
        let token = encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap();

        assert!(matches!(
            signer().validate(&token, at(0)),
            Err(JwtError::Malformed(_))
        ));
    }
}
