//! Slack request signing (`X-Slack-Signature: v0=<hex hmac-sha256>`)

use crate::error::{BridgeError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_VERSION: &str = "v0";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

pub struct SignatureVerifier {
    signing_secret: String,
    tolerance: Duration,
}

impl SignatureVerifier {
    pub fn new(signing_secret: impl Into<String>, tolerance: Duration) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            tolerance,
        }
    }

    /// Verify a delivery against the current wall clock
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<()> {
        self.verify_at(timestamp, signature, body, chrono::Utc::now().timestamp())
    }

    /// Verify a delivery as of `now` (unix seconds)
    ///
    /// Header problems are reported as [`BridgeError::MalformedHeaders`] and are
    /// checked before any hashing; only a well-formed signature that does not
    /// match yields [`BridgeError::Authentication`].
    pub fn verify_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<()> {
        let timestamp = timestamp
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BridgeError::MalformedHeaders("missing request timestamp".into()))?;
        let seconds: i64 = timestamp.parse().map_err(|_| {
            BridgeError::MalformedHeaders(format!("unparsable request timestamp: {}", timestamp))
        })?;

        let digest_hex = signature
            .map(str::trim)
            .ok_or_else(|| BridgeError::MalformedHeaders("missing request signature".into()))?
            .strip_prefix("v0=")
            .ok_or_else(|| BridgeError::MalformedHeaders("signature must use v0=<hex>".into()))?;
        let expected = hex::decode(digest_hex)
            .map_err(|e| BridgeError::MalformedHeaders(format!("signature is not hex: {}", e)))?;

        if !self.tolerance.is_zero() && now.abs_diff(seconds) > self.tolerance.as_secs() {
            return Err(BridgeError::MalformedHeaders(format!(
                "request timestamp {} outside {}s tolerance",
                seconds,
                self.tolerance.as_secs()
            )));
        }

        let mac = self.mac_for(timestamp, body)?;
        mac.verify_slice(&expected)
            .map_err(|_| BridgeError::Authentication("signature mismatch".into()))
    }

    /// Signature Slack would send for this body, `v0=<hex>`
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String> {
        let mac = self.mac_for(timestamp, body)?;
        Ok(format!(
            "{}={}",
            SIGNATURE_VERSION,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    fn mac_for(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| BridgeError::Transport(format!("HMAC init failed: {}", e)))?;
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    const NOW: i64 = 1_700_000_000;
    const BODY: &[u8] = br#"{"type":"url_verification","challenge":"abc"}"#;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new("test-signing-secret", Duration::from_secs(300))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let v = verifier();
        let ts = NOW.to_string();
        let sig = v.sign(&ts, BODY).unwrap();

        assert_ok!(v.verify_at(Some(&ts), Some(&sig), BODY, NOW));
    }

    #[test]
    fn test_known_vector() {
        // Example from Slack's request signing documentation
        let v = SignatureVerifier::new("8f742231b10e8888abcd99yyyzzz85a5", Duration::ZERO);
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        let sig = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";

        assert_ok!(v.verify_at(Some("1531420618"), Some(sig), body, 0));
    }

    #[test]
    fn test_tampered_body_rejected_as_unauthorized() {
        let v = verifier();
        let ts = NOW.to_string();
        let sig = v.sign(&ts, BODY).unwrap();

        let err = assert_err!(v.verify_at(
            Some(&ts),
            Some(&sig),
            br#"{"type":"url_verification","challenge":"evil"}"#,
            NOW
        ));
        assert!(matches!(err, BridgeError::Authentication(_)));
    }

    #[test]
    fn test_missing_or_bad_timestamp_is_malformed() {
        let v = verifier();
        let sig = v.sign("1", BODY).unwrap();

        assert!(matches!(
            v.verify_at(None, Some(&sig), BODY, NOW),
            Err(BridgeError::MalformedHeaders(_))
        ));
        assert!(matches!(
            v.verify_at(Some("yesterday"), Some(&sig), BODY, NOW),
            Err(BridgeError::MalformedHeaders(_))
        ));
    }

    #[test]
    fn test_bad_signature_format_is_malformed() {
        let v = verifier();
        let ts = NOW.to_string();

        assert!(matches!(
            v.verify_at(Some(&ts), None, BODY, NOW),
            Err(BridgeError::MalformedHeaders(_))
        ));
        assert!(matches!(
            v.verify_at(Some(&ts), Some("v1=abcd"), BODY, NOW),
            Err(BridgeError::MalformedHeaders(_))
        ));
        assert!(matches!(
            v.verify_at(Some(&ts), Some("v0=not-hex"), BODY, NOW),
            Err(BridgeError::MalformedHeaders(_))
        ));
    }

    #[test]
    fn test_wrong_but_wellformed_signature_is_unauthorized() {
        let v = verifier();
        let ts = NOW.to_string();

        assert!(matches!(
            v.verify_at(Some(&ts), Some("v0=deadbeef"), BODY, NOW),
            Err(BridgeError::Authentication(_))
        ));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let v = verifier();
        let ts = (NOW - 301).to_string();
        let sig = v.sign(&ts, BODY).unwrap();

        assert!(matches!(
            v.verify_at(Some(&ts), Some(&sig), BODY, NOW),
            Err(BridgeError::MalformedHeaders(_))
        ));
    }

    #[test]
    fn test_zero_tolerance_disables_staleness_check() {
        let v = SignatureVerifier::new("test-signing-secret", Duration::ZERO);
        let ts = "1000".to_string();
        let sig = v.sign(&ts, BODY).unwrap();

        assert_ok!(v.verify_at(Some(&ts), Some(&sig), BODY, NOW));
    }
}
