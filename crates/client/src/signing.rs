//! RSA request signing.
//!
//! The repository authenticates this application by an RSA signature
//! (PKCS#1 v1.5 over SHA-256) of a per-request string, base64 encoded.

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{
    RsaPrivateKey,
    pkcs1::DecodeRsaPrivateKey,
    pkcs1v15::SigningKey,
    pkcs8::DecodePrivateKey,
    sha2::Sha256,
    signature::{SignatureEncoding, Signer},
};

use crate::error::{ClientError, Result};

/// Signs strings with the application's private key.
#[derive(Clone)]
pub struct RequestSigner {
    key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Loads a PEM-encoded private key in PKCS#8 or PKCS#1 form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPrivateKey`] if the key cannot be parsed.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem).or_else(|pkcs8_err| {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                ClientError::invalid_private_key(format!("PKCS#8: {pkcs8_err}; PKCS#1: {pkcs1_err}"))
            })
        })?;
        Ok(Self { key: SigningKey::<Sha256>::new(key) })
    }

    /// Signs `data` and returns the base64 encoded signature.
    #[must_use]
    pub fn sign(&self, data: &str) -> String {
        let signature = self.key.sign(data.as_bytes());
        STANDARD.encode(signature.to_bytes())
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").field("key", &"<redacted>").finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use rsa::{
        RsaPublicKey,
        pkcs1v15::{Signature, VerifyingKey},
        signature::Verifier,
    };

    use super::*;
    use crate::testutil::{TEST_PRIVATE_KEY, TEST_PRIVATE_KEY_PKCS1};

    fn verify(pem: &str, data: &str, signature_b64: &str) -> bool {
        let private = RsaPrivateKey::from_pkcs8_pem(pem).expect("parse key");
        let verifying = VerifyingKey::<Sha256>::new(RsaPublicKey::from(&private));
        let bytes = STANDARD.decode(signature_b64).expect("base64");
        let signature = Signature::try_from(bytes.as_slice()).expect("signature");
        verifying.verify(data.as_bytes(), &signature).is_ok()
    }

    #[test]
    fn test_signature_verifies_with_public_key() {
        let signer = RequestSigner::from_pem(TEST_PRIVATE_KEY).expect("signer");
        let signature = signer.sign("app-1ticket1700000000000");

        assert!(verify(TEST_PRIVATE_KEY, "app-1ticket1700000000000", &signature));
        assert!(!verify(TEST_PRIVATE_KEY, "tampered", &signature));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = RequestSigner::from_pem(TEST_PRIVATE_KEY).expect("signer");
        assert_eq!(signer.sign("data"), signer.sign("data"));
        assert_ne!(signer.sign("data"), signer.sign("other"));
    }

    #[test]
    fn test_pkcs1_key_signs_identically() {
        let pkcs8 = RequestSigner::from_pem(TEST_PRIVATE_KEY).expect("pkcs8");
        let pkcs1 = RequestSigner::from_pem(TEST_PRIVATE_KEY_PKCS1).expect("pkcs1");
        assert_eq!(pkcs8.sign("data"), pkcs1.sign("data"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let err = RequestSigner::from_pem("not a key").expect_err("must fail");
        assert!(matches!(err, ClientError::InvalidPrivateKey { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let signer = RequestSigner::from_pem(TEST_PRIVATE_KEY).expect("signer");
        assert_eq!(format!("{signer:?}"), r#"RequestSigner { key: "<redacted>" }"#);
    }
}
