use std::fmt;

use ed25519_dalek::{Signer, SigningKey};

use crate::error::CredentialError;

/// Key held in-process that lets the broker sign and submit on its own
/// behalf, without an external wallet.
#[derive(Clone)]
pub struct OperatorCredential {
    account_id: String,
    signing_key: SigningKey,
}

impl OperatorCredential {
    pub fn new(account_id: impl Into<String>, signing_key: SigningKey) -> Result<Self, CredentialError> {
        let account_id = account_id.into();
        if account_id.trim().is_empty() {
            return Err(CredentialError::MissingAccount);
        }
        Ok(Self {
            account_id,
            signing_key,
        })
    }

    /// Parse a hex encoded 32-byte ed25519 seed, optionally `0x` prefixed.
    pub fn from_hex(account_id: impl Into<String>, key_hex: &str) -> Result<Self, CredentialError> {
        let trimmed = key_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let raw = hex::decode(trimmed)?;
        let seed: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CredentialError::InvalidLength(raw.len()))?;
        Self::new(account_id, SigningKey::from_bytes(&seed))
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }
}

impl fmt::Debug for OperatorCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorCredential")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key_hex())
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    const SEED_HEX: &str = "0707070707070707070707070707070707070707070707070707070707070707";

    #[test]
    fn parses_prefixed_hex_and_signs() {
        let credential = OperatorCredential::from_hex("0.0.1001", &format!("0x{SEED_HEX}")).unwrap();
        assert_eq!(credential.account_id(), "0.0.1001");

        let signature = credential.sign(b"payload");
        let signature = Signature::from_slice(&signature).unwrap();
        let verifying = SigningKey::from_bytes(&[7u8; 32]).verifying_key();
        assert!(verifying.verify(b"payload", &signature).is_ok());
        assert_eq!(credential.public_key_hex(), hex::encode(verifying.to_bytes()));
    }

    #[test]
    fn rejects_bad_keys() {
        assert!(matches!(
            OperatorCredential::from_hex("0.0.1", "abcd"),
            Err(CredentialError::InvalidLength(2))
        ));
        assert!(matches!(
            OperatorCredential::from_hex("0.0.1", "not-hex"),
            Err(CredentialError::InvalidHex(_))
        ));
        assert!(matches!(
            OperatorCredential::from_hex(" ", SEED_HEX),
            Err(CredentialError::MissingAccount)
        ));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let credential = OperatorCredential::from_hex("0.0.1001", SEED_HEX).unwrap();
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(SEED_HEX));
    }
}
