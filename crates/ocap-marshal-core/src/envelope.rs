//! The encrypted wire envelope.
//!
//! ```text
//! { address: "<domain>#<capability>",
//!   content: base64(ciphertext),
//!   nonce:   base64(nonce[12] || ephemeral_public_key[32]) }
//! ```
//!
//! Each envelope is sealed under a fresh ephemeral key pair, so two
//! envelopes never share a key even when sent to the same address.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::crypto::{
    EncryptionNonce, EphemeralKeyPair, PublicKey, SecretKey, KEY_LENGTH, NONCE_LENGTH,
};
use crate::error::{MarshalError, Result};

/// An encrypted message addressed to one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub address: String,
    pub content: String,
    #[serde(default)]
    pub nonce: String,
}

impl Envelope {
    /// Build an envelope from raw fields.
    pub fn new(
        address: impl Into<String>,
        content: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            content: content.into(),
            nonce: nonce.into(),
        }
    }

    /// Seal `plaintext` for the holder of `recipient`'s secret key.
    pub fn seal(address: &str, recipient: &PublicKey, plaintext: &[u8]) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let shared = ephemeral.diffie_hellman(recipient);
        let key = shared.derive_encryption_key(address.as_bytes());

        let nonce = EncryptionNonce::generate();
        let ciphertext = key.encrypt(plaintext, &nonce)?;

        let mut packed = Vec::with_capacity(NONCE_LENGTH + KEY_LENGTH);
        packed.extend_from_slice(nonce.as_bytes());
        packed.extend_from_slice(ephemeral_public.as_bytes());

        Ok(Self {
            address: address.to_string(),
            content: BASE64.encode(ciphertext),
            nonce: BASE64.encode(packed),
        })
    }

    /// Open the envelope with the secret key bound to its address.
    ///
    /// Any failure is reported as [`MarshalError::DecryptionFailed`]
    /// carrying this envelope.
    pub fn open(&self, secret: &SecretKey) -> Result<Vec<u8>> {
        let packed = BASE64
            .decode(&self.nonce)
            .map_err(|_| self.decryption_failed())?;
        if packed.len() != NONCE_LENGTH + KEY_LENGTH {
            return Err(self.decryption_failed());
        }
        let (nonce, ephemeral_public) = packed.split_at(NONCE_LENGTH);
        let nonce = EncryptionNonce::from_slice(nonce).ok_or_else(|| self.decryption_failed())?;
        let ephemeral_public =
            PublicKey::from_slice(ephemeral_public).ok_or_else(|| self.decryption_failed())?;

        let ciphertext = BASE64
            .decode(&self.content)
            .map_err(|_| self.decryption_failed())?;

        let shared = secret.diffie_hellman(&ephemeral_public);
        let key = shared.derive_encryption_key(self.address.as_bytes());

        key.decrypt(&ciphertext, &nonce)
            .ok_or_else(|| self.decryption_failed())
    }

    /// The error reported when this envelope cannot be opened.
    pub fn decryption_failed(&self) -> MarshalError {
        MarshalError::DecryptionFailed(self.to_json())
    }

    /// Compact JSON rendering, fields in `address, content, nonce` order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"address\":{:?},\"content\":{:?},\"nonce\":{:?}}}",
                self.address, self.content, self.nonce
            )
        })
    }

    /// Parse the JSON rendering.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MarshalError::Encoding(e.to_string()))
    }

    /// Serialize to CBOR bytes, for byte-oriented transports.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| MarshalError::Encoding(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| MarshalError::Encoding(e.to_string()))
    }
}
