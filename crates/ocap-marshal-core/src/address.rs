//! Capability token grammar.
//!
//! ```text
//! token      = domainName "#" capability [ "?" publicKey ]
//! short alias = domainName "#" capability
//! ```
//!
//! The domain name is opaque and must not contain `#`. The capability is
//! base64 and never contains `#` or `?`. The optional suffix is the
//! standard base64 of the remote domain's X25519 public key.

use std::fmt;

use crate::crypto::PublicKey;
use crate::error::{MarshalError, Result};

/// Separator between the domain name and the capability.
pub const DOMAIN_SEPARATOR: char = '#';

/// Separator between the capability and the public key suffix.
pub const KEY_SEPARATOR: char = '?';

/// A parsed capability token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    domain: String,
    capability: String,
    public_key: Option<String>,
}

impl Token {
    /// Build a full token from its parts.
    pub fn new(domain: &str, capability: &str, public_key: &PublicKey) -> Self {
        Self {
            domain: domain.to_string(),
            capability: capability.to_string(),
            public_key: Some(public_key.to_base64()),
        }
    }

    /// Parse a token in either the full or the short form.
    pub fn parse(text: &str) -> Result<Self> {
        let bad = || MarshalError::BadAddressFormat(text.to_string());

        let mut parts = text.split(DOMAIN_SEPARATOR);
        let (domain, rest) = match (parts.next(), parts.next(), parts.next()) {
            (Some(domain), Some(rest), None) => (domain, rest),
            _ => return Err(bad()),
        };

        let mut parts = rest.split(KEY_SEPARATOR);
        let (capability, public_key) = match (parts.next(), parts.next(), parts.next()) {
            (Some(capability), key, None) => (capability, key),
            _ => return Err(bad()),
        };

        if domain.is_empty() || capability.is_empty() {
            return Err(bad());
        }

        Ok(Self {
            domain: domain.to_string(),
            capability: capability.to_string(),
            public_key: public_key.map(str::to_string),
        })
    }

    /// The domain name part.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The capability id part.
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Whether the token carries a public key suffix.
    pub fn is_full(&self) -> bool {
        self.public_key.is_some()
    }

    /// The short alias, `domain#capability`.
    pub fn alias(&self) -> String {
        format!("{}{}{}", self.domain, DOMAIN_SEPARATOR, self.capability)
    }

    /// Decode the public key suffix.
    ///
    /// Fails with [`MarshalError::BadAddressFormat`] if the suffix is missing
    /// or does not decode to a 32-byte key.
    pub fn public_key(&self) -> Result<PublicKey> {
        self.public_key
            .as_deref()
            .and_then(PublicKey::from_base64)
            .ok_or_else(|| MarshalError::BadAddressFormat(self.to_string()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.domain, DOMAIN_SEPARATOR, self.capability)?;
        if let Some(key) = &self.public_key {
            write!(f, "{}{}", KEY_SEPARATOR, key)?;
        }
        Ok(())
    }
}

/// Short alias of a token string.
pub fn short_alias(token: &str) -> Result<String> {
    Token::parse(token).map(|t| t.alias())
}

/// The domain name part of an address, as seen by a router.
///
/// Only the `#` split is checked; the remainder is opaque here.
pub fn domain_of(address: &str) -> Result<&str> {
    let mut parts = address.split(DOMAIN_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(domain), Some(_), None) => Ok(domain),
        _ => Err(MarshalError::BadAddressFormat(address.to_string())),
    }
}
