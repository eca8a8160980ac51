//! The Domain: token lifecycle, codec and receptionist.

use std::fmt;
use std::sync::{Arc, Weak};

use ocap_marshal_core::{
    random_capability, Envelope, MarshalError, NoRoute, Reference, Result, SecretKey, Token,
    Transport, Value, WireValue,
};

use crate::codec::{decode_value, encode_value, TokenResolver};
use crate::config::DomainConfig;
use crate::proxy::Proxy;
use crate::table::{KeyMaterial, TokenTable};

/// A capability domain.
///
/// Cheap to clone; clones share the token table. Proxies minted by the
/// domain hold only a weak link back to it.
#[derive(Clone)]
pub struct Domain {
    inner: Arc<DomainInner>,
}

pub(crate) struct DomainInner {
    pub name: String,
    pub transport: Arc<dyn Transport>,
    capability_bytes: usize,
    table: TokenTable,
    weak_self: Weak<DomainInner>,
}

impl Domain {
    /// Create a domain whose outbound traffic has no route.
    pub fn new(config: DomainConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(NoRoute))
    }

    /// Create a domain sending through `transport`.
    pub fn with_transport(config: DomainConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let name = config.resolve_name();
        tracing::debug!(domain = %name, "created domain");

        let inner = Arc::new_cyclic(|weak_self| DomainInner {
            name,
            transport,
            capability_bytes: config.capability_bytes,
            table: TokenTable::default(),
            weak_self: weak_self.clone(),
        });
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Token for a local reference, minted on first use.
    ///
    /// Repeated calls for the same reference return the same token.
    pub fn local_to_remote(&self, reference: &Reference) -> Result<String> {
        self.inner.local_to_remote(reference)
    }

    /// Reference for a token, proxied on first sight.
    ///
    /// Repeated calls for the same token, in either form, return the same
    /// reference.
    pub fn remote_to_local(&self, token: &str) -> Result<Reference> {
        self.inner.remote_to_local(token)
    }

    /// Bind a full token to a local reference under a caller-supplied key.
    ///
    /// The token's public key must belong to `secret`. Either form of the
    /// token being bound already is an error.
    pub fn bind_local(&self, token: &str, secret: SecretKey, reference: &Reference) -> Result<()> {
        let parsed = Token::parse(token)?;
        if parsed.public_key()? != secret.public_key() {
            return Err(MarshalError::InvalidConfig(format!(
                "public key of {token} does not match the supplied secret"
            )));
        }
        if !self
            .inner
            .table
            .insert(&parsed, KeyMaterial::Local(secret), reference.clone())
        {
            return Err(MarshalError::InvalidConfig(format!(
                "token already bound: {}",
                parsed.alias()
            )));
        }
        tracing::debug!(domain = %self.inner.name, reference = %reference.id(), "bound local token");
        Ok(())
    }

    /// Encode a message to wire text, promoting references to tokens.
    pub fn encode(&self, message: &Value) -> Result<String> {
        self.inner.encode(message)
    }

    /// Decode wire text, resolving tokens to references.
    ///
    /// Absent input decodes to `None` without being parsed. Every token is
    /// checked before any is bound, so a rejected message binds nothing.
    pub fn decode(&self, text: Option<&str>) -> Result<Option<Value>> {
        match text {
            None => Ok(None),
            Some(text) => {
                let wire = WireValue::from_json_text(text)?;
                self.inner.decode(wire).map(Some)
            }
        }
    }

    /// Inbound entry point: open, decode and deliver one envelope.
    ///
    /// Unknown addresses are rejected before any decryption is attempted.
    /// Failures never modify the token table.
    pub fn receptionist(&self, envelope: Envelope) -> Result<()> {
        self.inner.receive(envelope)
    }

    /// A [`Transport`] that delivers into this domain's receptionist.
    pub fn receptionist_route(&self) -> Receptionist {
        Receptionist {
            domain: self.clone(),
        }
    }

    /// Number of bound token strings, short aliases included.
    pub fn binding_count(&self) -> usize {
        self.inner.table.len()
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("name", &self.inner.name)
            .field("bindings", &self.inner.table.len())
            .finish()
    }
}

impl TokenResolver for Domain {
    fn promote(&self, reference: &Reference) -> Result<String> {
        self.inner.local_to_remote(reference)
    }

    fn resolve(&self, token: &str) -> Result<Reference> {
        self.inner.remote_to_local(token)
    }
}

impl DomainInner {
    fn local_to_remote(&self, reference: &Reference) -> Result<String> {
        self.table.token_for(reference, || {
            let secret = SecretKey::generate();
            let public = secret.public_key();
            let capability = random_capability(self.capability_bytes);
            tracing::debug!(
                domain = %self.name,
                reference = %reference.id(),
                key = %public.fingerprint(),
                "minted token"
            );
            Ok((
                Token::new(&self.name, &capability, &public),
                KeyMaterial::Local(secret),
            ))
        })
    }

    fn remote_to_local(&self, token: &str) -> Result<Reference> {
        self.table.reference_for(token, |parsed| {
            if !parsed.is_full() {
                return Err(MarshalError::BadAddressFormat(token.to_string()));
            }
            let remote_key = parsed.public_key()?;
            let proxy = Reference::new(Proxy::new(
                parsed.alias(),
                remote_key,
                self.weak_self.clone(),
            ));
            tracing::debug!(
                domain = %self.name,
                remote = %parsed.domain(),
                reference = %proxy.id(),
                "created proxy"
            );
            Ok((KeyMaterial::Remote(remote_key), proxy))
        })
    }

    pub(crate) fn encode(&self, message: &Value) -> Result<String> {
        encode_value(message, self)?.to_json_text()
    }

    fn decode(&self, wire: WireValue) -> Result<Value> {
        self.check_tokens(&wire)?;
        decode_value(wire, self)
    }

    fn check_tokens(&self, wire: &WireValue) -> Result<()> {
        match wire {
            WireValue::Token(token) => self.table.check(token),
            WireValue::Array(items) => items.iter().try_for_each(|item| self.check_tokens(item)),
            WireValue::Map(map) => map.values().try_for_each(|value| self.check_tokens(value)),
            _ => Ok(()),
        }
    }

    fn receive(&self, envelope: Envelope) -> Result<()> {
        let Some(binding) = self.table.lookup(&envelope.address) else {
            tracing::warn!(domain = %self.name, address = %envelope.address, "unknown address");
            return Err(MarshalError::UnknownAddress(envelope.address));
        };

        let secret = match &binding.keys {
            KeyMaterial::Local(secret) => secret,
            KeyMaterial::Remote(remote_key) => {
                tracing::warn!(
                    domain = %self.name,
                    address = %envelope.address,
                    remote_key = %remote_key.fingerprint(),
                    "envelope addressed to a proxy binding"
                );
                return Err(envelope.decryption_failed());
            }
        };

        let wire = envelope
            .open(secret)
            .and_then(|plaintext| {
                String::from_utf8(plaintext).map_err(|_| envelope.decryption_failed())
            })
            .and_then(|text| {
                WireValue::from_json_text(&text).map_err(|_| envelope.decryption_failed())
            })
            .map_err(|e| {
                tracing::warn!(
                    domain = %self.name,
                    address = %envelope.address,
                    content_len = envelope.content.len(),
                    nonce_len = envelope.nonce.len(),
                    "rejected envelope"
                );
                e
            })?;

        let message = self.decode(wire)?;
        binding.reference.send(message)
    }
}

impl TokenResolver for DomainInner {
    fn promote(&self, reference: &Reference) -> Result<String> {
        self.local_to_remote(reference)
    }

    fn resolve(&self, token: &str) -> Result<Reference> {
        self.remote_to_local(token)
    }
}

/// Route into a domain's receptionist.
#[derive(Clone, Debug)]
pub struct Receptionist {
    domain: Domain,
}

impl Transport for Receptionist {
    fn send(&self, envelope: Envelope) -> Result<()> {
        self.domain.receptionist(envelope)
    }
}
