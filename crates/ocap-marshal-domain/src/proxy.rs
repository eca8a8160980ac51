//! Proxies for remote references.

use std::sync::Weak;

use ocap_marshal_core::{Behavior, Envelope, MarshalError, PublicKey, Reference, Result, Value};

use crate::domain::DomainInner;

/// Stand-in for a remote capability.
///
/// Every send generates a fresh ephemeral key pair, seals the encoded
/// message for the remote public key and hands the envelope to the
/// owning domain's transport.
pub(crate) struct Proxy {
    address: String,
    remote_key: PublicKey,
    domain: Weak<DomainInner>,
}

impl Proxy {
    pub fn new(address: String, remote_key: PublicKey, domain: Weak<DomainInner>) -> Self {
        Self {
            address,
            remote_key,
            domain,
        }
    }
}

impl Behavior for Proxy {
    fn receive(&self, _this: &Reference, message: Value) -> Result<()> {
        let domain = self
            .domain
            .upgrade()
            .ok_or_else(|| MarshalError::Detached(self.address.clone()))?;

        let text = domain.encode(&message)?;
        let envelope = Envelope::seal(&self.address, &self.remote_key, text.as_bytes())?;

        tracing::trace!(
            domain = %domain.name,
            address = %self.address,
            plaintext_len = text.len(),
            "sending envelope"
        );
        domain.transport.send(envelope)
    }
}
