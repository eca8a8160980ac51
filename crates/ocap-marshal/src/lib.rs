//! # ocap-marshal
//!
//! Send messages carrying live references between actor domains, over a
//! transport that is not trusted.
//!
//! ## Overview
//!
//! - **Domain**: a trust boundary owning a token table and key material
//! - **Token**: an unguessable `domain#capability[?publicKey]` string naming a reference
//! - **Proxy**: a local stand-in for a remote reference
//! - **Receptionist**: a domain's single inbound entry point
//! - **Router**: dispatch by domain name, with a default route for the rest
//!
//! A message may contain references. On the way out each one is promoted
//! to a token; on the way in each token becomes a proxy, or the original
//! reference if it came home. Every envelope is sealed under a fresh
//! X25519 ephemeral key and ChaCha20-Poly1305.
//!
//! ## Usage
//!
//! ```rust
//! use ocap_marshal::{DomainConfig, Reference, Router, Value};
//!
//! let router = Router::new();
//! let zero = router.domain(DomainConfig::named("ocap:zero")).unwrap();
//! let one = router.domain(DomainConfig::named("ocap:one")).unwrap();
//!
//! let pong = Reference::from_fn(|this, message| {
//!     let ping = message.get("ping").and_then(Value::as_reference).cloned();
//!     match ping {
//!         Some(ping) => ping.send(Value::object([("pong", Value::from(this.clone()))])),
//!         None => Ok(()),
//!     }
//! });
//! let ping = Reference::from_fn(|_, message| {
//!     assert!(message.get("pong").and_then(Value::as_reference).is_some());
//!     Ok(())
//! });
//!
//! let pong_proxy = zero.remote_to_local(&one.local_to_remote(&pong).unwrap()).unwrap();
//! pong_proxy.send(Value::object([("ping", Value::from(ping))])).unwrap();
//! ```
//!
//! ## Re-exports
//!
//! - `ocap_marshal::core` - Values, tokens, envelopes, crypto
//! - `ocap_marshal::domain` - Domains and the codec
//! - `ocap_marshal::router` - Routing and the queued transport

pub use ocap_marshal_core as core;
pub use ocap_marshal_domain as domain;
pub use ocap_marshal_router as router;

pub use ocap_marshal_core::{
    Behavior, Envelope, ErrorValue, MarshalError, NoRoute, RefId, Reference, Result, Token,
    Transport, Value, WireValue,
};
pub use ocap_marshal_domain::{Domain, DomainConfig, Receptionist, TokenResolver};
pub use ocap_marshal_router::{EnvelopeQueue, QueueTransport, Router, RouterTransport, ServeReport};
