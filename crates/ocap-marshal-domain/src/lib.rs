//! # ocap-marshal Domain
//!
//! A domain is one trust boundary. It owns a token table, turns outbound
//! references into tokens and inbound tokens into proxies, and seals every
//! outbound message for the capability it is addressed to.
//!
//! ## Lifecycle of a Reference
//!
//! ```text
//! Domain A                                  Domain B
//!   local_to_remote(ping) -> "A#cap?pkA"  ---->  remote_to_local("A#cap?pkA")
//!                                                 -> proxy (bound as "A#cap")
//!   receptionist(envelope "A#cap")        <----  proxy.send(message)
//!     -> ping.send(decoded message)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ocap_marshal_core::{Reference, Value};
//! use ocap_marshal_domain::{Domain, DomainConfig};
//!
//! let domain = Domain::new(DomainConfig::named("ocap:zero")).unwrap();
//! let actor = Reference::from_fn(|_, _| Ok(()));
//!
//! let token = domain.local_to_remote(&actor).unwrap();
//! assert_eq!(domain.local_to_remote(&actor).unwrap(), token);
//! assert!(token.starts_with("ocap:zero#"));
//!
//! let text = domain.encode(&Value::object([("pong", Value::from(actor))])).unwrap();
//! assert!(text.contains(&token));
//! ```

pub mod codec;
pub mod config;
pub mod domain;
mod proxy;
mod table;

pub use codec::{decode_value, encode_value, TokenResolver};
pub use config::{DomainConfig, DEFAULT_CAPABILITY_BYTES, MIN_CAPABILITY_BYTES};
pub use domain::{Domain, Receptionist};
