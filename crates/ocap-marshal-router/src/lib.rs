//! # ocap-marshal Router
//!
//! Routes envelopes by the domain-name part of their address.
//!
//! ## Overview
//!
//! A [`Router`] maps domain names to inbound routes. Domains created with
//! [`Router::domain`] send through the router, so domains sharing a router
//! talk by direct in-process dispatch while every other address falls
//! through to the default route (typically a real network transport).
//! Messages on the fast path are still tokenized and encrypted.
//!
//! ```text
//!   proxy.send ──> Router ──┬── "ocap:a" ──> domain A receptionist
//!                           ├── "ocap:b" ──> domain B receptionist
//!                           └── otherwise ─> default route
//! ```
//!
//! [`queue`] provides an asynchronous in-process transport for callers
//! that want delivery decoupled from the sending call.
//!
//! ## Usage
//!
//! ```rust
//! use ocap_marshal_core::{Reference, Value};
//! use ocap_marshal_domain::DomainConfig;
//! use ocap_marshal_router::Router;
//!
//! let router = Router::new();
//! let zero = router.domain(DomainConfig::named("ocap:zero")).unwrap();
//! let one = router.domain(DomainConfig::named("ocap:one")).unwrap();
//!
//! let actor = Reference::from_fn(|_, message| {
//!     assert_eq!(message.as_i64(), Some(42));
//!     Ok(())
//! });
//! let token = zero.local_to_remote(&actor).unwrap();
//! let proxy = one.remote_to_local(&token).unwrap();
//! proxy.send(Value::from(42)).unwrap();
//! ```

pub mod queue;
pub mod router;

pub use queue::{channel, EnvelopeQueue, QueueTransport, ServeReport};
pub use router::{Router, RouterTransport};
