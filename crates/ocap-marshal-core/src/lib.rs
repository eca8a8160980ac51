//! # ocap-marshal Core
//!
//! Pure primitives for sending capability-bearing messages between
//! domains: wire values, capability tokens, envelopes and their crypto.
//!
//! This crate contains no routing and no token table. It defines the
//! vocabulary that the domain and router crates speak.
//!
//! ## Key Types
//!
//! - [`Value`] - An application message, possibly holding live [`Reference`]s
//! - [`WireValue`] - The encoded form, where references have become tokens
//! - [`Token`] - Parsed `domain#capability[?publicKey]` address
//! - [`Envelope`] - The encrypted unit handed to a [`Transport`]
//!
//! ## Wire Text
//!
//! Literal strings are written with a leading `:` so they can never be
//! confused with a capability token. See [`value::LITERAL_SENTINEL`].

pub mod address;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod reference;
pub mod transport;
pub mod value;

pub use address::{domain_of, short_alias, Token};
pub use crypto::{
    random_capability, EncryptionKey, EncryptionNonce, EphemeralKeyPair, PublicKey, SecretKey,
    SharedKey, KEY_LENGTH, NONCE_LENGTH,
};
pub use envelope::Envelope;
pub use error::{MarshalError, Result};
pub use reference::{Behavior, RefId, Reference};
pub use transport::{NoRoute, Transport};
pub use value::{ErrorValue, Value, WireValue, LITERAL_SENTINEL, MAX_NESTING_DEPTH};
