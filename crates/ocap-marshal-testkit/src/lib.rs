//! # ocap-marshal Testkit
//!
//! Testing utilities for ocap-marshal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: recording behaviors and transports, router-backed domain pairs
//! - **Generators**: Proptest strategies for message values and strings
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ocap_marshal_core::Value;
//! use ocap_marshal_testkit::fixtures::{Recorder, RoutedPair};
//!
//! let pair = RoutedPair::new();
//! let recorder = Recorder::new();
//! let proxy = pair.export(&recorder.reference());
//!
//! proxy.send(Value::from("hi")).unwrap();
//! assert_eq!(recorder.messages(), vec![Value::from("hi")]);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ocap_marshal_testkit::generators::plain_value;
//!
//! proptest! {
//!     #[test]
//!     fn encode_is_total(value in plain_value()) {
//!         let domain = Domain::new(DomainConfig::default()).unwrap();
//!         prop_assert!(domain.encode(&value).is_ok());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{init_tracing, CapturingTransport, Recorder, RoutedPair};
pub use generators::{plain_value, token_like_string};
