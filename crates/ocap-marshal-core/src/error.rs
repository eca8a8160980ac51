//! Error types for ocap-marshal.

use thiserror::Error;

/// Errors that can occur while marshaling, routing or delivering messages.
///
/// The display strings of the first four variants are part of the
/// observable protocol and are matched by callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    /// An inbound envelope named an address this domain never bound.
    #[error("Unknown address: {0}")]
    UnknownAddress(String),

    /// A token or routed address does not follow the address grammar.
    #[error("Bad address format: {0}")]
    BadAddressFormat(String),

    /// Decryption or the parse step after it failed.
    ///
    /// Carries the JSON rendering of the offending envelope.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// No route is registered for the address.
    #[error("No route for {0}")]
    NoRoute(String),

    /// Value could not be rendered to wire text.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Sealing an outbound envelope failed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A proxy outlived the domain that minted it.
    #[error("reference detached from its domain: {0}")]
    Detached(String),

    /// Failure reported by a transport implementation.
    #[error("transport error: {0}")]
    Transport(String),
}

impl MarshalError {
    /// Whether this error was caused by untrusted inbound data.
    ///
    /// These are per-message failures: the caller should drop the message
    /// and keep serving.
    pub fn is_untrusted_input(&self) -> bool {
        matches!(
            self,
            MarshalError::UnknownAddress(_)
                | MarshalError::BadAddressFormat(_)
                | MarshalError::DecryptionFailed(_)
        )
    }
}

/// Result type for ocap-marshal operations.
pub type Result<T> = std::result::Result<T, MarshalError>;
