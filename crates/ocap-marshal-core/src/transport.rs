//! Outbound transport contract.
//!
//! A transport moves one [`Envelope`] towards whoever owns its address.
//! Delivery is fire-and-forget; acknowledgement, retry and backpressure
//! belong to the implementation.

use crate::envelope::Envelope;
use crate::error::{MarshalError, Result};

/// Outbound edge of a domain.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait Transport: Send + Sync {
    fn send(&self, envelope: Envelope) -> Result<()>;
}

impl<F> Transport for F
where
    F: Fn(Envelope) -> Result<()> + Send + Sync,
{
    fn send(&self, envelope: Envelope) -> Result<()> {
        self(envelope)
    }
}

/// Transport that has nowhere to send anything.
///
/// The default for domains and routers that were not given one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoute;

impl Transport for NoRoute {
    fn send(&self, envelope: Envelope) -> Result<()> {
        Err(MarshalError::NoRoute(envelope.address))
    }
}
