//! Live references to behavior.
//!
//! A [`Reference`] is the only thing a sender needs to talk to an actor.
//! Whether it wraps a local [`Behavior`] or a proxy for a remote one is
//! invisible to the caller.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::value::Value;

static NEXT_REF_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a reference.
///
/// Clones of a [`Reference`] share the id; separately created references
/// never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(u64);

impl RefId {
    fn next() -> Self {
        Self(NEXT_REF_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}

/// Something that can receive a message.
///
/// `this` is the reference being invoked, so a behavior can hand itself
/// out as a reply address.
pub trait Behavior: Send + Sync {
    fn receive(&self, this: &Reference, message: Value) -> Result<()>;
}

impl<F> Behavior for F
where
    F: Fn(&Reference, Value) -> Result<()> + Send + Sync,
{
    fn receive(&self, this: &Reference, message: Value) -> Result<()> {
        self(this, message)
    }
}

/// A cloneable handle to a behavior, compared by identity.
#[derive(Clone)]
pub struct Reference {
    id: RefId,
    behavior: Arc<dyn Behavior>,
}

impl Reference {
    /// Wrap a behavior in a fresh reference.
    pub fn new(behavior: impl Behavior + 'static) -> Self {
        Self {
            id: RefId::next(),
            behavior: Arc::new(behavior),
        }
    }

    /// Wrap a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Reference, Value) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    pub fn id(&self) -> RefId {
        self.id
    }

    /// Deliver a message to the behavior.
    pub fn send(&self, message: Value) -> Result<()> {
        self.behavior.receive(self, message)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reference {}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.id)
    }
}
