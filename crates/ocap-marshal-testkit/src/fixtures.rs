//! Test fixtures and helpers.

use std::sync::{Arc, Once};

use parking_lot::Mutex;

use ocap_marshal_core::{Envelope, Reference, Result, Transport, Value};
use ocap_marshal_domain::{Domain, DomainConfig};
use ocap_marshal_router::Router;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A behavior that keeps every message it receives.
#[derive(Clone)]
pub struct Recorder {
    reference: Reference,
    log: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn new() -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let reference = Reference::from_fn(move |_, message| {
            sink.lock().push(message);
            Ok(())
        });
        Self { reference, log }
    }

    /// The reference to hand out.
    pub fn reference(&self) -> Reference {
        self.reference.clone()
    }

    /// Messages received so far.
    pub fn messages(&self) -> Vec<Value> {
        self.log.lock().clone()
    }

    /// Most recent message, if any.
    pub fn last(&self) -> Option<Value> {
        self.log.lock().last().cloned()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// A transport that keeps every envelope instead of delivering it.
#[derive(Clone, Default)]
pub struct CapturingTransport {
    sent: Arc<Mutex<Vec<Envelope>>>,
}

impl CapturingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelopes sent so far.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().clone()
    }

    /// Remove and return the oldest envelope.
    pub fn take(&self) -> Option<Envelope> {
        let mut sent = self.sent.lock();
        (!sent.is_empty()).then(|| sent.remove(0))
    }
}

impl Transport for CapturingTransport {
    fn send(&self, envelope: Envelope) -> Result<()> {
        self.sent.lock().push(envelope);
        Ok(())
    }
}

/// Two domains registered on one router, with external traffic captured.
pub struct RoutedPair {
    pub router: Router,
    pub local: Domain,
    pub remote: Domain,
    pub external: CapturingTransport,
}

impl RoutedPair {
    /// Pair named `ocap:local` and `ocap:remote`.
    pub fn new() -> Self {
        Self::named("ocap:local", "ocap:remote")
    }

    pub fn named(local: &str, remote: &str) -> Self {
        let external = CapturingTransport::new();
        let router = Router::with_default_route(Arc::new(external.clone()));
        let local = router
            .domain(DomainConfig::named(local))
            .expect("valid local domain");
        let remote = router
            .domain(DomainConfig::named(remote))
            .expect("valid remote domain");
        Self {
            router,
            local,
            remote,
            external,
        }
    }

    /// Export a reference living in `local` and return `remote`'s proxy for it.
    pub fn export(&self, reference: &Reference) -> Reference {
        let token = self
            .local
            .local_to_remote(reference)
            .expect("token minting");
        self.remote
            .remote_to_local(&token)
            .expect("proxy creation")
    }
}

impl Default for RoutedPair {
    fn default() -> Self {
        Self::new()
    }
}
