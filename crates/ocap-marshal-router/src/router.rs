//! Table-based routing transport.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use ocap_marshal_core::{domain_of, Envelope, MarshalError, NoRoute, Result, Transport};
use ocap_marshal_domain::{Domain, DomainConfig};

/// Maps domain names to inbound routes.
///
/// Cheap to clone; clones share the routing table.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    default_route: Arc<dyn Transport>,
    routes: RwLock<HashMap<String, Arc<dyn Transport>>>,
}

impl RouterInner {
    fn route(&self, envelope: Envelope) -> Result<()> {
        let domain = domain_of(&envelope.address)?;
        let route = self.routes.read().get(domain).cloned();

        match route {
            Some(route) => {
                tracing::trace!(domain = %domain, "routing envelope locally");
                route.send(envelope)
            }
            None => {
                tracing::trace!(domain = %domain, "routing envelope to default route");
                self.default_route.send(envelope)
            }
        }
    }
}

impl Router {
    /// Router whose default route fails with [`MarshalError::NoRoute`].
    pub fn new() -> Self {
        Self::with_default_route(Arc::new(NoRoute))
    }

    /// Router that forwards unknown domains to `default_route`.
    pub fn with_default_route(default_route: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                default_route,
                routes: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Route one envelope.
    ///
    /// The address must split into exactly two parts on `#`.
    pub fn route(&self, envelope: Envelope) -> Result<()> {
        self.inner.route(envelope)
    }

    /// Transport handle for domains that send through this router.
    ///
    /// Holds the router weakly, so domains registered on the router do not
    /// keep it alive.
    pub fn transport(&self) -> RouterTransport {
        RouterTransport {
            router: Arc::downgrade(&self.inner),
        }
    }

    /// Create a domain that sends through this router and register its
    /// receptionist under its name.
    pub fn domain(&self, config: DomainConfig) -> Result<Domain> {
        let domain = Domain::with_transport(config, Arc::new(self.transport()))?;
        self.register(domain.name(), Arc::new(domain.receptionist_route()))?;
        Ok(domain)
    }

    /// Register an inbound route for a domain name.
    ///
    /// Routes are append-only; registering a taken name fails.
    pub fn register(&self, name: impl Into<String>, route: Arc<dyn Transport>) -> Result<()> {
        let name = name.into();
        if name.contains('#') {
            return Err(MarshalError::BadAddressFormat(name));
        }

        let mut routes = self.inner.routes.write();
        if routes.contains_key(&name) {
            return Err(MarshalError::InvalidConfig(format!(
                "route already registered: {name}"
            )));
        }
        tracing::debug!(domain = %name, "registered route");
        routes.insert(name, route);
        Ok(())
    }

    /// Registered domain names, sorted.
    pub fn routes(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.routes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for Router {
    fn send(&self, envelope: Envelope) -> Result<()> {
        self.route(envelope)
    }
}

/// Weak transport handle into a [`Router`].
#[derive(Clone)]
pub struct RouterTransport {
    router: Weak<RouterInner>,
}

impl Transport for RouterTransport {
    fn send(&self, envelope: Envelope) -> Result<()> {
        match self.router.upgrade() {
            Some(router) => router.route(envelope),
            None => Err(MarshalError::NoRoute(envelope.address)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use ocap_marshal_core::{Reference, Value};

    fn collector() -> (Arc<dyn Transport>, Arc<Mutex<Vec<Envelope>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let transport = move |envelope: Envelope| -> Result<()> {
            sink.lock().push(envelope);
            Ok(())
        };
        (Arc::new(transport), seen)
    }

    #[test]
    fn test_routes_by_domain_name() {
        let router = Router::new();
        let (route, seen) = collector();
        router.register("ocap:zero", route).unwrap();

        router
            .route(Envelope::new("ocap:zero#abc", "content", "nonce"))
            .unwrap();

        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0].address, "ocap:zero#abc");
    }

    #[test]
    fn test_unknown_domain_uses_default_route() {
        let (default_route, seen) = collector();
        let router = Router::with_default_route(default_route);

        router.route(Envelope::new("udp://far/#abc", "", "")).unwrap();
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_no_default_route() {
        let router = Router::new();
        let err = router.route(Envelope::new("udp://far/#abc", "", "")).unwrap_err();
        assert_eq!(err.to_string(), "No route for udp://far/#abc");
    }

    #[test]
    fn test_bad_address_format() {
        let router = Router::new();
        for address in ["no-separator", "a#b#c"] {
            let err = router.route(Envelope::new(address, "", "")).unwrap_err();
            assert_eq!(err.to_string(), format!("Bad address format: {address}"));
        }
    }

    #[test]
    fn test_register_is_append_only() {
        let router = Router::new();
        let (route, _) = collector();
        router.register("ocap:zero", Arc::clone(&route)).unwrap();

        assert!(matches!(
            router.register("ocap:zero", route),
            Err(MarshalError::InvalidConfig(_))
        ));
        assert_eq!(router.routes(), vec!["ocap:zero".to_string()]);
    }

    #[test]
    fn test_domains_on_one_router_talk_directly() {
        let (default_route, external) = collector();
        let router = Router::with_default_route(default_route);
        let zero = router.domain(DomainConfig::named("ocap:zero")).unwrap();
        let one = router.domain(DomainConfig::named("ocap:one")).unwrap();

        let inbox = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&inbox);
        let actor = Reference::from_fn(move |_, message| {
            sink.lock().push(message);
            Ok(())
        });

        let proxy = one
            .remote_to_local(&zero.local_to_remote(&actor).unwrap())
            .unwrap();
        proxy.send(Value::from("hello")).unwrap();

        assert_eq!(inbox.lock().as_slice(), &[Value::from("hello")]);
        assert!(external.lock().is_empty());
        assert_eq!(router.routes(), vec!["ocap:one".to_string(), "ocap:zero".to_string()]);
    }

    #[test]
    fn test_router_domain_rejects_taken_name() {
        let router = Router::new();
        router.domain(DomainConfig::named("ocap:zero")).unwrap();
        assert!(router.domain(DomainConfig::named("ocap:zero")).is_err());
    }

    #[test]
    fn test_transport_outliving_router() {
        let transport = Router::new().transport();
        let err = transport.send(Envelope::new("ocap:zero#abc", "", "")).unwrap_err();
        assert_eq!(err, MarshalError::NoRoute("ocap:zero#abc".into()));
    }
}
