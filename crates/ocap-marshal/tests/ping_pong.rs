//! End-to-end conversations between domains.

use std::sync::Arc;

use ocap_marshal::{
    core::MAX_NESTING_DEPTH, router::channel, Domain, DomainConfig, Envelope, MarshalError,
    Reference, Result, Router, Transport, Value,
};
use ocap_marshal_testkit::{init_tracing, CapturingTransport, Recorder};

/// Replies to a ping with `{ping, pong: self, value: 1}`.
fn pong_behavior() -> Reference {
    Reference::from_fn(|this, message| {
        let ping = message
            .get("ping")
            .and_then(Value::as_reference)
            .cloned()
            .expect("ping reference");
        ping.send(Value::object([
            ("ping", Value::from(ping.clone())),
            ("pong", Value::from(this.clone())),
            ("value", Value::from(1)),
        ]))
    })
}

/// Starts the exchange when given a pong, records the answer.
fn ping_behavior(answers: Recorder) -> Reference {
    Reference::from_fn(move |this, message| -> Result<()> {
        match message.get("value") {
            None => {
                let pong = message
                    .get("pong")
                    .and_then(Value::as_reference)
                    .cloned()
                    .expect("pong reference");
                pong.send(Value::object([
                    ("ping", Value::from(this.clone())),
                    ("pong", Value::from(pong.clone())),
                    ("value", Value::from(0)),
                ]))
            }
            Some(_) => answers.reference().send(message),
        }
    })
}

fn assert_answer(answers: &Recorder, ping: &Reference) {
    let messages = answers.messages();
    assert_eq!(messages.len(), 1);
    let answer = &messages[0];
    assert_eq!(answer.get("value").and_then(Value::as_i64), Some(1));
    assert_eq!(answer.get("ping").and_then(Value::as_reference), Some(ping));
}

#[test]
fn test_ping_pong_through_router() {
    init_tracing();
    let router = Router::new();
    let zero = router.domain(DomainConfig::named("ocap:zero")).unwrap();
    let one = router.domain(DomainConfig::named("ocap:one")).unwrap();

    let answers = Recorder::new();
    let ping = ping_behavior(answers.clone());
    let pong = pong_behavior();

    let pong_proxy = zero
        .remote_to_local(&one.local_to_remote(&pong).unwrap())
        .unwrap();
    ping.send(Value::object([("pong", Value::from(pong_proxy.clone()))]))
        .unwrap();

    assert_answer(&answers, &ping);
    // The pong reference came back as the proxy zero already had
    assert_eq!(
        zero.remote_to_local(&one.local_to_remote(&pong).unwrap()).unwrap(),
        pong_proxy
    );
}

#[test]
fn test_ping_pong_through_queue() {
    let (transport, mut queue) = channel();
    let router = Router::new();
    let zero =
        Domain::with_transport(DomainConfig::named("ocap:zero"), Arc::new(transport.clone()))
            .unwrap();
    let one = Domain::with_transport(DomainConfig::named("ocap:one"), Arc::new(transport)).unwrap();
    router
        .register(zero.name(), Arc::new(zero.receptionist_route()))
        .unwrap();
    router
        .register(one.name(), Arc::new(one.receptionist_route()))
        .unwrap();

    let answers = Recorder::new();
    let ping = ping_behavior(answers.clone());
    let pong_proxy = zero
        .remote_to_local(&one.local_to_remote(&pong_behavior()).unwrap())
        .unwrap();

    ping.send(Value::object([("pong", Value::from(pong_proxy))]))
        .unwrap();
    // Nothing is delivered until the queue runs
    assert!(answers.messages().is_empty());

    let report = queue.drain(&router);
    assert_eq!(report.delivered, 2);
    assert!(report.failures.is_empty());
    assert_answer(&answers, &ping);
}

#[tokio::test]
async fn test_ping_pong_with_async_delivery() {
    let (transport, mut queue) = channel();
    let router = Router::with_default_route(Arc::new(transport));
    let zero = router.domain(DomainConfig::named("ocap:zero")).unwrap();

    // `one` is only reachable through the queue
    let one_router = Router::new();
    let one = one_router.domain(DomainConfig::named("ocap:one")).unwrap();

    let answers = Recorder::new();
    let ping = ping_behavior(answers.clone());
    let pong_proxy = zero
        .remote_to_local(&one.local_to_remote(&pong_behavior()).unwrap())
        .unwrap();

    // one answers zero through its own router, which has no route back;
    // register zero there so the reply is dispatched directly.
    one_router
        .register(zero.name(), Arc::new(zero.receptionist_route()))
        .unwrap();

    ping.send(Value::object([("pong", Value::from(pong_proxy))]))
        .unwrap();

    let delivered = queue.deliver_next(&one_router).await.unwrap();
    assert!(delivered.is_ok());
    assert_answer(&answers, &ping);
}

/// Move envelopes between two routers the way a network would: as bytes.
fn pump(from: &CapturingTransport, to: &Router) -> usize {
    let mut moved = 0;
    while let Some(envelope) = from.take() {
        let bytes = envelope.to_bytes().unwrap();
        to.send(Envelope::from_bytes(&bytes).unwrap()).unwrap();
        moved += 1;
    }
    moved
}

#[test]
fn test_ping_pong_across_processes() {
    let net_a = CapturingTransport::new();
    let net_b = CapturingTransport::new();
    let router_a = Router::with_default_route(Arc::new(net_a.clone()));
    let router_b = Router::with_default_route(Arc::new(net_b.clone()));
    let zero = router_a
        .domain(DomainConfig::named("udp://localhost:10000/"))
        .unwrap();
    let one = router_b
        .domain(DomainConfig::named("udp://localhost:10001/"))
        .unwrap();

    let answers = Recorder::new();
    let ping = ping_behavior(answers.clone());
    let pong = pong_behavior();

    // Bootstrap: the token crosses out of band, as a string.
    let pong_token = one.local_to_remote(&pong).unwrap();
    let pong_proxy = zero.remote_to_local(&pong_token).unwrap();
    ping.send(Value::object([("pong", Value::from(pong_proxy))]))
        .unwrap();

    let mut rounds = 0;
    while pump(&net_a, &router_b) + pump(&net_b, &router_a) > 0 {
        rounds += 1;
        assert!(rounds < 10, "conversation did not settle");
    }

    assert_answer(&answers, &ping);
    assert!(net_a.sent().is_empty() && net_b.sent().is_empty());
}

#[test]
fn test_references_are_forwarded_to_third_domain() {
    let router = Router::new();
    let origin = router.domain(DomainConfig::named("ocap:origin")).unwrap();
    let middle = router.domain(DomainConfig::named("ocap:middle")).unwrap();
    let far = router.domain(DomainConfig::named("ocap:far")).unwrap();

    let target = Recorder::new();
    let forwarder_inbox = Recorder::new();

    // middle receives a reference and forwards it to far
    let far_token = far.local_to_remote(&forwarder_inbox.reference()).unwrap();
    let far_from_middle = middle.remote_to_local(&far_token).unwrap();
    let relay = Reference::from_fn(move |_, message| far_from_middle.send(message));

    let relay_from_origin = origin
        .remote_to_local(&middle.local_to_remote(&relay).unwrap())
        .unwrap();
    relay_from_origin
        .send(Value::from(target.reference()))
        .unwrap();

    // far got a proxy for origin's target, and it reaches origin directly
    let received = forwarder_inbox.last().unwrap();
    let proxy = received.as_reference().unwrap().clone();
    assert_eq!(
        far.local_to_remote(&proxy).unwrap(),
        origin.local_to_remote(&target.reference()).unwrap()
    );
    proxy.send(Value::from("direct")).unwrap();
    assert_eq!(target.messages(), vec![Value::from("direct")]);
}

fn nested(depth: usize) -> Value {
    (0..depth).fold(Value::from(1), |inner, _| Value::Array(vec![inner]))
}

#[test]
fn test_deep_message_fails_at_sender() {
    let pair = ocap_marshal_testkit::RoutedPair::new();
    let inbox = Recorder::new();
    let proxy = pair.export(&inbox.reference());

    proxy.send(nested(MAX_NESTING_DEPTH)).unwrap();
    assert_eq!(inbox.messages(), vec![nested(MAX_NESTING_DEPTH)]);

    assert!(matches!(
        proxy.send(nested(MAX_NESTING_DEPTH + 1)),
        Err(MarshalError::Encoding(_))
    ));
    assert_eq!(inbox.messages().len(), 1);
    assert!(pair.external.sent().is_empty());
}
