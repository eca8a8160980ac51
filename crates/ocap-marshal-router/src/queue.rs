//! Queued in-process transport.
//!
//! [`QueueTransport`] accepts envelopes without delivering them; the
//! paired [`EnvelopeQueue`] hands them to a route later, one at a time.
//! This turns the synchronous call chain of in-process dispatch into
//! asynchronous actor-style delivery, so a long conversation between
//! domains does not grow the stack.

use std::sync::Arc;

use tokio::sync::mpsc;

use ocap_marshal_core::{Envelope, MarshalError, Result, Transport};

/// Create a connected transport/queue pair.
pub fn channel() -> (QueueTransport, EnvelopeQueue) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (QueueTransport { sender }, EnvelopeQueue { receiver })
}

/// Fire-and-forget sending half.
#[derive(Clone, Debug)]
pub struct QueueTransport {
    sender: mpsc::UnboundedSender<Envelope>,
}

impl Transport for QueueTransport {
    fn send(&self, envelope: Envelope) -> Result<()> {
        self.sender.send(envelope).map_err(|e| {
            MarshalError::Transport(format!("queue closed, dropped envelope for {}", e.0.address))
        })
    }
}

/// Outcome of a delivery run.
#[derive(Debug, Default)]
pub struct ServeReport {
    /// Envelopes accepted by the route.
    pub delivered: usize,
    /// Envelopes the route rejected, in delivery order.
    pub failures: Vec<MarshalError>,
}

impl ServeReport {
    fn record(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.delivered += 1,
            Err(e) => {
                tracing::warn!(error = %e, "delivery failed");
                self.failures.push(e);
            }
        }
    }
}

/// Receiving half.
#[derive(Debug)]
pub struct EnvelopeQueue {
    receiver: mpsc::UnboundedReceiver<Envelope>,
}

impl EnvelopeQueue {
    /// Wait for one envelope and deliver it.
    ///
    /// `None` once every sender is gone.
    pub async fn deliver_next(&mut self, route: &dyn Transport) -> Option<Result<()>> {
        let envelope = self.receiver.recv().await?;
        Some(route.send(envelope))
    }

    /// Deliver whatever is queued, including envelopes queued by the
    /// deliveries themselves, until the queue is empty.
    pub fn drain(&mut self, route: &dyn Transport) -> ServeReport {
        let mut report = ServeReport::default();
        while let Ok(envelope) = self.receiver.try_recv() {
            report.record(route.send(envelope));
        }
        report
    }

    /// Deliver until every sender has been dropped.
    pub async fn serve(mut self, route: Arc<dyn Transport>) -> ServeReport {
        let mut report = ServeReport::default();
        while let Some(result) = self.deliver_next(route.as_ref()).await {
            report.record(result);
        }
        tracing::debug!(
            delivered = report.delivered,
            failed = report.failures.len(),
            "queue closed"
        );
        report
    }
}
