use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commands::{command_catalog, CommandSpec};
use crate::embeds::{self, ModalRequest, Response};
use crate::events::{EventContext, EventEnvelope, InteractionRouter};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport send failed: {0}")]
    Send(String),
    #[error("command registration failed: {0}")]
    Register(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

/// The platform connection. Everything wire-level (websocket handshake,
/// auth, payload encoding) lives behind this seam; the bot only sees
/// envelopes in and responses out.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_event(&self) -> Result<Option<EventEnvelope>, TransportError>;
    async fn respond(&self, event_id: &str, response: Response) -> Result<(), TransportError>;
    async fn open_modal(&self, event_id: &str, modal: ModalRequest)
        -> Result<(), TransportError>;
    async fn register_commands(&self, commands: &[CommandSpec]) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopGatewayTransport;

#[async_trait]
impl GatewayTransport for NoopGatewayTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_event(&self) -> Result<Option<EventEnvelope>, TransportError> {
        Ok(None)
    }

    async fn respond(&self, _event_id: &str, _response: Response) -> Result<(), TransportError> {
        Ok(())
    }

    async fn open_modal(
        &self,
        _event_id: &str,
        _modal: ModalRequest,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn register_commands(&self, _commands: &[CommandSpec]) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Per-event delivery handle. Tracks whether anything has gone out for the
/// event so the failure path can guarantee at most one response overall.
pub struct EventResponder {
    transport: Arc<dyn GatewayTransport>,
    event_id: String,
    responded: AtomicBool,
}

impl EventResponder {
    pub fn new(transport: Arc<dyn GatewayTransport>, event_id: impl Into<String>) -> Self {
        Self { transport, event_id: event_id.into(), responded: AtomicBool::new(false) }
    }

    pub async fn reply(&self, response: Response) -> Result<(), TransportError> {
        self.transport.respond(&self.event_id, response).await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Opening the form counts as the event's one response; the actual
    /// reply is deferred to the later modal-submission event.
    pub async fn show_modal(&self, modal: ModalRequest) -> Result<(), TransportError> {
        self.transport.open_modal(&self.event_id, modal).await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }
}

/// Connection lifecycle: connect, register the native command set, then
/// pump events through the router until the stream closes.
///
/// Handler failures are recovered here: they are logged, answered with one
/// generic ephemeral notice when nothing was delivered yet, and never stop
/// the loop. Command registration failure is logged and non-fatal; the
/// previously registered set stays in effect.
pub struct GatewayRunner {
    transport: Arc<dyn GatewayTransport>,
    router: InteractionRouter,
}

impl GatewayRunner {
    pub fn new(transport: Arc<dyn GatewayTransport>, router: InteractionRouter) -> Self {
        Self { transport, router }
    }

    pub async fn start(&self) -> Result<()> {
        self.transport.connect().await?;
        info!(event_name = "gateway.connected", "gateway transport connected");

        let catalog = command_catalog();
        match self.transport.register_commands(&catalog).await {
            Ok(()) => info!(
                event_name = "gateway.commands_registered",
                count = catalog.len(),
                "registered native commands"
            ),
            Err(error) => warn!(
                event_name = "gateway.command_registration_failed",
                error = %error,
                "native command registration failed; continuing with the previously registered set"
            ),
        }

        loop {
            let Some(envelope) = self.transport.next_event().await? else {
                info!(event_name = "gateway.stream_closed", "gateway event stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            debug!(
                event_name = "gateway.event_received",
                event_id = %envelope.event_id,
                kind = ?envelope.event.kind(),
                "received gateway event"
            );

            let ctx = EventContext { correlation_id: envelope.event_id.clone() };
            let responder = EventResponder::new(self.transport.clone(), envelope.event_id.clone());

            match self.router.dispatch(&envelope, &responder, &ctx).await {
                Ok(outcome) => debug!(
                    event_name = "gateway.event_handled",
                    event_id = %envelope.event_id,
                    outcome = ?outcome,
                    "event handled"
                ),
                Err(error) => {
                    warn!(
                        event_name = "gateway.event_failed",
                        event_id = %envelope.event_id,
                        error = %error,
                        "event handling failed; continuing"
                    );
                    notify_failure(&responder).await;
                }
            }
        }
    }
}

/// Send the generic failure notice, unless the event already got its one
/// response before the handler failed.
async fn notify_failure(responder: &EventResponder) {
    if responder.has_responded() {
        return;
    }
    if let Err(error) = responder.reply(embeds::generic_failure()).await {
        debug!(error = %error, "failure notice could not be delivered");
    }
}
