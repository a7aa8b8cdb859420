//! Ledger service loop.
//!
//! The service owns the [`Ledger`] outright. Requests arrive through the
//! ledger's mailbox and are handled one at a time in arrival order; each
//! handler runs to completion, reply included, before the next message is
//! taken. That serialization is what keeps token keys unique and makes
//! redemption at-most-once without any locking.

use std::sync::Arc;

use tokio::sync::mpsc;

use handoff_bus::{Directory, Endpoint, MessageBus, ServiceDescription};
use handoff_core::{Message, ParticipantId, Performative, RequestContent};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Ledger, RedeemOutcome};

/// The ledger participant.
pub struct LedgerService {
    endpoint: Endpoint,
    directory: Arc<dyn Directory>,
    config: LedgerConfig,
    ledger: Ledger,
    registered: bool,
    shutdown_rx: mpsc::Receiver<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl LedgerService {
    /// Create a ledger service on an existing endpoint.
    pub fn new(endpoint: Endpoint, directory: Arc<dyn Directory>, config: LedgerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let ledger = Ledger::new(config.redeem_policy);

        Self {
            endpoint,
            directory,
            config,
            ledger,
            registered: false,
            shutdown_rx,
            shutdown_tx,
        }
    }

    /// Attach a new ledger participant named `id` to the bus.
    pub fn attach(
        bus: &MessageBus,
        directory: Arc<dyn Directory>,
        id: ParticipantId,
        config: LedgerConfig,
    ) -> LedgerResult<Self> {
        let endpoint = bus.endpoint(id.clone()).map_err(|source| LedgerError::Attach {
            participant: id,
            source,
        })?;
        Ok(Self::new(endpoint, directory, config))
    }

    /// The ledger's participant identity.
    pub fn id(&self) -> &ParticipantId {
        self.endpoint.id()
    }

    /// The ledger state.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Get the shutdown sender for stopping the service loop.
    pub fn shutdown_handle(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Advertise the ledger role in the directory.
    ///
    /// [`run`](Self::run) does this itself when it has not happened yet;
    /// calling it first guarantees the ledger is discoverable before the
    /// service task is scheduled.
    pub fn register(&mut self) -> LedgerResult<()> {
        if self.registered {
            return Ok(());
        }
        let id = self.endpoint.id().clone();
        let service = ServiceDescription::new(
            self.config.role.clone(),
            self.config.service_name_for(id.as_str()),
        );

        self.directory
            .register(id.clone(), service)
            .map_err(|source| LedgerError::Registration {
                participant: id,
                role: self.config.role.clone(),
                source,
            })?;

        self.registered = true;
        tracing::info!(
            participant = %self.id(),
            role = %self.config.role,
            "Ledger registered in directory"
        );
        Ok(())
    }

    /// Run the service until shutdown or until its mailbox closes.
    ///
    /// Returns the ledger so the final store can be inspected.
    pub async fn run(mut self) -> Ledger {
        if let Err(e) = self.register() {
            tracing::warn!(error = ?e, "Ledger registration failed");
        }

        tracing::info!(
            participant = %self.id(),
            policy = %self.ledger.policy(),
            "{} is ready",
            self.id()
        );

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    tracing::info!(participant = %self.id(), "Ledger shutting down");
                    break;
                }

                msg = self.endpoint.recv() => {
                    match msg {
                        Some(msg) => self.handle_message(msg),
                        None => {
                            tracing::debug!(participant = %self.id(), "Ledger mailbox closed");
                            break;
                        }
                    }
                }
            }
        }

        match self.directory.deregister(self.endpoint.id()) {
            Ok(removed) => tracing::info!(participant = %self.id(), removed, "Ledger deregistered"),
            Err(e) => tracing::warn!(error = %e, "Ledger deregistration failed"),
        }

        tracing::info!(
            issued = self.ledger.issued_count(),
            confirmed = self.ledger.confirmed_count(),
            refused = self.ledger.refused_count(),
            live = self.ledger.live_tokens(),
            "Ledger stopped"
        );

        self.ledger
    }

    /// Handle one incoming message. Runs to completion, reply included.
    pub fn handle_message(&mut self, msg: Message) {
        tracing::debug!(participant = %self.id(), message = %msg, "Ledger received");

        match msg.performative() {
            Performative::Request => match RequestContent::classify(msg.content()) {
                RequestContent::Issue => {
                    let token = self.ledger.issue_token(msg.sender());
                    tracing::info!(token = %token, requester = %msg.sender(), "Issued token");
                    self.reply(&msg, Performative::Inform, token.as_str());
                }
                RequestContent::Redeem(token) => {
                    let outcome = self.ledger.redeem_token(&token, msg.sender());
                    match &outcome {
                        RedeemOutcome::Confirmed(token) => {
                            tracing::info!(
                                token = %token,
                                requester = %msg.sender(),
                                "Confirmed redemption"
                            )
                        }
                        RedeemOutcome::Refused { reason } => {
                            tracing::info!(
                                token = %token,
                                requester = %msg.sender(),
                                reason = %reason,
                                "Refused redemption"
                            )
                        }
                    }
                    self.reply(&msg, outcome.performative(), outcome.content());
                }
            },
            other => {
                tracing::warn!(
                    participant = %self.id(),
                    performative = %other,
                    sender = %msg.sender(),
                    "No valid performative, ignoring"
                );
            }
        }
    }

    fn reply(&self, to: &Message, performative: Performative, content: &str) {
        let reply = self.endpoint.reply(to, performative).content(content);
        if let Err(e) = self.endpoint.send(reply) {
            tracing::warn!(to = %to.sender(), error = %e, "Failed to send ledger reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use handoff_bus::{find_participant, BusConfig, InMemoryDirectory};
    use handoff_core::ISSUE_SENTINEL;

    use crate::config::REASON_NOT_AVAILABLE;

    fn setup() -> (MessageBus, Arc<InMemoryDirectory>, LedgerService) {
        let bus = MessageBus::new(BusConfig::default());
        let directory = Arc::new(InMemoryDirectory::new());
        let service = LedgerService::attach(
            &bus,
            directory.clone(),
            ParticipantId::new("ledger"),
            LedgerConfig::default(),
        )
        .unwrap();
        (bus, directory, service)
    }

    fn request(from: &Endpoint, content: &str) -> handoff_core::MessageBuilder {
        from.message(Performative::Request)
            .to(ParticipantId::new("ledger"))
            .content(content)
    }

    #[test]
    fn test_issue_request() {
        let (bus, _dir, mut service) = setup();
        let mut a = bus.endpoint(ParticipantId::new("A")).unwrap();

        a.send(request(&a, ISSUE_SENTINEL)).unwrap();
        let msg = service.endpoint.try_recv().unwrap();
        service.handle_message(msg);

        let reply = a.try_recv().unwrap();
        assert_eq!(reply.performative(), Performative::Inform);
        assert!(service.ledger().store().contains(reply.content()));
        assert_eq!(
            service.ledger().store().issuer_of(reply.content()),
            Some(&ParticipantId::new("A"))
        );
    }

    #[test]
    fn test_redeem_request() {
        let (bus, _dir, mut service) = setup();
        let mut b = bus.endpoint(ParticipantId::new("B")).unwrap();
        let token = service.ledger.issue_token(&ParticipantId::new("A"));

        b.send(request(&b, token.as_str())).unwrap();
        let msg = service.endpoint.try_recv().unwrap();
        service.handle_message(msg);

        let reply = b.try_recv().unwrap();
        assert_eq!(reply.performative(), Performative::Confirm);
        assert_eq!(reply.content(), token.as_str());
        assert!(service.ledger().store().is_empty());

        // Second attempt with the same token is refused.
        b.send(request(&b, token.as_str())).unwrap();
        let msg = service.endpoint.try_recv().unwrap();
        service.handle_message(msg);

        let reply = b.try_recv().unwrap();
        assert_eq!(reply.performative(), Performative::Refuse);
        assert_eq!(reply.content(), REASON_NOT_AVAILABLE);
    }

    #[test]
    fn test_unrecognized_performative_gets_no_reply() {
        let (bus, _dir, mut service) = setup();
        let mut a = bus.endpoint(ParticipantId::new("A")).unwrap();

        for performative in [Performative::Inform, Performative::Confirm, Performative::Refuse] {
            a.send(
                a.message(performative)
                    .to(ParticipantId::new("ledger"))
                    .content(ISSUE_SENTINEL),
            )
            .unwrap();
            let msg = service.endpoint.try_recv().unwrap();
            service.handle_message(msg);
        }

        assert!(a.try_recv().is_none());
        assert!(service.ledger().store().is_empty());
    }

    #[tokio::test]
    async fn test_run_registers_and_deregisters() {
        let (_bus, directory, service) = setup();
        let shutdown = service.shutdown_handle();
        let handle = tokio::spawn(service.run());

        // Registration happens before the first message is taken.
        for _ in 0..100 {
            if find_participant(directory.as_ref(), "ledger").is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            find_participant(directory.as_ref(), "ledger"),
            Some(ParticipantId::new("ledger"))
        );

        shutdown.send(()).await.unwrap();
        handle.await.unwrap();
        assert!(directory.is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let (_bus, directory, mut service) = setup();
        service.register().unwrap();
        service.register().unwrap();
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_issue_requests() {
        const N: usize = 32;

        let (bus, _dir, service) = setup();
        let shutdown = service.shutdown_handle();
        let handle = tokio::spawn(service.run());

        let mut requesters = Vec::new();
        for i in 0..N {
            let bus = bus.clone();
            requesters.push(tokio::spawn(async move {
                let mut endpoint = bus.endpoint(ParticipantId::new(format!("init-{}", i))).unwrap();
                endpoint.send(request(&endpoint, ISSUE_SENTINEL)).unwrap();
                endpoint.recv().await.unwrap()
            }));
        }

        let mut tokens = HashSet::new();
        for requester in requesters {
            let reply = requester.await.unwrap();
            assert_eq!(reply.performative(), Performative::Inform);
            tokens.insert(reply.content().to_string());
        }
        assert_eq!(tokens.len(), N);

        shutdown.send(()).await.unwrap();
        let ledger = handle.await.unwrap();
        assert_eq!(ledger.live_tokens(), N);
        assert!(tokens.iter().all(|t| ledger.store().contains(t)));
    }

    #[tokio::test]
    async fn test_concurrent_redeem_confirms_once() {
        const N: usize = 8;

        let (bus, _dir, mut service) = setup();
        let token = service.ledger.issue_token(&ParticipantId::new("A"));
        let shutdown = service.shutdown_handle();
        let handle = tokio::spawn(service.run());

        let mut redeemers = Vec::new();
        for i in 0..N {
            let bus = bus.clone();
            let token = token.clone();
            redeemers.push(tokio::spawn(async move {
                let mut endpoint = bus
                    .endpoint(ParticipantId::new(format!("relay-{}", i)))
                    .unwrap();
                endpoint.send(request(&endpoint, token.as_str())).unwrap();
                endpoint.recv().await.unwrap().performative()
            }));
        }

        let mut confirms = 0;
        for redeemer in redeemers {
            if redeemer.await.unwrap() == Performative::Confirm {
                confirms += 1;
            }
        }
        assert_eq!(confirms, 1);

        shutdown.send(()).await.unwrap();
        let ledger = handle.await.unwrap();
        assert!(ledger.store().is_empty());
        assert_eq!(ledger.refused_count(), (N - 1) as u64);
    }
}
