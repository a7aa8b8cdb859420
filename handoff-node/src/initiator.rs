//! Initiator participant.
//!
//! The initiator starts the protocol exactly once: it looks up the ledger,
//! asks it for a token and hands the token it receives to the relay. After
//! that its receive loop keeps running only to report stray traffic.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use handoff_bus::{find_participant, Directory, Endpoint};
use handoff_core::{Message, ParticipantId, Performative, RequestContent, Token};

/// State of the initiator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InitiatorState {
    /// Not started yet.
    #[default]
    Idle,
    /// Issue request sent, waiting for the ledger's reply.
    AwaitingToken,
    /// Token handed to the relay.
    Forwarded(Token),
    /// No ledger could be found; nothing was sent.
    DiscoveryFailed,
}

impl InitiatorState {
    /// Check if the initiator has nothing further to do.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InitiatorState::Forwarded(_) | InitiatorState::DiscoveryFailed)
    }
}

impl fmt::Display for InitiatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitiatorState::Idle => write!(f, "idle"),
            InitiatorState::AwaitingToken => write!(f, "awaiting_token"),
            InitiatorState::Forwarded(_) => write!(f, "forwarded"),
            InitiatorState::DiscoveryFailed => write!(f, "discovery_failed"),
        }
    }
}

/// The initiator participant.
pub struct Initiator {
    endpoint: Endpoint,
    directory: Arc<dyn Directory>,
    /// Role the ledger is advertised under.
    ledger_role: String,
    /// Where issued tokens are handed to.
    relay: ParticipantId,
    state: InitiatorState,
    started: bool,
    state_tx: watch::Sender<InitiatorState>,
    shutdown_rx: mpsc::Receiver<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Initiator {
    /// Create an initiator that will hand its token to `relay`.
    pub fn new(
        endpoint: Endpoint,
        directory: Arc<dyn Directory>,
        ledger_role: impl Into<String>,
        relay: ParticipantId,
    ) -> Self {
        let (state_tx, _) = watch::channel(InitiatorState::Idle);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            endpoint,
            directory,
            ledger_role: ledger_role.into(),
            relay,
            state: InitiatorState::Idle,
            started: false,
            state_tx,
            shutdown_rx,
            shutdown_tx,
        }
    }

    /// The initiator's participant identity.
    pub fn id(&self) -> &ParticipantId {
        self.endpoint.id()
    }

    /// Current state.
    pub fn state(&self) -> &InitiatorState {
        &self.state
    }

    /// Get a receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<InitiatorState> {
        self.state_tx.subscribe()
    }

    /// Get the shutdown sender for stopping the receive loop.
    pub fn shutdown_handle(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Discover the ledger and request a token. Only the first call acts.
    pub fn start(&mut self) {
        if self.started {
            tracing::debug!(participant = %self.id(), "Initiator already started");
            return;
        }
        self.started = true;

        let ledger = match find_participant(self.directory.as_ref(), &self.ledger_role) {
            Some(ledger) => ledger,
            None => {
                tracing::warn!(
                    participant = %self.id(),
                    role = %self.ledger_role,
                    "Cannot communicate: ledger not found"
                );
                self.transition_to(InitiatorState::DiscoveryFailed);
                return;
            }
        };

        tracing::info!(
            participant = %self.id(),
            ledger = %ledger,
            "Found ledger, requesting token"
        );
        let request = self
            .endpoint
            .message(Performative::Request)
            .to(ledger)
            .content(RequestContent::Issue.to_content());

        match self.endpoint.send(request) {
            Ok(()) => self.transition_to(InitiatorState::AwaitingToken),
            Err(e) => tracing::warn!(
                participant = %self.id(),
                error = %e,
                "Failed to send issue request"
            ),
        }
    }

    /// Handle one incoming message.
    pub fn handle_message(&mut self, msg: Message) {
        tracing::debug!(
            participant = %self.id(),
            message = %msg,
            state = %self.state,
            "Initiator received"
        );

        if self.state != InitiatorState::AwaitingToken {
            tracing::warn!(
                participant = %self.id(),
                state = %self.state,
                performative = %msg.performative(),
                sender = %msg.sender(),
                "Unexpected message, ignoring"
            );
            return;
        }

        match msg.performative() {
            Performative::Inform => {
                let token = Token::from_content(msg.content());
                tracing::info!(
                    participant = %self.id(),
                    token = %token,
                    "Got the token, forwarding to relay"
                );

                let handback = self
                    .endpoint
                    .message(Performative::Inform)
                    .to(self.relay.clone())
                    .content(token.as_str());
                if let Err(e) = self.endpoint.send(handback) {
                    tracing::warn!(relay = %self.relay, error = %e, "Failed to forward token");
                }

                self.transition_to(InitiatorState::Forwarded(token));
            }
            other => {
                tracing::warn!(
                    participant = %self.id(),
                    performative = %other,
                    "No valid performative, ignoring"
                );
            }
        }
    }

    /// Start the protocol, then receive until shutdown or until the mailbox closes.
    ///
    /// Returns the final state.
    pub async fn run(mut self) -> InitiatorState {
        tracing::info!(participant = %self.id(), "{} is ready", self.id());
        self.start();

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    tracing::debug!(participant = %self.id(), "Initiator shutting down");
                    break;
                }

                msg = self.endpoint.recv() => {
                    match msg {
                        Some(msg) => self.handle_message(msg),
                        None => break,
                    }
                }
            }
        }

        self.state
    }

    fn transition_to(&mut self, new_state: InitiatorState) {
        tracing::debug!(
            participant = %self.id(),
            from = %self.state,
            to = %new_state,
            "Initiator state transition"
        );
        self.state = new_state.clone();
        self.state_tx.send_replace(new_state);
    }
}
