//! Relay participant.
//!
//! The relay receives a token from the initiator, asks the ledger to redeem
//! it and records whether the transaction may proceed.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use handoff_bus::{find_participant, Directory, Endpoint};
use handoff_core::{Message, ParticipantId, Performative, RequestContent, Token};

/// State of the relay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RelayState {
    /// Waiting for a token handback.
    #[default]
    Idle,
    /// Redeem request sent, waiting for the ledger's verdict.
    AwaitingLedger(Token),
    /// The ledger confirmed the token; the transaction can proceed.
    Confirmed(Token),
    /// The ledger refused the token.
    Refused {
        /// Reason given by the ledger.
        reason: String,
    },
}

impl RelayState {
    /// Check if the relay has reached a verdict.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RelayState::Confirmed(_) | RelayState::Refused { .. })
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayState::Idle => write!(f, "idle"),
            RelayState::AwaitingLedger(_) => write!(f, "awaiting_ledger"),
            RelayState::Confirmed(_) => write!(f, "confirmed"),
            RelayState::Refused { .. } => write!(f, "refused"),
        }
    }
}

/// The relay participant.
pub struct Relay {
    endpoint: Endpoint,
    directory: Arc<dyn Directory>,
    /// Role the ledger is advertised under.
    ledger_role: String,
    state: RelayState,
    state_tx: watch::Sender<RelayState>,
    shutdown_rx: mpsc::Receiver<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Relay {
    /// Create a relay.
    pub fn new(
        endpoint: Endpoint,
        directory: Arc<dyn Directory>,
        ledger_role: impl Into<String>,
    ) -> Self {
        let (state_tx, _) = watch::channel(RelayState::Idle);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            endpoint,
            directory,
            ledger_role: ledger_role.into(),
            state: RelayState::Idle,
            state_tx,
            shutdown_rx,
            shutdown_tx,
        }
    }

    /// The relay's participant identity.
    pub fn id(&self) -> &ParticipantId {
        self.endpoint.id()
    }

    /// Current state.
    pub fn state(&self) -> &RelayState {
        &self.state
    }

    /// Get a receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<RelayState> {
        self.state_tx.subscribe()
    }

    /// Get the shutdown sender for stopping the receive loop.
    pub fn shutdown_handle(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Handle one incoming message.
    pub fn handle_message(&mut self, msg: Message) {
        tracing::debug!(
            participant = %self.id(),
            message = %msg,
            state = %self.state,
            "Relay received"
        );

        match msg.performative() {
            Performative::Inform => self.handle_handback(&msg),
            Performative::Confirm | Performative::Refuse if self.state.is_terminal() => {
                tracing::warn!(
                    participant = %self.id(),
                    state = %self.state,
                    performative = %msg.performative(),
                    "Verdict already recorded, ignoring"
                );
            }
            Performative::Confirm => {
                let token = Token::from_content(msg.content());
                tracing::info!(
                    participant = %self.id(),
                    token = %token,
                    "Token verified, transaction can proceed"
                );
                self.transition_to(RelayState::Confirmed(token));
            }
            Performative::Refuse => {
                let reason = msg.content().to_string();
                tracing::info!(
                    participant = %self.id(),
                    reason = %reason,
                    "Token not verified, transaction cannot proceed"
                );
                self.transition_to(RelayState::Refused { reason });
            }
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

    fn handle_handback(&mut self, msg: &Message) {
        let token = Token::from_content(msg.content());
        tracing::info!(
            participant = %self.id(),
            token = %token,
            from = %msg.sender(),
            "Got the token"
        );

        if self.state != RelayState::Idle {
            tracing::warn!(
                participant = %self.id(),
                state = %self.state,
                token = %token,
                "Already handling a token, ignoring handback"
            );
            return;
        }

        let ledger = match find_participant(self.directory.as_ref(), &self.ledger_role) {
            Some(ledger) => ledger,
            None => {
                tracing::warn!(
                    participant = %self.id(),
                    role = %self.ledger_role,
                    token = %token,
                    "Cannot communicate: ledger not found"
                );
                return;
            }
        };

        let request = self
            .endpoint
            .message(Performative::Request)
            .to(ledger.clone())
            .content(RequestContent::Redeem(token.clone()).to_content());

        match self.endpoint.send(request) {
            Ok(()) => {
                tracing::debug!(
                    participant = %self.id(),
                    ledger = %ledger,
                    token = %token,
                    "Redeem request sent"
                );
                self.transition_to(RelayState::AwaitingLedger(token));
            }
            Err(e) => {
                tracing::warn!(
                    participant = %self.id(),
                    ledger = %ledger,
                    error = %e,
                    "Failed to send redeem request"
                );
            }
        }
    }

    /// Receive until shutdown or until the mailbox closes. Returns the final state.
    pub async fn run(mut self) -> RelayState {
        tracing::info!(participant = %self.id(), "{} is ready", self.id());

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    tracing::debug!(participant = %self.id(), "Relay shutting down");
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

    fn transition_to(&mut self, new_state: RelayState) {
        tracing::debug!(
            participant = %self.id(),
            from = %self.state,
            to = %new_state,
            "Relay state transition"
        );
        self.state = new_state.clone();
        self.state_tx.send_replace(new_state);
    }
}
