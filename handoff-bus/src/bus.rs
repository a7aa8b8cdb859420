//! In-process message bus.
//!
//! The bus keeps one unbounded channel per registered participant. Sending
//! never blocks and never waits for the receiver; ordering between a fixed
//! sender and receiver follows from each channel being FIFO.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;

use handoff_core::{Message, ParticipantId};

use crate::config::BusConfig;
use crate::endpoint::Endpoint;
use crate::error::{BusError, BusResult};

type MailboxRegistry = HashMap<ParticipantId, mpsc::UnboundedSender<Message>>;

/// Shared handle to the message bus. Cloning is cheap.
#[derive(Clone)]
pub struct MessageBus {
    config: Arc<BusConfig>,
    /// Delivery side of every registered mailbox (unbounded so `send` never blocks).
    mailboxes: Arc<RwLock<MailboxRegistry>>,
}

impl MessageBus {
    /// Create an empty bus.
    pub fn new(config: BusConfig) -> Self {
        Self {
            config: Arc::new(config),
            mailboxes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a participant and hand back its mailbox.
    pub fn register(&self, id: ParticipantId) -> BusResult<Mailbox> {
        let mut mailboxes = self.mailboxes.write().map_err(poisoned)?;
        if mailboxes.contains_key(&id) {
            return Err(BusError::AlreadyRegistered(id));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        mailboxes.insert(id.clone(), tx);
        tracing::debug!(participant = %id, "Mailbox registered");

        Ok(Mailbox { owner: id, rx })
    }

    /// Register a participant and wrap its mailbox in an [`Endpoint`].
    pub fn endpoint(&self, id: ParticipantId) -> BusResult<Endpoint> {
        let mailbox = self.register(id)?;
        Ok(Endpoint::new(mailbox, self.clone()))
    }

    /// Remove a participant's mailbox.
    ///
    /// Once the last sender is gone the mailbox yields `None`, which ends the
    /// owner's receive loop.
    pub fn deregister(&self, id: &ParticipantId) -> bool {
        match self.mailboxes.write() {
            Ok(mut mailboxes) => {
                let removed = mailboxes.remove(id).is_some();
                if removed {
                    tracing::debug!(participant = %id, "Mailbox deregistered");
                }
                removed
            }
            Err(_) => false,
        }
    }

    /// Check if a participant currently has a mailbox.
    pub fn is_registered(&self, id: &ParticipantId) -> bool {
        self.mailboxes
            .read()
            .map(|mailboxes| mailboxes.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of registered mailboxes.
    pub fn participant_count(&self) -> usize {
        self.mailboxes.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Deliver a message to every receiver.
    ///
    /// Known receivers get the message even if another receiver is unknown;
    /// the first delivery failure is returned.
    pub fn send(&self, message: Message) -> BusResult<()> {
        let size = message.content().len();
        if size > self.config.max_content_len {
            return Err(BusError::ContentTooLarge {
                size,
                max: self.config.max_content_len,
            });
        }

        let count = message.receivers().count();
        if count > self.config.max_receivers {
            return Err(BusError::TooManyReceivers {
                count,
                max: self.config.max_receivers,
            });
        }

        let mailboxes = self.mailboxes.read().map_err(poisoned)?;
        let mut first_error = None;

        for receiver in message.receivers() {
            let result = match mailboxes.get(receiver) {
                Some(tx) => tx
                    .send(message.clone())
                    .map_err(|_| BusError::MailboxClosed(receiver.clone())),
                None => Err(BusError::UnknownReceiver(receiver.clone())),
            };

            match result {
                Ok(()) => {
                    tracing::trace!(
                        from = %message.sender(),
                        to = %receiver,
                        performative = %message.performative(),
                        "Delivered"
                    );
                }
                Err(e) => {
                    tracing::debug!(to = %receiver, error = %e, "Delivery failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn poisoned<T>(_: T) -> BusError {
    BusError::DirectoryUnavailable("mailbox registry lock poisoned".to_string())
}

/// Receiving side of a participant's mailbox.
pub struct Mailbox {
    owner: ParticipantId,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Mailbox {
    /// The participant this mailbox belongs to.
    pub fn owner(&self) -> &ParticipantId {
        &self.owner
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the mailbox has been deregistered and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Take the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }
}
