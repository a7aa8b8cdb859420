//! Participant endpoint: identity, mailbox and a handle to the bus.

use handoff_core::{Message, MessageBuilder, ParticipantId, Performative};

use crate::bus::{Mailbox, MessageBus};
use crate::error::BusResult;

/// A participant's attachment to the bus.
pub struct Endpoint {
    mailbox: Mailbox,
    bus: MessageBus,
}

impl Endpoint {
    pub(crate) fn new(mailbox: Mailbox, bus: MessageBus) -> Self {
        Self { mailbox, bus }
    }

    /// The participant this endpoint belongs to.
    pub fn id(&self) -> &ParticipantId {
        self.mailbox.owner()
    }

    /// Start a message sent from this participant.
    pub fn message(&self, performative: Performative) -> MessageBuilder {
        Message::builder(performative, self.id().clone())
    }

    /// Start a reply to `to`, sent from this participant.
    pub fn reply(&self, to: &Message, performative: Performative) -> MessageBuilder {
        to.reply(performative, self.id().clone())
    }

    /// Build and send a message. Fire-and-forget: success means the message
    /// was queued, not that it was processed.
    pub fn send(&self, builder: MessageBuilder) -> BusResult<()> {
        let message = builder.build()?;
        tracing::debug!(
            from = %message.sender(),
            performative = %message.performative(),
            content = %message.content(),
            "Sending"
        );
        self.bus.send(message)
    }

    /// Wait for the next message addressed to this participant.
    pub async fn recv(&mut self) -> Option<Message> {
        self.mailbox.recv().await
    }

    /// Take the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.mailbox.try_recv()
    }

    /// Detach from the bus. Messages sent afterwards to this participant fail
    /// with an unknown-receiver error.
    pub fn close(self) {
        self.bus.deregister(self.mailbox.owner());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;
    use crate::error::BusError;

    #[tokio::test]
    async fn test_endpoint_roundtrip() {
        let bus = MessageBus::new(BusConfig::default());
        let mut ledger = bus.endpoint(ParticipantId::new("ledger")).unwrap();
        let mut a = bus.endpoint(ParticipantId::new("A")).unwrap();

        a.send(a.message(Performative::Request).to(ledger.id().clone()).content("false"))
            .unwrap();

        let request = ledger.recv().await.unwrap();
        assert_eq!(request.performative(), Performative::Request);

        ledger
            .send(ledger.reply(&request, Performative::Inform).content("TXN-1"))
            .unwrap();

        let reply = a.recv().await.unwrap();
        assert_eq!(reply.sender(), ledger.id());
        assert_eq!(reply.content(), "TXN-1");
    }

    #[test]
    fn test_send_without_receiver() {
        let bus = MessageBus::new(BusConfig::default());
        let a = bus.endpoint(ParticipantId::new("A")).unwrap();

        assert!(matches!(
            a.send(a.message(Performative::Inform)),
            Err(BusError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_close_deregisters() {
        let bus = MessageBus::new(BusConfig::default());
        let a = bus.endpoint(ParticipantId::new("A")).unwrap();
        let b = bus.endpoint(ParticipantId::new("B")).unwrap();

        b.close();
        assert!(matches!(
            a.send(a.message(Performative::Inform).to(ParticipantId::new("B"))),
            Err(BusError::UnknownReceiver(_))
        ));
    }
}
