//! Protocol messages.
//!
//! Every exchange in the protocol is a [`Message`]: a performative, a sender,
//! one or more receivers and a single string content field. Messages are
//! assembled with a [`MessageBuilder`] and are immutable afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{ParticipantId, Token};

/// Content value of a request asking the ledger to issue a new token.
///
/// Issue and redeem requests share the content field and are told apart only
/// by comparing against this value.
pub const ISSUE_SENTINEL: &str = "false";

/// Speech-act tag of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Performative {
    /// Ask for an action: issue or redeem, told apart by the content.
    Request,
    /// Notify of a value: token handback.
    Inform,
    /// A redeem request succeeded.
    Confirm,
    /// A redeem request failed; the content carries the reason.
    Refuse,
}

impl Performative {
    /// Get a human-readable name for the performative.
    pub fn name(&self) -> &'static str {
        match self {
            Performative::Request => "request",
            Performative::Inform => "inform",
            Performative::Confirm => "confirm",
            Performative::Refuse => "refuse",
        }
    }
}

impl fmt::Display for Performative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Performative {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "request" => Ok(Performative::Request),
            "inform" => Ok(Performative::Inform),
            "confirm" => Ok(Performative::Confirm),
            "refuse" => Ok(Performative::Refuse),
            _ => Err(CoreError::UnknownPerformative(s.to_string())),
        }
    }
}

/// What a `Request` asks the ledger to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestContent {
    /// Issue a new token to the sender.
    Issue,
    /// Redeem the given token.
    Redeem(Token),
}

impl RequestContent {
    /// Classify the content of a `Request`.
    pub fn classify(content: &str) -> Self {
        if content == ISSUE_SENTINEL {
            RequestContent::Issue
        } else {
            RequestContent::Redeem(Token::from_content(content))
        }
    }

    /// Encode back into message content.
    pub fn to_content(&self) -> String {
        match self {
            RequestContent::Issue => ISSUE_SENTINEL.to_string(),
            RequestContent::Redeem(token) => token.as_str().to_string(),
        }
    }
}

/// An addressed protocol message.
///
/// Always has at least one receiver, including when decoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MessageBuilder")]
pub struct Message {
    performative: Performative,
    sender: ParticipantId,
    receivers: BTreeSet<ParticipantId>,
    content: String,
}

impl Message {
    /// Start building a message with the given performative.
    pub fn builder(performative: Performative, sender: ParticipantId) -> MessageBuilder {
        MessageBuilder {
            performative,
            sender,
            receivers: BTreeSet::new(),
            content: String::new(),
        }
    }

    /// The speech-act tag.
    pub fn performative(&self) -> Performative {
        self.performative
    }

    /// Who sent the message.
    pub fn sender(&self) -> &ParticipantId {
        &self.sender
    }

    /// Everyone the message is addressed to.
    pub fn receivers(&self) -> impl Iterator<Item = &ParticipantId> {
        self.receivers.iter()
    }

    /// Check if a participant is among the receivers.
    pub fn is_addressed_to(&self, id: &ParticipantId) -> bool {
        self.receivers.contains(id)
    }

    /// The content payload.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Start a reply to the sender of this message.
    pub fn reply(&self, performative: Performative, from: ParticipantId) -> MessageBuilder {
        Message::builder(performative, from).to(self.sender.clone())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receivers: Vec<&str> = self.receivers.iter().map(|r| r.as_str()).collect();
        write!(
            f,
            "{}({} -> [{}], content={:?})",
            self.performative,
            self.sender,
            receivers.join(", "),
            self.content
        )
    }
}

/// Builder for [`Message`].
#[derive(Clone, Debug, Deserialize)]
pub struct MessageBuilder {
    performative: Performative,
    sender: ParticipantId,
    receivers: BTreeSet<ParticipantId>,
    content: String,
}

impl MessageBuilder {
    /// Add a receiver.
    pub fn to(mut self, receiver: ParticipantId) -> Self {
        self.receivers.insert(receiver);
        self
    }

    /// Set the content payload.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Finish the message. At least one receiver is required.
    pub fn build(self) -> Result<Message, CoreError> {
        if self.receivers.is_empty() {
            return Err(CoreError::NoReceivers);
        }
        Ok(Message {
            performative: self.performative,
            sender: self.sender,
            receivers: self.receivers,
            content: self.content,
        })
    }
}

impl TryFrom<MessageBuilder> for Message {
    type Error = CoreError;

    fn try_from(builder: MessageBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
