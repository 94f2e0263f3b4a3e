//! Observable events emitted by the engine.
//!
//! Operations hand events back to the caller instead of publishing them;
//! the engine façade collects them in an [`EventLog`].

use serde::{Deserialize, Serialize};

use crate::fixed::FixedPoint;
use crate::types::{Address, CurveParameters, Timestamp};

/// Weight carried by every `VoteCast` event.
pub const VOTE_WEIGHT: u64 = 1;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ProposalCreated {
        id: u64,
        description: String,
        end_time: Timestamp,
    },
    /// `votes` is always [`VOTE_WEIGHT`], whatever the voter's balance.
    VoteCast {
        wallet: Address,
        proposal_id: u64,
        votes: u64,
    },
    ProposalExecuted {
        id: u64,
    },
    PurchaseExecuted {
        buyer: Address,
        token_amount: FixedPoint,
        payment_amount: FixedPoint,
    },
    ParametersUpdated {
        params: CurveParameters,
    },
    ProtocolPaused {
        by: Address,
    },
    ProtocolUnpaused {
        by: Address,
    },
}

impl Event {
    /// Short topic identifier, used as the stored event type.
    pub fn topic(&self) -> &'static str {
        match self {
            Event::ProposalCreated { .. } => "proposal_created",
            Event::VoteCast { .. } => "vote_cast",
            Event::ProposalExecuted { .. } => "proposal_executed",
            Event::PurchaseExecuted { .. } => "purchase_executed",
            Event::ParametersUpdated { .. } => "parameters_updated",
            Event::ProtocolPaused { .. } => "protocol_paused",
            Event::ProtocolUnpaused { .. } => "protocol_unpaused",
        }
    }

    /// Proposal the event concerns, if any.
    pub fn proposal_id(&self) -> Option<u64> {
        match self {
            Event::ProposalCreated { id, .. } | Event::ProposalExecuted { id } => Some(*id),
            Event::VoteCast { proposal_id, .. } => Some(*proposal_id),
            _ => None,
        }
    }

    /// Wallet that caused the event, if any.
    pub fn actor(&self) -> Option<&Address> {
        match self {
            Event::VoteCast { wallet, .. } => Some(wallet),
            Event::PurchaseExecuted { buyer, .. } => Some(buyer),
            Event::ProtocolPaused { by } | Event::ProtocolUnpaused { by } => Some(by),
            _ => None,
        }
    }
}

/// Append-only list of events emitted by successful operations.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn publish(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn all(&self) -> &[Event] {
        &self.events
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Hand over everything published so far, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
