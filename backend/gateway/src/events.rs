//! Storage shapes for events emitted by the Reach token engine.
//!
//! The engine's own [`reach_token::Event`] is flattened into a row with a
//! few indexed columns plus the full JSON payload.

use reach_token::Event;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// A decoded engine event, ready to be stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub event_type: String,
    pub proposal_id: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub payload: String,
    pub timestamp: i64,
}

impl NewEvent {
    pub fn from_engine(event: &Event, timestamp: i64) -> Result<Self> {
        let amount = match event {
            Event::PurchaseExecuted { token_amount, .. } => Some(token_amount.to_string()),
            Event::VoteCast { votes, .. } => Some(votes.to_string()),
            _ => None,
        };
        Ok(NewEvent {
            event_type: event.topic().to_string(),
            proposal_id: event.proposal_id().and_then(|id| i64::try_from(id).ok()),
            actor: event.actor().map(|a| a.to_string()),
            amount,
            payload: serde_json::to_string(event)?,
            timestamp,
        })
    }
}

/// An event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub proposal_id: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub payload: String,
    pub timestamp: i64,
    pub created_at: i64,
}
