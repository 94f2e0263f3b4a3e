//! # Types
//!
//! Shared data structures used across all modules of the Reach token engine.
//!
//! ## Design decisions
//!
//! ### Parameters / sale state split
//!
//! The pricing side keeps two separate records:
//!
//! - [`CurveParameters`] — replaced wholesale by the owner; never patched
//!   field by field.
//! - [`SaleState`] — the running `tokens_sold` counter, written on every
//!   purchase and never decremented.
//!
//! ### Proposal lifecycle
//!
//! ```text
//! Open ──(now >= end_time)──► Closed ──(owner)──► executed = true
//! ```
//!
//! `Open`/`Closed` is derived from the caller-supplied clock and is never
//! stored; `executed` is the only lifecycle bit persisted on the proposal.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::fixed::FixedPoint;

/// Seconds since the Unix epoch, supplied by the caller.
pub type Timestamp = u64;

/// Opaque wallet identity. The engine never inspects its contents.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Address(raw.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Address::new(raw)
    }
}

/// Bonding-curve configuration: `price = base_price + bonding_constant * sold^2`,
/// never below `floor_price`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CurveParameters {
    pub base_price: FixedPoint,
    pub bonding_constant: FixedPoint,
    pub floor_price: FixedPoint,
}

impl Default for CurveParameters {
    /// The launch configuration: $27 base and floor, k = 0.001.
    fn default() -> Self {
        CurveParameters {
            base_price: FixedPoint::from_raw(27 * crate::fixed::SCALE),
            bonding_constant: FixedPoint::from_raw(crate::fixed::SCALE / 1_000),
            floor_price: FixedPoint::from_raw(27 * crate::fixed::SCALE),
        }
    }
}

/// Running sale counter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SaleState {
    pub tokens_sold: FixedPoint,
}

/// A point-in-time price-feed answer (USD per unit of payment currency).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OracleReading {
    pub price: FixedPoint,
    pub timestamp: Timestamp,
}

/// A governance proposal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential identifier, starting at 1.
    pub id: u64,
    pub description: String,
    /// Number of distinct wallets that voted. Never balance-weighted.
    pub vote_count: u64,
    /// Votes are accepted while `now < end_time`.
    pub end_time: Timestamp,
    pub executed: bool,
}

/// Voting state derived from the clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Open,
    Closed,
}

impl Proposal {
    pub fn status(&self, now: Timestamp) -> ProposalStatus {
        if now < self.end_time {
            ProposalStatus::Open
        } else {
            ProposalStatus::Closed
        }
    }
}

/// Result of a successful purchase.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub tokens_issued: FixedPoint,
    /// Per-token USD price the purchase was quoted at.
    pub price_per_token: FixedPoint,
    /// Payment retained for the tokens.
    pub payment_required: FixedPoint,
    /// `payment_sent - payment_required`, owed back to the buyer.
    pub refund: FixedPoint,
    /// 10% of `payment_sent`, earmarked for the buyback reserve.
    pub reserve_share: FixedPoint,
    pub tokens_sold_after: FixedPoint,
}

/// Snapshot returned by `contract_info`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub current_price: FixedPoint,
    pub tokens_sold: FixedPoint,
    pub parameters: CurveParameters,
    pub proposal_count: u64,
    pub paused: bool,
}
