//! # Host collaborators
//!
//! The engine does not track balances, the pause switch or ownership itself.
//! It reads them, live and on every call, from an injected [`Host`], and it
//! reads oracle prices from a [`PriceFeed`].
//!
//! [`MemoryHost`] and [`MockPriceFeed`] are in-memory implementations used by
//! the gateway service and the test suite.

use std::collections::HashMap;

use tracing::info;

use crate::errors::{Error, Result};
use crate::events::Event;
use crate::fixed::FixedPoint;
use crate::types::{Address, OracleReading, Timestamp};

/// Balance, pause and ownership lookups supplied by the surrounding token.
pub trait Host {
    /// Token balance of `address`; zero when unknown.
    fn balance_of(&self, address: &Address) -> FixedPoint;

    /// Global gate for purchases and votes.
    fn is_paused(&self) -> bool;

    fn is_owner(&self, address: &Address) -> bool;
}

/// Source of payment-currency/USD readings.
pub trait PriceFeed {
    fn current_oracle_reading(&self) -> OracleReading;
}

impl PriceFeed for OracleReading {
    fn current_oracle_reading(&self) -> OracleReading {
        *self
    }
}

// ── In-memory host ───────────────────────────────────────────────────

/// Owner, pause switch and balance table kept in memory.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    owner: Address,
    paused: bool,
    balances: HashMap<Address, FixedPoint>,
}

impl MemoryHost {
    pub fn new(owner: Address) -> Self {
        MemoryHost {
            owner,
            paused: false,
            balances: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Overwrite the balance of `address`. Stands in for transfer bookkeeping.
    pub fn set_balance(&mut self, address: Address, amount: FixedPoint) {
        if amount.is_zero() {
            self.balances.remove(&address);
        } else {
            self.balances.insert(address, amount);
        }
    }

    /// Halt purchases and votes. Owner only.
    pub fn pause(&mut self, caller: &Address) -> Result<Event> {
        if !self.is_owner(caller) {
            return Err(Error::Unauthorized);
        }
        self.paused = true;
        info!(by = %caller, "protocol paused");
        Ok(Event::ProtocolPaused { by: caller.clone() })
    }

    /// Resume purchases and votes. Owner only.
    pub fn unpause(&mut self, caller: &Address) -> Result<Event> {
        if !self.is_owner(caller) {
            return Err(Error::Unauthorized);
        }
        self.paused = false;
        info!(by = %caller, "protocol unpaused");
        Ok(Event::ProtocolUnpaused { by: caller.clone() })
    }
}

impl Host for MemoryHost {
    fn balance_of(&self, address: &Address) -> FixedPoint {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_owner(&self, address: &Address) -> bool {
        *address == self.owner
    }
}

// ── Mock price feed ──────────────────────────────────────────────────

/// Aggregator-style feed double: an integer answer with `decimals`
/// fractional digits, as published by on-chain USD feeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockPriceFeed {
    pub answer: u128,
    pub decimals: u32,
    pub updated_at: Timestamp,
}

impl MockPriceFeed {
    /// An 8-decimal feed answering `usd` whole dollars. Amounts past the
    /// feed's range answer zero.
    pub fn usd(usd: u128) -> Self {
        MockPriceFeed {
            answer: usd.checked_mul(100_000_000).unwrap_or_default(),
            decimals: 8,
            updated_at: 0,
        }
    }
}

impl PriceFeed for MockPriceFeed {
    fn current_oracle_reading(&self) -> OracleReading {
        OracleReading {
            // Answers too large for the canonical scale read as zero, which
            // every quote rejects.
            price: FixedPoint::from_scaled(self.answer, self.decimals).unwrap_or_default(),
            timestamp: self.updated_at,
        }
    }
}
