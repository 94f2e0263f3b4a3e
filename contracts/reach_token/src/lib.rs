//! # Reach Token Engine
//!
//! Economic and governance core of the Reach token. It exposes the single
//! state container [`ReachToken`] whose entry points cover:
//!
//! | Area        | Entry Point(s)                                               |
//! |-------------|--------------------------------------------------------------|
//! | Pricing     | `curve_price`, `current_price`, `quote_payment`              |
//! | Sale        | [`ReachToken::buy_tokens`]                                   |
//! | Owner admin | `update_price_parameters`, `create_proposal`, `execute_proposal` |
//! | Voting      | [`ReachToken::vote`]                                         |
//! | Queries     | `get_proposal`, `has_voted`, `proposal_count`, `contract_info` |
//!
//! ## Architecture
//!
//! Curve math and the sale counter live in [`pricing`]; proposals and vote
//! records live in [`governance`] on top of [`storage`]. Balances, the pause
//! switch and ownership belong to the surrounding token and are read through
//! the injected [`Host`]. Oracle prices arrive through a [`PriceFeed`].
//!
//! Nothing here performs I/O or reads a clock: `now` is always an argument,
//! and events are appended to an [`EventLog`] for the caller to drain.
//!
//! Every entry point either applies all of its effects and publishes its
//! events, or returns an [`Error`] having changed nothing.

pub mod errors;
pub mod events;
pub mod fixed;
pub mod governance;
pub mod host;
pub mod pricing;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_governance;
#[cfg(test)]
mod test_pricing;

pub use errors::{Error, Result};
pub use events::{Event, EventLog, VOTE_WEIGHT};
pub use fixed::FixedPoint;
pub use governance::{GovernanceLedger, VOTING_PERIOD};
pub use host::{Host, MemoryHost, MockPriceFeed, PriceFeed};
pub use pricing::{PricingEngine, PurchaseOrder, BUYBACK_RESERVE_BPS};
pub use types::{
    Address, ContractInfo, CurveParameters, OracleReading, Proposal, ProposalStatus,
    PurchaseReceipt, SaleState, Timestamp,
};

/// The token engine: pricing, governance and the host they consult.
#[derive(Clone, Debug)]
pub struct ReachToken<H: Host> {
    host: H,
    pricing: PricingEngine,
    governance: GovernanceLedger,
    events: EventLog,
}

impl<H: Host> ReachToken<H> {
    pub fn new(host: H, params: CurveParameters) -> Self {
        ReachToken {
            host,
            pricing: PricingEngine::new(params),
            governance: GovernanceLedger::new(),
            events: EventLog::default(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to pause or move balances.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    // ─────────────────────────────────────────────────────────
    // Pricing
    // ─────────────────────────────────────────────────────────

    pub fn parameters(&self) -> &CurveParameters {
        self.pricing.params()
    }

    pub fn tokens_sold(&self) -> FixedPoint {
        self.pricing.tokens_sold()
    }

    /// Curve price at the current sale position, without the floor.
    pub fn curve_price(&self) -> Result<FixedPoint> {
        self.pricing.curve_price()
    }

    /// USD price per token, never below the floor.
    pub fn current_price(&self, feed: &impl PriceFeed) -> Result<FixedPoint> {
        self.pricing.current_price(&feed.current_oracle_reading())
    }

    /// Payment-currency cost of `token_amount` tokens. The feed's reading is
    /// used as the payment currency's USD rate.
    pub fn quote_payment(&self, token_amount: FixedPoint, feed: &impl PriceFeed) -> Result<FixedPoint> {
        let reading = feed.current_oracle_reading();
        self.pricing
            .quote(token_amount, &reading, reading.price)
            .map(|q| q.payment_required)
    }

    /// Sell tokens to `buyer` on the curve.
    pub fn buy_tokens(
        &mut self,
        buyer: &Address,
        order: PurchaseOrder,
        feed: &impl PriceFeed,
    ) -> Result<PurchaseReceipt> {
        let reading = feed.current_oracle_reading();
        let (receipt, event) =
            self.pricing
                .execute_purchase(&self.host, buyer, order, &reading, reading.price)?;
        self.events.publish(event);
        Ok(receipt)
    }

    /// Replace the curve parameters. Owner only.
    pub fn update_price_parameters(&mut self, caller: &Address, params: CurveParameters) -> Result<()> {
        let is_owner = self.host.is_owner(caller);
        let event = self.pricing.update_parameters(params, is_owner)?;
        self.events.publish(event);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Governance
    // ─────────────────────────────────────────────────────────

    /// Open a 7-day proposal. Owner only. Returns the new proposal id.
    pub fn create_proposal(&mut self, caller: &Address, description: &str, now: Timestamp) -> Result<u64> {
        let is_owner = self.host.is_owner(caller);
        let (id, event) = self.governance.create_proposal(description, is_owner, now)?;
        self.events.publish(event);
        Ok(id)
    }

    /// Cast `wallet`'s single vote. Returns the proposal's new vote count.
    pub fn vote(&mut self, wallet: &Address, proposal_id: u64, now: Timestamp) -> Result<u64> {
        let (vote_count, event) = self.governance.vote(&self.host, proposal_id, wallet, now)?;
        self.events.publish(event);
        Ok(vote_count)
    }

    /// Mark a closed proposal executed. Owner only, once.
    pub fn execute_proposal(&mut self, caller: &Address, proposal_id: u64, now: Timestamp) -> Result<()> {
        let is_owner = self.host.is_owner(caller);
        let event = self.governance.mark_executed(proposal_id, is_owner, now)?;
        self.events.publish(event);
        Ok(())
    }

    pub fn has_voted(&self, proposal_id: u64, wallet: &Address) -> bool {
        self.governance.has_voted(proposal_id, wallet)
    }

    pub fn get_proposal(&self, proposal_id: u64) -> Result<Proposal> {
        self.governance.get_proposal(proposal_id)
    }

    pub fn proposal_count(&self) -> u64 {
        self.governance.proposal_count()
    }

    pub fn governance(&self) -> &GovernanceLedger {
        &self.governance
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn contract_info(&self, feed: &impl PriceFeed) -> Result<ContractInfo> {
        Ok(ContractInfo {
            current_price: self.current_price(feed)?,
            tokens_sold: self.tokens_sold(),
            parameters: *self.parameters(),
            proposal_count: self.proposal_count(),
            paused: self.host.is_paused(),
        })
    }
}

impl ReachToken<MemoryHost> {
    /// Pause purchases and votes. Owner only.
    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        let event = self.host.pause(caller)?;
        self.events.publish(event);
        Ok(())
    }

    /// Resume purchases and votes. Owner only.
    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        let event = self.host.unpause(caller)?;
        self.events.publish(event);
        Ok(())
    }
}
