//! # Governance ledger
//!
//! One wallet, one vote. Any wallet holding a strictly positive balance may
//! vote once per proposal, and every vote adds exactly one to the tally no
//! matter how large the balance is.
//!
//! Checks in [`GovernanceLedger::vote`] run in a fixed order (pause,
//! eligibility, existence, expiry, duplicate) and all of them precede the
//! first write.

use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::events::{Event, VOTE_WEIGHT};
use crate::host::Host;
use crate::storage::ProposalStore;
use crate::types::{Address, Proposal, Timestamp};

/// Voting window: 7 days in seconds.
pub const VOTING_PERIOD: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, Default)]
pub struct GovernanceLedger {
    store: ProposalStore,
}

impl GovernanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a proposal for [`VOTING_PERIOD`] seconds starting at `now`.
    /// Descriptions are not validated; an empty one is accepted.
    pub fn create_proposal(
        &mut self,
        description: impl Into<String>,
        caller_is_owner: bool,
        now: Timestamp,
    ) -> Result<(u64, Event)> {
        if !caller_is_owner {
            return Err(Error::Unauthorized);
        }

        let id = self.store.next_proposal_id()?;
        let end_time = now.checked_add(VOTING_PERIOD).ok_or(Error::ArithmeticOverflow)?;
        let description = description.into();

        self.store.insert_proposal(Proposal {
            id,
            description: description.clone(),
            vote_count: 0,
            end_time,
            executed: false,
        });

        info!(id, end_time, "proposal created");
        Ok((
            id,
            Event::ProposalCreated {
                id,
                description,
                end_time,
            },
        ))
    }

    /// Record `wallet`'s vote on `proposal_id` and return the new tally.
    pub fn vote<H: Host>(
        &mut self,
        host: &H,
        proposal_id: u64,
        wallet: &Address,
        now: Timestamp,
    ) -> Result<(u64, Event)> {
        if host.is_paused() {
            return Err(Error::Paused);
        }
        // Eligibility only; the balance never weighs the vote.
        if host.balance_of(wallet).is_zero() {
            debug!(%wallet, proposal_id, "vote rejected: must hold tokens to vote");
            return Err(Error::Unauthorized);
        }

        let proposal = self.store.load_proposal(proposal_id)?;
        if now >= proposal.end_time {
            return Err(Error::VotingClosed);
        }
        if self.store.has_vote_record(proposal_id, wallet) {
            return Err(Error::AlreadyVoted);
        }
        let vote_count = proposal
            .vote_count
            .checked_add(VOTE_WEIGHT)
            .ok_or(Error::ArithmeticOverflow)?;

        self.store.save_vote_record(proposal_id, wallet);
        self.store.load_proposal_mut(proposal_id)?.vote_count = vote_count;

        info!(%wallet, proposal_id, vote_count, "vote cast");
        Ok((
            vote_count,
            Event::VoteCast {
                wallet: wallet.clone(),
                proposal_id,
                votes: VOTE_WEIGHT,
            },
        ))
    }

    /// Flag a closed proposal as executed. Carrying out the proposal is
    /// somebody else's job; this only guards against doing it twice.
    pub fn mark_executed(&mut self, proposal_id: u64, caller_is_owner: bool, now: Timestamp) -> Result<Event> {
        if !caller_is_owner {
            return Err(Error::Unauthorized);
        }
        let proposal = self.store.load_proposal_mut(proposal_id)?;
        if now < proposal.end_time {
            return Err(Error::VotingStillOpen);
        }
        if proposal.executed {
            return Err(Error::AlreadyExecuted);
        }
        proposal.executed = true;

        info!(proposal_id, "proposal executed");
        Ok(Event::ProposalExecuted { id: proposal_id })
    }

    /// `false` for unknown proposals.
    pub fn has_voted(&self, proposal_id: u64, wallet: &Address) -> bool {
        self.store.has_vote_record(proposal_id, wallet)
    }

    pub fn get_proposal(&self, proposal_id: u64) -> Result<Proposal> {
        self.store.load_proposal(proposal_id).cloned()
    }

    pub fn proposal_count(&self) -> u64 {
        self.store.proposal_count()
    }

    /// Wallets that voted on `proposal_id`, oldest first.
    pub fn voters(&self, proposal_id: u64) -> &[Address] {
        self.store.voters(proposal_id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.store.proposals()
    }
}
