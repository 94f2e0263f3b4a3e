//! # Storage
//!
//! Typed helpers over the governance ledger's in-memory tables.
//!
//! | Table            | Key              | Value          | Description                        |
//! |------------------|------------------|----------------|------------------------------------|
//! | `proposals`      | `u64`            | `Proposal`     | Every proposal ever created        |
//! | `vote_records`   | `(u64, Address)` | `()`           | Presence means "this wallet voted" |
//! | `voters`         | `u64`            | `Vec<Address>` | Vote order per proposal            |
//! | `proposal_count` | —                | `u64`          | Last id handed out                 |
//!
//! Rows are never deleted. A vote record, once written, is permanent for
//! its proposal.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::{Error, Result};
use crate::types::{Address, Proposal};

#[derive(Clone, Debug, Default)]
pub struct ProposalStore {
    proposal_count: u64,
    proposals: BTreeMap<u64, Proposal>,
    vote_records: HashSet<(u64, Address)>,
    voters: HashMap<u64, Vec<Address>>,
}

impl ProposalStore {
    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    /// Reserve the next proposal id (1, 2, 3, ...).
    pub fn next_proposal_id(&self) -> Result<u64> {
        self.proposal_count.checked_add(1).ok_or(Error::ArithmeticOverflow)
    }

    /// Store a freshly created proposal and advance the counter to its id.
    pub fn insert_proposal(&mut self, proposal: Proposal) {
        self.proposal_count = proposal.id;
        self.proposals.insert(proposal.id, proposal);
    }

    pub fn load_proposal(&self, id: u64) -> Result<&Proposal> {
        self.proposals.get(&id).ok_or(Error::NotFound)
    }

    pub fn load_proposal_mut(&mut self, id: u64) -> Result<&mut Proposal> {
        self.proposals.get_mut(&id).ok_or(Error::NotFound)
    }

    pub fn has_vote_record(&self, id: u64, wallet: &Address) -> bool {
        self.vote_records.contains(&(id, wallet.clone()))
    }

    pub fn save_vote_record(&mut self, id: u64, wallet: &Address) {
        if self.vote_records.insert((id, wallet.clone())) {
            self.voters.entry(id).or_default().push(wallet.clone());
        }
    }

    pub fn voters(&self, id: u64) -> &[Address] {
        self.voters.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }
}
