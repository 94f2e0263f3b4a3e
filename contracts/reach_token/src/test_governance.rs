use proptest::prelude::*;

use crate::invariants::{
    assert_one_vote_per_wallet, assert_proposal_immutable_fields, assert_sequential_ids,
    assert_vote_count_monotonic,
};
use crate::{
    Address, CurveParameters, Error, FixedPoint, Host, MemoryHost, ProposalStatus, ReachToken,
    VOTING_PERIOD,
};

const T0: u64 = 1_700_000_000;

fn tokens(units: u128) -> FixedPoint {
    FixedPoint::from_int(units).unwrap()
}

fn setup() -> (ReachToken<MemoryHost>, Address) {
    let owner = Address::from("owner");
    let token = ReachToken::new(MemoryHost::new(owner.clone()), CurveParameters::default());
    (token, owner)
}

/// Owner plus three voters holding 100 tokens each.
fn setup_with_voters() -> (ReachToken<MemoryHost>, Address, [Address; 3]) {
    let (mut token, owner) = setup();
    let voters = [Address::from("voter1"), Address::from("voter2"), Address::from("voter3")];
    for voter in &voters {
        token.host_mut().set_balance(voter.clone(), tokens(100));
    }
    (token, owner, voters)
}

#[test]
fn test_initial_governance_state() {
    let (token, _) = setup();
    assert_eq!(token.proposal_count(), 0);
    assert_eq!(VOTING_PERIOD, 604_800);
}

#[test]
fn test_owner_creates_proposal() {
    let (mut token, owner) = setup();
    let id = token.create_proposal(&owner, "Test Proposal 1", T0).unwrap();

    assert_eq!(id, 1);
    assert_eq!(token.proposal_count(), 1);

    let proposal = token.get_proposal(1).unwrap();
    assert_eq!(proposal.id, 1);
    assert_eq!(proposal.description, "Test Proposal 1");
    assert_eq!(proposal.vote_count, 0);
    assert_eq!(proposal.end_time, T0 + VOTING_PERIOD);
    assert!(!proposal.executed);
}

#[test]
fn test_non_owner_cannot_create_proposal() {
    let (mut token, _, [voter1, _, _]) = setup_with_voters();
    assert_eq!(
        token.create_proposal(&voter1, "Unauthorized Proposal", T0),
        Err(Error::Unauthorized)
    );
    assert_eq!(token.proposal_count(), 0);
}

#[test]
fn test_empty_description_accepted() {
    let (mut token, owner) = setup();
    let id = token.create_proposal(&owner, "", T0).unwrap();
    assert_eq!(token.get_proposal(id).unwrap().description, "");
}

#[test]
fn test_one_vote_per_wallet_regardless_of_balance() {
    let (mut token, owner) = setup();
    let whale = Address::from("whale");
    let minnow = Address::from("minnow");
    token.host_mut().set_balance(whale.clone(), tokens(10_000));
    token.host_mut().set_balance(minnow.clone(), tokens(1));

    let id = token.create_proposal(&owner, "Test Equal Voting", T0).unwrap();
    assert_eq!(token.vote(&whale, id, T0 + 1), Ok(1));
    assert_eq!(token.vote(&minnow, id, T0 + 2), Ok(2));

    let proposal = token.get_proposal(id).unwrap();
    assert_one_vote_per_wallet(&proposal, 2);
    assert!(token.has_voted(id, &whale));
    assert!(token.has_voted(id, &minnow));
    assert!(!token.has_voted(id, &Address::from("voter3")));
}

#[test]
fn test_dust_balance_is_eligible() {
    let (mut token, owner) = setup();
    let dust = Address::from("dust");
    token.host_mut().set_balance(dust.clone(), FixedPoint::from_raw(1));

    let id = token.create_proposal(&owner, "dust", T0).unwrap();
    assert_eq!(token.vote(&dust, id, T0), Ok(1));
}

#[test]
fn test_double_vote_rejected() {
    let (mut token, owner, [voter1, _, _]) = setup_with_voters();
    let id = token.create_proposal(&owner, "Test Double Vote Prevention", T0).unwrap();

    token.vote(&voter1, id, T0).unwrap();
    assert_eq!(token.vote(&voter1, id, T0 + 10), Err(Error::AlreadyVoted));
    assert_eq!(token.get_proposal(id).unwrap().vote_count, 1);
}

#[test]
fn test_vote_requires_tokens() {
    let (mut token, owner) = setup();
    let id = token.create_proposal(&owner, "Test Token Requirement", T0).unwrap();
    assert_eq!(token.vote(&Address::from("empty"), id, T0), Err(Error::Unauthorized));
}

#[test]
fn test_eligibility_checked_before_existence_and_expiry() {
    let (mut token, owner) = setup();
    let empty = Address::from("empty");
    assert_eq!(token.vote(&empty, 999, T0), Err(Error::Unauthorized));

    let id = token.create_proposal(&owner, "closed", T0).unwrap();
    assert_eq!(token.vote(&empty, id, T0 + VOTING_PERIOD * 2), Err(Error::Unauthorized));
}

#[test]
fn test_voting_window_boundary() {
    let (mut token, owner, [voter1, voter2, _]) = setup_with_voters();
    let id = token.create_proposal(&owner, "Test Expiry", T0).unwrap();

    assert_eq!(token.vote(&voter1, id, T0 + VOTING_PERIOD - 1), Ok(1));
    assert_eq!(token.vote(&voter2, id, T0 + VOTING_PERIOD), Err(Error::VotingClosed));

    let proposal = token.get_proposal(id).unwrap();
    assert_eq!(proposal.status(T0 + VOTING_PERIOD - 1), ProposalStatus::Open);
    assert_eq!(proposal.status(T0 + VOTING_PERIOD), ProposalStatus::Closed);
}

#[test]
fn test_multiple_proposals() {
    let (mut token, owner, [voter1, voter2, _]) = setup_with_voters();
    let first = token.create_proposal(&owner, "Proposal 1", T0).unwrap();
    let second = token.create_proposal(&owner, "Proposal 2", T0).unwrap();
    assert_eq!(token.proposal_count(), 2);

    token.vote(&voter1, first, T0).unwrap();
    token.vote(&voter1, second, T0).unwrap();
    token.vote(&voter2, first, T0).unwrap();

    assert_eq!(token.get_proposal(first).unwrap().vote_count, 2);
    assert_eq!(token.get_proposal(second).unwrap().vote_count, 1);
    assert_eq!(token.governance().voters(first), &[voter1.clone(), voter2.clone()]);

    let all: Vec<_> = token.governance().proposals().cloned().collect();
    assert_sequential_ids(&all);
}

#[test]
fn test_unknown_proposal() {
    let (mut token, _, [voter1, _, _]) = setup_with_voters();
    assert_eq!(token.vote(&voter1, 999, T0), Err(Error::NotFound));
    assert_eq!(token.get_proposal(999), Err(Error::NotFound));
    assert!(!token.has_voted(999, &voter1));
}

#[test]
fn test_pause_blocks_voting() {
    let (mut token, owner, [voter1, _, _]) = setup_with_voters();
    let id = token.create_proposal(&owner, "Test Pause Respect", T0).unwrap();

    token.pause(&owner).unwrap();
    assert!(token.host().is_paused());
    assert_eq!(token.vote(&voter1, id, T0), Err(Error::Paused));
    assert!(!token.has_voted(id, &voter1));

    token.unpause(&owner).unwrap();
    assert_eq!(token.vote(&voter1, id, T0), Ok(1));
}

#[test]
fn test_execute_after_close_only_once() {
    let (mut token, owner, [voter1, _, _]) = setup_with_voters();
    let id = token.create_proposal(&owner, "Execute me", T0).unwrap();
    token.vote(&voter1, id, T0).unwrap();
    let created = token.get_proposal(id).unwrap();

    assert_eq!(token.execute_proposal(&owner, id, T0 + 1), Err(Error::VotingStillOpen));
    assert_eq!(
        token.execute_proposal(&voter1, id, T0 + VOTING_PERIOD),
        Err(Error::Unauthorized)
    );
    assert_eq!(token.execute_proposal(&owner, 42, T0 + VOTING_PERIOD), Err(Error::NotFound));

    token.execute_proposal(&owner, id, T0 + VOTING_PERIOD).unwrap();
    let executed = token.get_proposal(id).unwrap();
    assert!(executed.executed);
    assert_proposal_immutable_fields(&created, &executed);
    assert_eq!(executed.vote_count, 1);

    assert_eq!(
        token.execute_proposal(&owner, id, T0 + VOTING_PERIOD + 1),
        Err(Error::AlreadyExecuted)
    );
}

proptest! {
    #[test]
    fn vote_count_equals_distinct_voters(balances in proptest::collection::vec(1u128..u64::MAX as u128, 1..20)) {
        let (mut token, owner) = setup();
        let id = token.create_proposal(&owner, "weights", T0).unwrap();
        for (i, balance) in balances.iter().enumerate() {
            let wallet = Address::new(format!("wallet-{i}"));
            token.host_mut().set_balance(wallet.clone(), FixedPoint::from_raw(*balance));
            let before = token.get_proposal(id).unwrap().vote_count;
            token.vote(&wallet, id, T0).unwrap();
            assert_vote_count_monotonic(before, token.get_proposal(id).unwrap().vote_count);
        }
        assert_one_vote_per_wallet(&token.get_proposal(id).unwrap(), balances.len());
    }

    #[test]
    fn second_vote_always_fails(balance in 1u128..1_000_000, offset in 0u64..VOTING_PERIOD) {
        let (mut token, owner) = setup();
        let wallet = Address::from("voter");
        token.host_mut().set_balance(wallet.clone(), FixedPoint::from_raw(balance));
        let id = token.create_proposal(&owner, "retry", T0).unwrap();

        token.vote(&wallet, id, T0).unwrap();
        prop_assert_eq!(token.vote(&wallet, id, T0 + offset), Err(Error::AlreadyVoted));
        prop_assert_eq!(token.get_proposal(id).unwrap().vote_count, 1);
    }

    #[test]
    fn zero_balance_never_votes(now_offset in 0u64..VOTING_PERIOD * 3, proposal_id in 0u64..4, paused in any::<bool>()) {
        let (mut token, owner) = setup();
        token.create_proposal(&owner, "a", T0).unwrap();
        token.create_proposal(&owner, "b", T0).unwrap();
        if paused {
            token.pause(&owner).unwrap();
        }
        let expected = if paused { Error::Paused } else { Error::Unauthorized };
        prop_assert_eq!(token.vote(&Address::from("nobody"), proposal_id, T0 + now_offset), Err(expected));
    }
}
