use proptest::prelude::*;

use crate::invariants::{
    assert_curve_monotonic, assert_price_above_floor, assert_purchase_invariant,
    assert_tokens_sold_monotonic,
};
use crate::pricing::{curve_price, current_price, quote_payment_required};
use crate::{
    Address, CurveParameters, Error, FixedPoint, MemoryHost, MockPriceFeed, OracleReading,
    PriceFeed, PurchaseOrder, ReachToken,
};

fn fp(s: &str) -> FixedPoint {
    s.parse().unwrap()
}

fn launch_params() -> CurveParameters {
    CurveParameters {
        base_price: fp("27"),
        bonding_constant: fp("0.001"),
        floor_price: fp("27"),
    }
}

fn eth_at_2000() -> MockPriceFeed {
    MockPriceFeed::usd(2_000)
}

fn reading() -> OracleReading {
    eth_at_2000().current_oracle_reading()
}

fn setup() -> (ReachToken<MemoryHost>, Address) {
    let owner = Address::from("owner");
    let token = ReachToken::new(MemoryHost::new(owner.clone()), launch_params());
    (token, owner)
}

fn order(tokens: &str, payment: FixedPoint) -> PurchaseOrder {
    PurchaseOrder {
        token_amount: fp(tokens),
        payment_sent: payment,
        min_tokens_out: FixedPoint::ZERO,
    }
}

#[test]
fn test_default_parameters_match_launch() {
    assert_eq!(CurveParameters::default(), launch_params());
}

#[test]
fn test_curve_price_at_zero_is_base_price() {
    assert_eq!(curve_price(FixedPoint::ZERO, &launch_params()).unwrap(), fp("27"));
}

#[test]
fn test_curve_price_is_quadratic() {
    // 27 + 0.001 * 100^2 = 37
    assert_eq!(curve_price(fp("100"), &launch_params()).unwrap(), fp("37"));
    // 27 + 0.001 * 1000^2 = 1027
    assert_eq!(curve_price(fp("1000"), &launch_params()).unwrap(), fp("1027"));
}

#[test]
fn test_floor_applies_when_above_curve() {
    let params = CurveParameters {
        base_price: fp("10"),
        bonding_constant: fp("0.001"),
        floor_price: fp("27"),
    };
    assert_eq!(current_price(fp("100"), &params, &reading()).unwrap(), fp("27"));
    assert_eq!(current_price(fp("200"), &params, &reading()).unwrap(), fp("50"));
}

#[test]
fn test_oracle_reading_does_not_move_price() {
    let cheap = MockPriceFeed::usd(1).current_oracle_reading();
    let dear = MockPriceFeed::usd(100_000).current_oracle_reading();
    let params = launch_params();
    assert_eq!(
        current_price(fp("100"), &params, &cheap).unwrap(),
        current_price(fp("100"), &params, &dear).unwrap()
    );
}

#[test]
fn test_quote_converts_usd_to_payment_currency() {
    // 10 tokens at $27 = $270; at $2000/ETH that is 0.135 ETH.
    let quoted = quote_payment_required(fp("10"), FixedPoint::ZERO, &launch_params(), &reading(), fp("2000"));
    assert_eq!(quoted.unwrap(), fp("0.135"));
}

#[test]
fn test_quote_rejects_zero_amount_and_zero_rate() {
    let params = launch_params();
    assert_eq!(
        quote_payment_required(FixedPoint::ZERO, FixedPoint::ZERO, &params, &reading(), fp("2000")),
        Err(Error::InvalidAmount)
    );
    assert_eq!(
        quote_payment_required(fp("1"), FixedPoint::ZERO, &params, &reading(), FixedPoint::ZERO),
        Err(Error::InvalidAmount)
    );
}

#[test]
fn test_curve_overflow_is_reported() {
    let params = CurveParameters {
        base_price: fp("27"),
        bonding_constant: fp("1000000"),
        floor_price: fp("27"),
    };
    assert_eq!(curve_price(fp("1000000000"), &params), Err(Error::ArithmeticOverflow));
}

#[test]
fn test_buy_tokens_updates_sale_state() {
    let (mut token, _) = setup();
    let buyer = Address::from("buyer");
    let feed = eth_at_2000();

    let required = token.quote_payment(fp("1"), &feed).unwrap();
    assert_eq!(required, fp("0.0135"));

    let sent = required.mul_bps(11_000).unwrap();
    let receipt = token.buy_tokens(&buyer, order("1", sent), &feed).unwrap();

    assert_eq!(receipt.tokens_issued, fp("1"));
    assert_eq!(receipt.price_per_token, fp("27"));
    assert_eq!(receipt.payment_required, required);
    assert_eq!(receipt.refund, sent.checked_sub(required).unwrap());
    assert_eq!(receipt.reserve_share, sent.mul_bps(1_000).unwrap());
    assert_eq!(receipt.tokens_sold_after, fp("1"));
    assert_purchase_invariant(FixedPoint::ZERO, token.tokens_sold(), fp("1"));
}

#[test]
fn test_purchase_priced_before_increment() {
    let (mut token, _) = setup();
    let buyer = Address::from("buyer");
    let feed = OracleReading {
        price: fp("1"),
        timestamp: 0,
    };

    // 100 tokens bought at once cost 100 * $27 even though the curve ends at $37.
    let receipt = token.buy_tokens(&buyer, order("100", fp("2700")), &feed).unwrap();
    assert_eq!(receipt.payment_required, fp("2700"));
    assert_eq!(receipt.refund, FixedPoint::ZERO);
    assert_eq!(token.curve_price().unwrap(), fp("37"));

    let next = token.quote_payment(fp("1"), &feed).unwrap();
    assert_eq!(next, fp("37"));
}

#[test]
fn test_insufficient_payment_leaves_state_unchanged() {
    let (mut token, _) = setup();
    let buyer = Address::from("buyer");
    let feed = eth_at_2000();

    let required = token.quote_payment(fp("5"), &feed).unwrap();
    let short = required.checked_sub(FixedPoint::from_raw(1)).unwrap();

    assert_eq!(
        token.buy_tokens(&buyer, order("5", short), &feed),
        Err(Error::InsufficientPayment)
    );
    assert_eq!(token.tokens_sold(), FixedPoint::ZERO);
    assert!(token.events().all().is_empty());
}

#[test]
fn test_zero_amount_purchase_rejected() {
    let (mut token, _) = setup();
    assert_eq!(
        token.buy_tokens(&Address::from("buyer"), order("0", fp("1")), &eth_at_2000()),
        Err(Error::InvalidAmount)
    );
}

#[test]
fn test_slippage_guard() {
    let (mut token, _) = setup();
    let mut guarded = order("1", fp("1"));
    guarded.min_tokens_out = fp("2");

    assert_eq!(
        token.buy_tokens(&Address::from("buyer"), guarded, &eth_at_2000()),
        Err(Error::SlippageExceeded)
    );
    assert_eq!(token.tokens_sold(), FixedPoint::ZERO);
}

#[test]
fn test_paused_purchase_rejected_then_resumes() {
    let (mut token, owner) = setup();
    let buyer = Address::from("buyer");
    let feed = eth_at_2000();

    token.pause(&owner).unwrap();
    assert_eq!(token.buy_tokens(&buyer, order("1", fp("1")), &feed), Err(Error::Paused));
    assert_eq!(token.tokens_sold(), FixedPoint::ZERO);

    token.unpause(&owner).unwrap();
    assert!(token.buy_tokens(&buyer, order("1", fp("1")), &feed).is_ok());
}

#[test]
fn test_pause_checked_before_amount() {
    let (mut token, owner) = setup();
    token.pause(&owner).unwrap();
    assert_eq!(
        token.buy_tokens(&Address::from("buyer"), order("0", fp("1")), &eth_at_2000()),
        Err(Error::Paused)
    );
}

#[test]
fn test_only_owner_updates_parameters() {
    let (mut token, owner) = setup();
    let new_params = CurveParameters {
        base_price: fp("30"),
        bonding_constant: fp("0.002"),
        floor_price: fp("30"),
    };

    assert_eq!(
        token.update_price_parameters(&Address::from("buyer"), new_params),
        Err(Error::Unauthorized)
    );
    assert_eq!(*token.parameters(), launch_params());

    token.update_price_parameters(&owner, new_params).unwrap();
    assert_eq!(*token.parameters(), new_params);
}

#[test]
fn test_parameters_accept_floor_below_base() {
    let (mut token, owner) = setup();
    let inverted = CurveParameters {
        base_price: fp("30"),
        bonding_constant: FixedPoint::ZERO,
        floor_price: fp("1"),
    };
    token.update_price_parameters(&owner, inverted).unwrap();
    assert_eq!(token.current_price(&eth_at_2000()).unwrap(), fp("30"));
}

#[test]
fn test_contract_info_snapshot() {
    let (mut token, owner) = setup();
    token.create_proposal(&owner, "first", 0).unwrap();
    let info = token.contract_info(&eth_at_2000()).unwrap();
    assert_eq!(info.current_price, fp("27"));
    assert_eq!(info.tokens_sold, FixedPoint::ZERO);
    assert_eq!(info.parameters, launch_params());
    assert_eq!(info.proposal_count, 1);
    assert!(!info.paused);
}

fn arb_params() -> impl Strategy<Value = CurveParameters> {
    (0u128..1_000_000, 0u128..1_000_000, 0u128..1_000_000).prop_map(|(base, k, floor)| CurveParameters {
        base_price: FixedPoint::from_raw(base * 1_000_000_000_000),
        bonding_constant: FixedPoint::from_raw(k * 1_000),
        floor_price: FixedPoint::from_raw(floor * 1_000_000_000_000),
    })
}

fn arb_sold() -> impl Strategy<Value = FixedPoint> {
    (0u128..1_000_000_000).prop_map(|units| FixedPoint::from_raw(units * 1_000_000_000_000_000))
}

proptest! {
    #[test]
    fn current_price_never_below_floor(params in arb_params(), sold in arb_sold()) {
        let price = current_price(sold, &params, &reading()).unwrap();
        assert_price_above_floor(price, &params);
    }

    #[test]
    fn curve_is_monotonic(params in arb_params(), a in arb_sold(), b in arb_sold()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let price_lo = curve_price(lo, &params).unwrap();
        let price_hi = curve_price(hi, &params).unwrap();
        assert_curve_monotonic(lo, price_lo, hi, price_hi);
    }

    #[test]
    fn purchases_grow_tokens_sold_exactly(amounts in proptest::collection::vec(1u128..1_000, 1..8)) {
        let (mut token, _) = setup();
        let buyer = Address::from("buyer");
        let feed = eth_at_2000();
        for units in amounts {
            let amount = FixedPoint::from_int(units).unwrap();
            let before = token.tokens_sold();
            let required = token.quote_payment(amount, &feed).unwrap();
            let purchase = PurchaseOrder {
                token_amount: amount,
                payment_sent: required,
                min_tokens_out: amount,
            };
            token.buy_tokens(&buyer, purchase, &feed).unwrap();
            assert_tokens_sold_monotonic(before, token.tokens_sold());
            assert_purchase_invariant(before, token.tokens_sold(), amount);
        }
    }
}
