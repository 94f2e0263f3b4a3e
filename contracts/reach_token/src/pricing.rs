//! # Pricing engine
//!
//! Quadratic bonding curve bounded below by a floor price:
//!
//! ```text
//! curve(sold)   = base_price + bonding_constant * sold^2
//! current(sold) = max(curve(sold), floor_price)
//! payment(n)    = current(sold) * n / usd_rate
//! ```
//!
//! Prices are USD per token; `usd_rate` is USD per unit of the payment
//! currency, taken from the oracle. A purchase is quoted at the price
//! *before* the purchase, so buying `n` tokens at once costs the same per
//! token as the first of them.

use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::events::Event;
use crate::fixed::FixedPoint;
use crate::host::Host;
use crate::types::{Address, CurveParameters, OracleReading, PurchaseReceipt, SaleState};

/// Share of every payment earmarked for the buyback reserve (10%).
pub const BUYBACK_RESERVE_BPS: u128 = 1_000;

/// Raw curve price at `tokens_sold`, ignoring the floor.
pub fn curve_price(tokens_sold: FixedPoint, params: &CurveParameters) -> Result<FixedPoint> {
    let squared = tokens_sold.checked_mul(tokens_sold)?;
    let premium = params.bonding_constant.checked_mul(squared)?;
    params.base_price.checked_add(premium)
}

/// Per-token price: the larger of the curve price and the floor.
///
/// The oracle reading does not move the token price; it is accepted so that
/// callers already pass it once blending is introduced.
pub fn current_price(
    tokens_sold: FixedPoint,
    params: &CurveParameters,
    _reading: &OracleReading,
) -> Result<FixedPoint> {
    Ok(curve_price(tokens_sold, params)?.max(params.floor_price))
}

/// Price and payment for `token_amount` tokens at the current sale position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    pub price_per_token: FixedPoint,
    pub payment_required: FixedPoint,
}

pub fn quote(
    token_amount: FixedPoint,
    tokens_sold: FixedPoint,
    params: &CurveParameters,
    reading: &OracleReading,
    usd_rate: FixedPoint,
) -> Result<Quote> {
    if token_amount.is_zero() || usd_rate.is_zero() {
        return Err(Error::InvalidAmount);
    }
    let price_per_token = current_price(tokens_sold, params, reading)?;
    let total_usd = price_per_token.checked_mul(token_amount)?;
    let payment_required = total_usd.checked_div(usd_rate)?;
    Ok(Quote {
        price_per_token,
        payment_required,
    })
}

/// Payment-currency cost of `token_amount` tokens.
pub fn quote_payment_required(
    token_amount: FixedPoint,
    tokens_sold: FixedPoint,
    params: &CurveParameters,
    reading: &OracleReading,
    usd_rate: FixedPoint,
) -> Result<FixedPoint> {
    quote(token_amount, tokens_sold, params, reading, usd_rate).map(|q| q.payment_required)
}

/// Buyer-supplied purchase request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PurchaseOrder {
    pub token_amount: FixedPoint,
    pub payment_sent: FixedPoint,
    /// Reject the purchase if fewer tokens than this would be issued.
    pub min_tokens_out: FixedPoint,
}

/// Sale counter and curve parameters, mutated only through purchases and
/// owner parameter updates.
#[derive(Clone, Debug, Default)]
pub struct PricingEngine {
    params: CurveParameters,
    sale: SaleState,
}

impl PricingEngine {
    pub fn new(params: CurveParameters) -> Self {
        PricingEngine {
            params,
            sale: SaleState::default(),
        }
    }

    pub fn params(&self) -> &CurveParameters {
        &self.params
    }

    pub fn tokens_sold(&self) -> FixedPoint {
        self.sale.tokens_sold
    }

    pub fn curve_price(&self) -> Result<FixedPoint> {
        curve_price(self.sale.tokens_sold, &self.params)
    }

    pub fn current_price(&self, reading: &OracleReading) -> Result<FixedPoint> {
        current_price(self.sale.tokens_sold, &self.params, reading)
    }

    pub fn quote(&self, token_amount: FixedPoint, reading: &OracleReading, usd_rate: FixedPoint) -> Result<Quote> {
        quote(token_amount, self.sale.tokens_sold, &self.params, reading, usd_rate)
    }

    /// Sell `order.token_amount` tokens to `buyer`.
    ///
    /// Every check runs before `tokens_sold` is touched, so a rejected
    /// purchase leaves the engine unchanged.
    pub fn execute_purchase<H: Host>(
        &mut self,
        host: &H,
        buyer: &Address,
        order: PurchaseOrder,
        reading: &OracleReading,
        usd_rate: FixedPoint,
    ) -> Result<(PurchaseReceipt, Event)> {
        if host.is_paused() {
            return Err(Error::Paused);
        }
        if order.token_amount.is_zero() {
            return Err(Error::InvalidAmount);
        }

        let quote = self.quote(order.token_amount, reading, usd_rate)?;
        if order.payment_sent < quote.payment_required {
            debug!(
                %buyer,
                sent = %order.payment_sent,
                required = %quote.payment_required,
                "purchase rejected: insufficient payment"
            );
            return Err(Error::InsufficientPayment);
        }
        if order.token_amount < order.min_tokens_out {
            return Err(Error::SlippageExceeded);
        }

        let tokens_sold_after = self.sale.tokens_sold.checked_add(order.token_amount)?;
        let reserve_share = order.payment_sent.mul_bps(BUYBACK_RESERVE_BPS)?;
        let refund = order.payment_sent.checked_sub(quote.payment_required)?;

        self.sale.tokens_sold = tokens_sold_after;

        info!(
            %buyer,
            tokens = %order.token_amount,
            payment = %quote.payment_required,
            tokens_sold = %tokens_sold_after,
            "purchase executed"
        );

        let receipt = PurchaseReceipt {
            tokens_issued: order.token_amount,
            price_per_token: quote.price_per_token,
            payment_required: quote.payment_required,
            refund,
            reserve_share,
            tokens_sold_after,
        };
        let event = Event::PurchaseExecuted {
            buyer: buyer.clone(),
            token_amount: order.token_amount,
            payment_amount: quote.payment_required,
        };
        Ok((receipt, event))
    }

    /// Replace the curve parameters. No relationship between the fields is
    /// enforced; a floor below the base price is accepted.
    pub fn update_parameters(&mut self, new_params: CurveParameters, caller_is_owner: bool) -> Result<Event> {
        if !caller_is_owner {
            return Err(Error::Unauthorized);
        }
        self.params = new_params;
        info!(
            base = %new_params.base_price,
            k = %new_params.bonding_constant,
            floor = %new_params.floor_price,
            "price parameters updated"
        );
        Ok(Event::ParametersUpdated { params: new_params })
    }
}
