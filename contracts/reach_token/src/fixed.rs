//! # Fixed-point arithmetic
//!
//! Every price, token quantity and payment amount in the engine is a
//! [`FixedPoint`]: an unsigned `u128` scaled by [`SCALE`] (`10^18`), the same
//! "wei" convention the token's ledger uses.
//!
//! ## Rescaling
//!
//! | Operation | Raw computation                    |
//! |-----------|------------------------------------|
//! | `a * b`   | `a.raw * b.raw / SCALE`            |
//! | `a / b`   | `a.raw * SCALE / b.raw`            |
//!
//! Both products are formed in a 256-bit intermediate, so only a result that
//! itself exceeds `u128::MAX` fails with [`Error::ArithmeticOverflow`].
//! Division rounds toward zero.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Error, Result};

/// Number of fractional decimal digits carried by [`FixedPoint`].
pub const DECIMALS: u32 = 18;

/// Canonical scale factor (`10^18`).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Unsigned decimal value with 18 fractional digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedPoint(u128);

impl FixedPoint {
    pub const ZERO: FixedPoint = FixedPoint(0);
    pub const ONE: FixedPoint = FixedPoint(SCALE);

    /// Wrap an already-scaled raw value.
    pub const fn from_raw(raw: u128) -> Self {
        FixedPoint(raw)
    }

    /// The scaled raw value.
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Whole-unit constructor (`from_int(27)` is `27.0`).
    pub fn from_int(units: u128) -> Result<Self> {
        units
            .checked_mul(SCALE)
            .map(FixedPoint)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// Lift a value carrying `decimals` fractional digits into the canonical
    /// scale, e.g. an 8-decimal price-feed answer. Digits beyond 18 are
    /// truncated.
    pub fn from_scaled(raw: u128, decimals: u32) -> Result<Self> {
        if decimals <= DECIMALS {
            let factor = pow10(DECIMALS - decimals)?;
            raw.checked_mul(factor)
                .map(FixedPoint)
                .ok_or(Error::ArithmeticOverflow)
        } else {
            let factor = pow10(decimals - DECIMALS)?;
            Ok(FixedPoint(raw / factor))
        }
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(FixedPoint)
            .ok_or(Error::ArithmeticOverflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(FixedPoint)
            .ok_or(Error::ArithmeticOverflow)
    }

    /// `self * rhs`, rescaled by one factor of [`SCALE`].
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        mul_div_floor(self.0, rhs.0, SCALE).map(FixedPoint)
    }

    /// `self / rhs`. A zero divisor is reported as an overflow.
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        mul_div_floor(self.0, SCALE, rhs.0).map(FixedPoint)
    }

    /// `self * bps / 10_000`.
    pub fn mul_bps(self, bps: u128) -> Result<Self> {
        mul_div_floor(self.0, bps, BPS_DENOMINATOR).map(FixedPoint)
    }
}

fn pow10(exp: u32) -> Result<u128> {
    10u128.checked_pow(exp).ok_or(Error::ArithmeticOverflow)
}

// ── 256-bit helpers ──────────────────────────────────────────────────

const LOW_MASK: u128 = u64::MAX as u128;

/// Full product of two `u128` values as `(high, low)` halves.
fn mul_wide(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LOW_MASK);
    let (b1, b0) = (b >> 64, b & LOW_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    let mid = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
    let low = (p00 & LOW_MASK) | ((mid & LOW_MASK) << 64);
    let high = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (high, low)
}

/// `floor(a * b / denom)` without intermediate overflow.
pub(crate) fn mul_div_floor(a: u128, b: u128, denom: u128) -> Result<u128> {
    if denom == 0 {
        return Err(Error::ArithmeticOverflow);
    }
    if a == 0 || b == 0 {
        return Ok(0);
    }

    let (high, low) = mul_wide(a, b);
    if high == 0 {
        return Ok(low / denom);
    }
    // Quotient would not fit in 128 bits.
    if high >= denom {
        return Err(Error::ArithmeticOverflow);
    }

    // Restoring long division of (high:low) by denom; `rem < denom` holds
    // on entry to every iteration.
    let mut rem = high;
    let mut quotient = 0u128;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((low >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= denom {
            rem = rem.wrapping_sub(denom);
            quotient |= 1;
        }
    }
    Ok(quotient)
}

// ── Text form ────────────────────────────────────────────────────────

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for FixedPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty())
            || !all_digits(whole)
            || !all_digits(frac)
            || frac.len() > DECIMALS as usize
        {
            return Err(Error::InvalidAmount);
        }

        let whole_units: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| Error::InvalidAmount)?
        };
        let frac_raw: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<18}");
            padded.parse().map_err(|_| Error::InvalidAmount)?
        };

        FixedPoint::from_int(whole_units)?.checked_add(FixedPoint(frac_raw))
    }
}

impl Serialize for FixedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
