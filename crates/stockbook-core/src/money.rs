//! # Money Module
//!
//! Provides the `Money` type for monetary values and the `Margin` type for
//! pricing percentages.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A spreadsheet happily stores:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing investment over hundreds of rows drifts by fractions of a     │
//! │  cent, and the balance metric stops reading as exactly zero at         │
//! │  break-even.                                                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Floats only exist at the sheet boundary (`from_major_f64`) and are  │
//! │    rounded to the nearest cent right there.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::{Margin, Money};
//!
//! let cost = Money::from_cents(1000); // 10.00
//! let price = Margin::from_bps(5000).apply_markup(cost); // 50% markup
//! assert_eq!(price.cents(), 1500);
//!
//! let margin = Margin::from_prices(Money::from_cents(2000), Money::from_cents(2500));
//! assert_eq!(margin.bps(), 2000); // 20.00%
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Divides with round-half-away-from-zero. `d` must be positive.
fn div_round(n: i128, d: i128) -> i128 {
    debug_assert!(d > 0);
    if n >= 0 {
        (n + d / 2) / d
    } else {
        (n - d / 2) / d
    }
}

/// Clamps a wide intermediate into the i64 range.
fn saturate(n: i128) -> i64 {
    n.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Parses a decimal string with `.` or `,` as separator into an integer
/// scaled by `10^scale`, rounding extra digits half away from zero.
fn parse_scaled(input: &str, scale: u32, field: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not a decimal number", input.trim()),
    };

    let s = input.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if s.is_empty() {
        return Err(invalid());
    }

    let (int_part, frac_part) = match s.find(['.', ',']) {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let int_value: i128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| invalid())?
    };

    let unit = 10i128.pow(scale);
    let mut frac_value: i128 = 0;
    for (i, c) in frac_part.chars().enumerate() {
        let digit = (c as u8 - b'0') as i128;
        if (i as u32) < scale {
            frac_value += digit * 10i128.pow(scale - 1 - i as u32);
        } else {
            // First dropped digit decides the rounding
            if digit >= 5 {
                frac_value += 1;
            }
            break;
        }
    }

    let magnitude = int_value
        .checked_mul(unit)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(invalid)?;
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| invalid())
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: profits and balances go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a floating-point amount read from a sheet cell.
    ///
    /// Rounds to the nearest cent. Returns `None` for NaN or infinities.
    pub fn from_major_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the amount in major units as a float, for sheet cells only.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated towards zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a unit count.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let unit_cost = Money::from_cents(299);
    /// assert_eq!(unit_cost.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Adds, pinning at the i64 bounds instead of overflowing.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    #[inline]
    pub const fn saturating_sub(self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0))
    }

    /// Multiplies by a quantity, pinning at the i64 bounds.
    ///
    /// Totals over sheet data go through this; the operators stay unchecked.
    #[inline]
    pub const fn saturating_mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Divides the amount evenly over `count`, rounding half away from zero.
    ///
    /// A zero count yields zero rather than a division fault; the average
    /// ticket of an empty journal is defined as 0.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1000).average_over(3).cents(), 333);
    /// assert_eq!(Money::from_cents(1000).average_over(0), Money::zero());
    /// ```
    pub fn average_over(&self, count: usize) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(div_round(self.0 as i128, count as i128) as i64)
    }

    /// Percentage of `self` relative to `whole`, in basis points.
    ///
    /// Returns 0 when `whole` is not positive.
    pub fn ratio_bps(&self, whole: Money) -> i64 {
        if !whole.is_positive() {
            return 0;
        }
        saturate(div_round(self.0 as i128 * 10_000, whole.0 as i128))
    }
}

/// Parses user input such as `10`, `10.5`, or `10,50`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_scaled(s, 2, "amount").map(Money)
    }
}

/// Plain two-decimal rendering; the front end adds the currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Margin
// =============================================================================

/// A pricing margin in signed basis points.
///
/// ## Two Directions
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  By margin:  sale_price = cost × (1 + margin/100)    (markup on cost)   │
/// │  By price:   margin = (price − cost) / price × 100   (share of price)   │
/// │                                                                         │
/// │  cost 10.00, margin 50%  ──► price 15.00                               │
/// │  cost 20.00, price 25.00 ──► margin 20%                                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
/// The two formulas are not inverses of each other. Both are kept exactly as
/// the dashboards always computed them.
///
/// 1 basis point = 0.01%, so `5000` is 50.00%. Negative values describe a
/// price below cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Margin(i64);

impl Margin {
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Margin(bps)
    }

    /// Creates a margin from a percentage, rounded to the nearest basis point.
    pub fn from_percentage(pct: f64) -> Self {
        Margin((pct * 100.0).round() as i64)
    }

    /// Derives the margin of a manually entered price.
    ///
    /// `(price - cost) / price * 100`, or zero when `price <= 0`.
    pub fn from_prices(cost: Money, price: Money) -> Self {
        if !price.is_positive() {
            return Margin::zero();
        }
        let diff = (price - cost).cents() as i128;
        Margin(div_round(diff * 10_000, price.cents() as i128) as i64)
    }

    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Returns the margin as a percentage (display and sheet cells only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Margin(0)
    }

    /// Applies the margin as a markup on `cost`: `cost * (1 + margin/100)`.
    pub fn apply_markup(&self, cost: Money) -> Money {
        let cents = cost.cents() as i128 * (10_000 + self.0 as i128);
        Money::from_cents(saturate(div_round(cents, 10_000)))
    }
}

impl Default for Margin {
    fn default() -> Self {
        Margin::zero()
    }
}

/// Parses a percentage such as `30`, `12.5`, or `12,5`.
impl FromStr for Margin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_end_matches('%');
        parse_scaled(s, 2, "margin").map(Margin)
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3i64).cents(), 3000);
        assert_eq!((a * 2u32).cents(), 2000);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_parse_money() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!(".99".parse::<Money>().unwrap().cents(), 99);
        assert_eq!("-3.25".parse::<Money>().unwrap().cents(), -325);
        assert_eq!("1.005".parse::<Money>().unwrap().cents(), 101);
        assert_eq!("1.004".parse::<Money>().unwrap().cents(), 100);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());

        // Fits in i128 but not once scaled to cents
        assert!("99999999999999999999999999999999999999".parse::<Money>().is_err());
        assert!("-99999999999999999999999999999999999999,99".parse::<Money>().is_err());
        assert!("92233720368547758.08".parse::<Money>().is_err());
    }

    #[test]
    fn test_saturating_totals() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(big.saturating_add(big).cents(), i64::MAX);
        assert_eq!(big.saturating_mul(3).cents(), i64::MAX);
        assert_eq!((-big).saturating_mul(3).cents(), i64::MIN);
        assert_eq!(Money::from_cents(250).saturating_mul(4).cents(), 1000);
        assert_eq!(Money::from_cents(i64::MIN).saturating_sub(big).cents(), i64::MIN);
    }

    #[test]
    fn test_float_boundary() {
        assert_eq!(Money::from_major_f64(15.0).unwrap().cents(), 1500);
        assert_eq!(Money::from_major_f64(0.1 + 0.2).unwrap().cents(), 30);
        assert_eq!(Money::from_major_f64(-2.5).unwrap().cents(), -250);
        assert!(Money::from_major_f64(f64::NAN).is_none());
        assert!(Money::from_major_f64(f64::INFINITY).is_none());
        assert_eq!(Money::from_cents(1234).to_major_f64(), 12.34);
    }

    #[test]
    fn test_average_over() {
        assert_eq!(Money::from_cents(3000).average_over(2).cents(), 1500);
        assert_eq!(Money::from_cents(1000).average_over(3).cents(), 333);
        assert_eq!(Money::from_cents(500).average_over(0), Money::zero());
        assert_eq!(Money::from_cents(-1000).average_over(3).cents(), -333);
    }

    #[test]
    fn test_ratio_bps() {
        assert_eq!(Money::from_cents(500).ratio_bps(Money::from_cents(1000)), 5000);
        assert_eq!(Money::from_cents(500).ratio_bps(Money::zero()), 0);
        assert_eq!(Money::from_cents(i64::MAX).ratio_bps(Money::from_cents(1)), i64::MAX);
    }

    #[test]
    fn test_markup() {
        let cost = Money::from_cents(1000);
        assert_eq!(Margin::from_bps(5000).apply_markup(cost).cents(), 1500);
        assert_eq!(Margin::from_bps(3000).apply_markup(cost).cents(), 1300);
        assert_eq!(Margin::zero().apply_markup(cost), cost);
        // 3.33 * 1.125 = 3.74625 → 3.75
        assert_eq!(Margin::from_bps(1250).apply_markup(Money::from_cents(333)).cents(), 375);
    }

    #[test]
    fn test_margin_from_prices() {
        let margin = Margin::from_prices(Money::from_cents(2000), Money::from_cents(2500));
        assert_eq!(margin.bps(), 2000);
        assert_eq!(margin.percentage(), 20.0);

        // Price below cost gives a negative margin
        let loss = Margin::from_prices(Money::from_cents(1000), Money::from_cents(800));
        assert_eq!(loss.bps(), -2500);

        // Zero price falls back to zero margin
        assert_eq!(Margin::from_prices(Money::from_cents(1000), Money::zero()), Margin::zero());
    }

    #[test]
    fn test_parse_margin() {
        assert_eq!("50".parse::<Margin>().unwrap().bps(), 5000);
        assert_eq!("12,5".parse::<Margin>().unwrap().bps(), 1250);
        assert_eq!("30%".parse::<Margin>().unwrap().bps(), 3000);
        assert!("lots".parse::<Margin>().is_err());
    }

    #[test]
    fn test_margin_display() {
        assert_eq!(Margin::from_bps(5000).to_string(), "50.00%");
        assert_eq!(Margin::from_bps(-2550).to_string(), "-25.50%");
        assert_eq!(Margin::from_percentage(33.333).bps(), 3333);
    }
}
