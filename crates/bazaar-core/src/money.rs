//! # Money Module
//!
//! The `Money` type and the pricing engine used by the cart and checkout
//! pages.
//!
//! ## Integer Minor Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every price in the marketplace is an integer count of cents.          │
//! │                                                                         │
//! │    Product.price ──► CartItem × quantity ──► line_total                 │
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │                               subtotal = Σ line_total                   │
//! │                                                  │                      │
//! │                                  tax(subtotal, 10%) (half-up)           │
//! │                                                  │                      │
//! │                               total = subtotal + tax                    │
//! │                                                                         │
//! │  Only format_price / Display turn cents into "12.34" text.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::{line_total, subtotal, tax, total, Money, PricedLine};
//! use bazaar_core::types::TaxRate;
//!
//! let lines = [PricedLine::new(Money::from_cents(500), 2)];
//! assert_eq!(line_total(Money::from_cents(500), 2).unwrap().cents(), 1000);
//!
//! let sub = subtotal(&lines).unwrap();
//! let tax = tax(sub, TaxRate::DEFAULT).unwrap();
//! assert_eq!(total(sub, tax).unwrap().to_string(), "$11.00");
//! ```
//!
//! Every pricing step is checked: a line, subtotal or total past `i64::MAX`
//! cents is [`CoreError::AmountOverflow`], never a wrapped or panicking sum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price ──┬──► CartLine.unit_price ──► CartLine.line_total
///                 │
///                 └──► Displayed as "$10.99" on product cards
///
/// OrderItem.price (price at purchase) ──► OrderData.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a price typed in major units ("12.99") into cents.
    ///
    /// The admin product form takes prices as dollars. Digits past the
    /// second decimal place are rounded half-up, so "0.125" becomes 13 cents.
    ///
    /// ## Rules
    /// - Digits with at most one decimal point
    /// - At least one digit
    /// - No sign, no currency symbol, no exponent
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_str("12.99").unwrap().cents(), 1299);
    /// assert_eq!(Money::from_major_str("5").unwrap().cents(), 500);
    /// assert!(Money::from_major_str("-1").is_err());
    /// ```
    pub fn from_major_str(text: &str) -> Result<Money, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "price".to_string(),
            });
        }

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("must contain at least one digit"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a non-negative decimal number"));
        }

        let overflow = || ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX / 100,
        };

        let dollars: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };

        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().map_or(0, |d| i64::from(d >= 5));

        dollars
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + round_up))
            .map(Money)
            .ok_or_else(overflow)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at the given rate, rounding half-up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 is the
    /// half-cent that makes the division round instead of truncate.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::TaxRate;
    ///
    /// let tax = Money::from_cents(1005).calculate_tax(TaxRate::DEFAULT).unwrap();
    /// // $10.05 × 10% = $1.005 → $1.01
    /// assert_eq!(tax.cents(), 101);
    /// ```
    ///
    /// `None` when the tax itself does not fit in `i64` cents.
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        // i128 keeps large carts from overflowing the intermediate product
        let tax_cents = (i128::from(self.0) * i128::from(rate.bps()) + 5000) / 10000;
        i64::try_from(tax_cents).ok().map(Money)
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let line = Money::from_cents(299).checked_mul_quantity(3);
    /// assert_eq!(line, Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(299).checked_mul_quantity(u64::MAX), None);
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: u64) -> Option<Money> {
        let qty = i64::try_from(qty).ok()?;
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money with the dollar sign: `$10.99`.
///
/// Use [`format_price`] when the currency symbol is rendered separately.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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
// Pricing Engine
// =============================================================================

/// Anything with a unit price and a quantity: cart lines, order items.
pub trait Priced {
    /// Price of a single unit.
    fn unit_price(&self) -> Money;

    /// Number of units.
    fn quantity(&self) -> u64;

    /// `unit_price × quantity`.
    fn line_total(&self) -> CoreResult<Money> {
        line_total(self.unit_price(), self.quantity())
    }
}

/// A bare (price, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: u64,
}

impl PricedLine {
    pub const fn new(unit_price: Money, quantity: u64) -> Self {
        PricedLine {
            unit_price,
            quantity,
        }
    }
}

impl Priced for PricedLine {
    fn unit_price(&self) -> Money {
        self.unit_price
    }

    fn quantity(&self) -> u64 {
        self.quantity
    }
}

/// `price × quantity`.
#[inline]
pub fn line_total(price: Money, quantity: u64) -> CoreResult<Money> {
    price
        .checked_mul_quantity(quantity)
        .ok_or(CoreError::AmountOverflow)
}

/// Sum of every line total. Zero for an empty slice.
pub fn subtotal<L: Priced>(lines: &[L]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::zero(), |sum, line| {
        sum.checked_add(line.line_total()?)
            .ok_or(CoreError::AmountOverflow)
    })
}

/// Tax owed on a subtotal.
#[inline]
pub fn tax(subtotal: Money, rate: TaxRate) -> CoreResult<Money> {
    subtotal
        .calculate_tax(rate)
        .ok_or(CoreError::AmountOverflow)
}

/// `subtotal + tax`.
#[inline]
pub fn total(subtotal: Money, tax: Money) -> CoreResult<Money> {
    subtotal.checked_add(tax).ok_or(CoreError::AmountOverflow)
}

/// Formats cents as a plain decimal with exactly two places: `12345` → `"123.45"`.
///
/// ## Example
/// ```rust
/// use bazaar_core::money::format_price;
///
/// assert_eq!(format_price(12345), "123.45");
/// assert_eq!(format_price(0), "0.00");
/// assert_eq!(format_price(7), "0.07");
/// ```
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Subtotal, tax and total for a set of priced lines.
///
/// This is the summary block shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// Runs the full pricing pipeline over `lines`.
    pub fn for_lines<L: Priced>(lines: &[L], rate: TaxRate) -> CoreResult<Self> {
        let subtotal = subtotal(lines)?;
        let tax = tax(subtotal, rate)?;
        Ok(PriceBreakdown {
            subtotal,
            tax,
            total: total(subtotal, tax)?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Money::from_cents(299), 3).unwrap().cents(), 897);
        assert_eq!(line_total(Money::from_cents(299), 0).unwrap().cents(), 0);
        assert_eq!(line_total(Money::zero(), 12).unwrap().cents(), 0);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let lines = [
            PricedLine::new(Money::from_cents(500), 2),
            PricedLine::new(Money::from_cents(1000), 1),
        ];
        assert_eq!(subtotal(&lines).unwrap().cents(), 2000);
    }

    #[test]
    fn test_subtotal_empty_is_zero() {
        let lines: [PricedLine; 0] = [];
        assert_eq!(subtotal(&lines).unwrap(), Money::zero());
    }

    #[test]
    fn test_tax_default_rate() {
        assert_eq!(tax(Money::from_cents(100), TaxRate::DEFAULT).unwrap().cents(), 10);
        assert_eq!(
            total(Money::from_cents(100), Money::from_cents(10)).unwrap().cents(),
            110
        );
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 5 cents at 10% = 0.5 cent
        assert_eq!(tax(Money::from_cents(5), TaxRate::DEFAULT).unwrap().cents(), 1);
        // 4 cents at 10% = 0.4 cent
        assert_eq!(tax(Money::from_cents(4), TaxRate::DEFAULT).unwrap().cents(), 0);
        // $10.00 at 8.25% = $0.825
        assert_eq!(tax(Money::from_cents(1000), TaxRate::from_bps(825)).unwrap().cents(), 83);
    }

    #[test]
    fn test_tax_rate_override() {
        assert_eq!(tax(Money::from_cents(2000), TaxRate::zero()).unwrap().cents(), 0);
        assert_eq!(tax(Money::from_cents(2000), TaxRate::from_bps(2000)).unwrap().cents(), 400);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12345), "123.45");
        assert_eq!(format_price(0), "0.00");
        assert_eq!(format_price(5), "0.05");
        assert_eq!(format_price(100), "1.00");
    }

    #[test]
    fn test_breakdown_end_to_end() {
        let lines = [
            PricedLine::new(Money::from_cents(500), 2),
            PricedLine::new(Money::from_cents(1000), 1),
        ];
        let breakdown = PriceBreakdown::for_lines(&lines, TaxRate::DEFAULT).unwrap();

        assert_eq!(breakdown.subtotal.cents(), 2000);
        assert_eq!(breakdown.tax.cents(), 200);
        assert_eq!(breakdown.total.cents(), 2200);
        assert_eq!(breakdown.subtotal.to_string(), "$20.00");
        assert_eq!(breakdown.tax.to_string(), "$2.00");
        assert_eq!(breakdown.total.to_string(), "$22.00");
    }

    #[test]
    fn test_from_major_str() {
        assert_eq!(Money::from_major_str("12.99").unwrap().cents(), 1299);
        assert_eq!(Money::from_major_str(" 5 ").unwrap().cents(), 500);
        assert_eq!(Money::from_major_str("0.5").unwrap().cents(), 50);
        assert_eq!(Money::from_major_str(".25").unwrap().cents(), 25);
        assert_eq!(Money::from_major_str("3.").unwrap().cents(), 300);
    }

    #[test]
    fn test_from_major_str_rounds_extra_digits() {
        assert_eq!(Money::from_major_str("0.125").unwrap().cents(), 13);
        assert_eq!(Money::from_major_str("0.124").unwrap().cents(), 12);
        assert_eq!(Money::from_major_str("19.995").unwrap().cents(), 2000);
    }

    #[test]
    fn test_from_major_str_rejects_garbage() {
        assert!(matches!(
            Money::from_major_str(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(Money::from_major_str(".").is_err());
        assert!(Money::from_major_str("-1.00").is_err());
        assert!(Money::from_major_str("$4").is_err());
        assert!(Money::from_major_str("1.2.3").is_err());
        assert!(Money::from_major_str("1e3").is_err());
        assert!(matches!(
            Money::from_major_str("99999999999999999999"),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_sum_iterator() {
        let total: Money = [Money::from_cents(1), Money::from_cents(2)].iter().sum();
        assert_eq!(total.cents(), 3);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_cents(1299)).unwrap();
        assert_eq!(json, "1299");
    }

    #[test]
    fn test_line_total_overflow_is_an_error() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(line_total(max, 1).unwrap(), max);
        assert_eq!(line_total(max, 2), Err(CoreError::AmountOverflow));
        assert_eq!(
            line_total(Money::from_cents(1), u64::MAX),
            Err(CoreError::AmountOverflow)
        );
        assert_eq!(
            line_total(Money::from_cents(1), i64::MAX as u64).unwrap().cents(),
            i64::MAX
        );
    }

    #[test]
    fn test_subtotal_overflow_is_an_error() {
        let lines = [
            PricedLine::new(Money::from_cents(i64::MAX - 10), 1),
            PricedLine::new(Money::from_cents(11), 1),
        ];
        assert_eq!(subtotal(&lines), Err(CoreError::AmountOverflow));
        assert_eq!(subtotal(&lines[..1]).unwrap().cents(), i64::MAX - 10);
    }

    #[test]
    fn test_breakdown_overflowing_total_is_an_error() {
        // The subtotal fits, but adding 10% tax does not.
        let lines = [PricedLine::new(Money::from_cents(i64::MAX / 2), 2)];
        assert_eq!(
            PriceBreakdown::for_lines(&lines, TaxRate::DEFAULT),
            Err(CoreError::AmountOverflow)
        );
        assert!(PriceBreakdown::for_lines(&lines, TaxRate::zero()).is_ok());
    }

    #[test]
    fn test_tax_on_extreme_amount() {
        assert_eq!(
            tax(Money::from_cents(i64::MAX), TaxRate::DEFAULT).unwrap().cents(),
            922_337_203_685_477_581
        );
        assert_eq!(
            tax(Money::from_cents(i64::MAX), TaxRate::from_bps(20_000)),
            Err(CoreError::AmountOverflow)
        );
    }
}
