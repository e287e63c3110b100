//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    200000 × 0.95 × 1.10 = 209000.00000000003  ❌                        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + basis points                       │
//! │    200000 - round(200000 × 500 / 10000)  = 190000                       │
//! │    190000 + round(190000 × 1000 / 10000) = 209000  ✅                   │
//! │                                                                         │
//! │  Every rounding step is explicit and happens exactly once.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use venue_core::money::Money;
//!
//! let hourly = Money::from_minor(100_000);
//! let room_cost = hourly.checked_multiply_hours(2.5).unwrap();
//! assert_eq!(room_cost.minor(), 250_000);
//!
//! let snacks = Money::from_minor(20_000).checked_mul(2).unwrap();
//! assert_eq!(room_cost.checked_add(snacks).unwrap().minor(), 290_000);
//!
//! // Amounts that do not fit in i64 are refused instead of wrapping.
//! assert!(Money::from_minor(i64::MAX).checked_add(snacks).is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// RoomType.price ──► × actual hours ──► room_cost ─┐
///                                                  ├─► gross ─► discount ─► subtotal ─► + VAT ─► total
/// Service.price ───► × quantity ─────► service_cost┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use venue_core::money::Money;
    ///
    /// let price = Money::from_minor(29_000);
    /// assert_eq!(price.minor(), 29_000);
    /// ```
    #[inline]
    pub const fn from_minor(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
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

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(amount) => Some(Money(amount)),
            None => None,
        }
    }

    /// Multiplies by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(amount) => Some(Money(amount)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// Multiplies an hourly rate by a (possibly fractional) number of hours.
    ///
    /// The product is rounded to the nearest minor unit, half away from zero.
    /// `None` when the result is not finite or does not fit in i64.
    ///
    /// ## Example
    /// ```rust
    /// use venue_core::money::Money;
    ///
    /// let rate = Money::from_minor(300_000);
    /// assert_eq!(rate.checked_multiply_hours(1.5).unwrap().minor(), 450_000);
    /// assert_eq!(Money::from_minor(1).checked_multiply_hours(0.5).unwrap().minor(), 1);
    /// assert!(rate.checked_multiply_hours(1e300).is_none());
    /// ```
    pub fn checked_multiply_hours(&self, hours: f64) -> Option<Money> {
        let product = (self.0 as f64 * hours).round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
        if product.is_finite() && product >= i64::MIN as f64 && product < i64::MAX as f64 {
            Some(Money(product as i64))
        } else {
            None
        }
    }

    /// Calculates tax on this amount, rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128.
    /// `None` when the tax does not fit back into i64.
    ///
    /// ## Example
    /// ```rust
    /// use venue_core::money::Money;
    /// use venue_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_minor(190_000);
    /// let vat = subtotal.calculate_tax(TaxRate::from_bps(1000)).unwrap();
    /// assert_eq!(vat.minor(), 19_000);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        scale_bps(self.0, rate.bps()).map(Money)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (500 = 5%)
    ///
    /// ## Example
    /// ```rust
    /// use venue_core::money::Money;
    ///
    /// let gross = Money::from_minor(200_000);
    /// assert_eq!(gross.apply_percentage_discount(500).unwrap().minor(), 190_000);
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Option<Money> {
        let discount = scale_bps(self.0, discount_bps)?;
        self.0.checked_sub(discount).map(Money)
    }
}

/// `round(amount × bps / 10000)` in integer arithmetic.
fn scale_bps(amount: i64, bps: u32) -> Option<i64> {
    let scaled = amount as i128 * bps as i128;
    let rounded = if scaled >= 0 {
        (scaled + 5000) / 10000
    } else {
        (scaled - 5000) / 10000
    };
    i64::try_from(rounded).ok()
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with thousands separators, e.g. `330,000`.
///
/// ## Note
/// For logs and debugging. Currency symbols and locale formatting belong
/// to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        if self.0 < 0 {
            write!(f, "-{}", grouped)
        } else {
            write!(f, "{}", grouped)
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(100_000);
        assert_eq!(money.minor(), 100_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(330_000)), "330,000");
        assert_eq!(format!("{}", Money::from_minor(1_234_567)), "1,234,567");
        assert_eq!(format!("{}", Money::from_minor(999)), "999");
        assert_eq!(format!("{}", Money::from_minor(-15_000)), "-15,000");
        assert_eq!(format!("{}", Money::zero()), "0");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!(a.checked_add(b), Some(Money::from_minor(1500)));
        assert_eq!(a.checked_mul(3), Some(Money::from_minor(3000)));
        assert_eq!(Money::checked_sum([a, b, b]), Some(Money::from_minor(2000)));
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_overflow_is_refused() {
        let big = Money::from_minor(i64::MAX / 2 + 1);

        assert!(big.checked_add(big).is_none());
        assert!(Money::from_minor(29_000).checked_mul(i64::MAX / 2).is_none());
        assert!(Money::checked_sum([big, Money::from_minor(1), big]).is_none());
        assert!(Money::from_minor(i64::MAX).calculate_tax(TaxRate::from_bps(20_000)).is_none());
    }

    #[test]
    fn test_vat_ten_percent() {
        let subtotal = Money::from_minor(300_000);
        let vat = subtotal.calculate_tax(TaxRate::from_bps(1000)).unwrap();
        assert_eq!(vat.minor(), 30_000);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 15 × 10% = 1.5 → 2
        let vat = Money::from_minor(15).calculate_tax(TaxRate::from_bps(1000)).unwrap();
        assert_eq!(vat.minor(), 2);
        // 14 × 10% = 1.4 → 1
        let vat = Money::from_minor(14).calculate_tax(TaxRate::from_bps(1000)).unwrap();
        assert_eq!(vat.minor(), 1);
    }

    #[test]
    fn test_percentage_discount() {
        let gross = Money::from_minor(200_000);
        assert_eq!(gross.apply_percentage_discount(500).unwrap().minor(), 190_000);
        assert_eq!(gross.apply_percentage_discount(0).unwrap().minor(), 200_000);
    }

    #[test]
    fn test_multiply_hours() {
        let rate = Money::from_minor(100_000);
        assert_eq!(rate.checked_multiply_hours(3.0).unwrap().minor(), 300_000);
        assert_eq!(rate.checked_multiply_hours(0.25).unwrap().minor(), 25_000);
        // 100000 × 1/3 = 33333.33 → 33333
        assert_eq!(rate.checked_multiply_hours(1.0 / 3.0).unwrap().minor(), 33_333);
    }

    #[test]
    fn test_multiply_hours_out_of_range() {
        let rate = Money::from_minor(300_000);
        assert!(rate.checked_multiply_hours(1e300).is_none());
        assert!(rate.checked_multiply_hours(f64::INFINITY).is_none());
        assert!(rate.checked_multiply_hours(f64::NAN).is_none());
        assert!(Money::from_minor(i64::MAX).checked_multiply_hours(1.0).is_none());
    }

    #[test]
    fn test_zero() {
        assert!(Money::zero().is_zero());
        assert_eq!(Money::default(), Money::zero());
        assert!(!Money::from_minor(1).is_zero());
    }
}
