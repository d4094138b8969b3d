//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ← WRONG!                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Kopecks                                          │
//! │    Every amount is an i64 count of minor units (kopecks/cents).         │
//! │    Division happens exactly once, at display time.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## VAT Convention
//! Prices are VAT-inclusive. The tax is *extracted* from a gross total,
//! never added on top:
//!
//! ```text
//!   vat = round(total × rate / (100 + rate))      (round half up)
//!   net = total − vat
//! ```
//!
//! The invariant `net + vat == total` holds exactly for every input -
//! grand totals are always sums of per-line results, so no rounding
//! drift can accumulate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Currency, VatRate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (kopecks for RUB).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections
/// - **Single-field tuple struct**: zero-cost abstraction over i64
/// - **Serde-transparent**: persisted snapshots store the raw integer,
///   byte-compatible with the original records
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kopecks (the smallest currency unit).
    #[inline]
    pub const fn from_kopecks(kopecks: i64) -> Self {
        Money(kopecks)
    }

    /// Creates a Money value from whole rubles.
    #[inline]
    pub const fn from_rubles(rubles: i64) -> Self {
        Money(rubles * 100)
    }

    /// Returns the value in kopecks.
    #[inline]
    pub const fn kopecks(&self) -> i64 {
        self.0
    }

    /// Returns the major-unit (ruble) portion.
    #[inline]
    pub const fn rubles(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn kopecks_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Line total: unit price × quantity, in minor units.
    ///
    /// ## Example
    /// ```rust
    /// use schetovod_core::money::Money;
    ///
    /// let price = Money::from_kopecks(500_000); // 5 000,00 ₽
    /// assert_eq!(price.line_total(2).kopecks(), 1_000_000);
    /// ```
    #[inline]
    pub const fn line_total(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }

    /// Extracts the VAT included in this (gross) amount.
    ///
    /// Prices are tax-inclusive, so the tax is carved out of the total:
    /// `round(total × rate / (100 + rate))`, round half up on the
    /// minor-unit integer.
    ///
    /// ## Example
    /// ```rust
    /// use schetovod_core::money::Money;
    /// use schetovod_core::types::VatRate;
    ///
    /// let total = Money::from_kopecks(1_000_000); // 10 000,00 ₽ gross
    /// let vat = total.included_vat(VatRate::from_percent(20));
    /// // 1 000 000 × 20 / 120 = 166 666.67 → 166 667
    /// assert_eq!(vat.kopecks(), 166_667);
    /// ```
    pub fn included_vat(&self, rate: VatRate) -> Money {
        if rate.is_zero() {
            return Money::zero();
        }
        // i128 to prevent overflow on large totals.
        // floor((2·num + den) / (2·den)) == round-half-up of num/den.
        let num = self.0 as i128 * rate.percent() as i128;
        let den = 100 + rate.percent() as i128;
        let vat = (2 * num + den).div_euclid(2 * den);
        Money(vat as i64)
    }

    /// The net (VAT-free) part of this gross amount.
    ///
    /// Defined as `total − included_vat(total)`, which makes
    /// `net + vat == total` exact by construction.
    #[inline]
    pub fn net_of_vat(&self, rate: VatRate) -> Money {
        *self - self.included_vat(rate)
    }
}

// =============================================================================
// Display Formatting
// =============================================================================

/// Formats a monetary value the Russian way: minor units divided by 100,
/// exactly two fraction digits, non-breaking-space thousands grouping,
/// comma decimal separator and a trailing currency symbol.
///
/// ## Example
/// ```rust
/// use schetovod_core::money::{format_money, Money};
/// use schetovod_core::types::Currency;
///
/// let s = format_money(Money::from_kopecks(1_500_000), Currency::Rub);
/// assert_eq!(s, "15\u{a0}000,00 ₽");
/// ```
pub fn format_money(amount: Money, currency: Currency) -> String {
    let kopecks = amount.kopecks();
    let sign = if kopecks < 0 { "-" } else { "" };
    let abs = kopecks.unsigned_abs();
    let rubles = abs / 100;
    let minor = abs % 100;
    format!(
        "{}{},{:02} {}",
        sign,
        group_thousands(rubles),
        minor,
        currency.symbol()
    )
}

/// Groups an unsigned integer into blocks of three digits separated by
/// non-breaking spaces ("1 234 567" with U+00A0), matching the ru-RU
/// locale output of the host platforms the documents are shared with.
fn group_thousands(mut value: u64) -> String {
    if value < 1000 {
        return value.to_string();
    }
    let mut blocks: Vec<String> = Vec::new();
    while value >= 1000 {
        blocks.push(format!("{:03}", value % 1000));
        value /= 1000;
    }
    blocks.push(value.to_string());
    blocks.reverse();
    blocks.join("\u{a0}")
}

/// Debug-friendly display; documents use [`format_money`] instead,
/// which is currency-aware.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{},{:02}", sign, self.rubles().abs(), self.kopecks_part())
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
