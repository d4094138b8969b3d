//! # Validation Module
//!
//! Boundary parsing and reference-data validation.
//!
//! ## Two Different Postures
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Numeric form input (quantity, price)                                   │
//! │      └── silently corrected: malformed input falls back to a safe       │
//! │          default (quantity 1, price 0). A document must never fail      │
//! │          to compute because a user typed "2x".                          │
//! │                                                                         │
//! │  Reference data (company, product records)                              │
//! │      └── validated loudly: a company without a name or with a           │
//! │          malformed INN is rejected before it reaches the store.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Company, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Boundary Parsing (silently corrected)
// =============================================================================

/// Parses a quantity field. Malformed, empty or sub-1 input falls back
/// to 1 - the smallest quantity a document line can hold.
pub fn parse_quantity(input: &str) -> i64 {
    input.trim().parse::<i64>().map(|q| q.max(1)).unwrap_or(1)
}

/// Parses a price field given in rubles ("1500", "1500.50") into
/// kopecks, without going through floating point. Malformed input falls
/// back to zero.
pub fn parse_price(input: &str) -> Money {
    let s = input.trim();
    if s.is_empty() {
        return Money::zero();
    }
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, s),
    };
    let (int_part, frac_part) = match s.split_once(['.', ',']) {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    let rubles: i64 = match int_part.parse() {
        Ok(v) => v,
        Err(_) if int_part.is_empty() && !frac_part.is_empty() => 0,
        Err(_) => return Money::zero(),
    };
    // Take at most two fraction digits, rounding on the third.
    let digits: Vec<u32> = frac_part.chars().map(|c| c.to_digit(10)).collect::<Option<_>>()
        .unwrap_or_default();
    if !frac_part.is_empty() && digits.is_empty() {
        return Money::zero();
    }
    let mut kopecks = match digits.len() {
        0 => 0,
        1 => digits[0] as i64 * 10,
        _ => digits[0] as i64 * 10 + digits[1] as i64,
    };
    if digits.len() > 2 && digits[2] >= 5 {
        kopecks += 1;
    }
    Money::from_kopecks(sign * (rubles * 100 + kopecks))
}

// =============================================================================
// Reference Data (validated loudly)
// =============================================================================

/// Validates a company record before it is saved.
///
/// ## Rules
/// - name must not be empty
/// - INN, when present, is 10 digits (organization) or 12 (individual)
pub fn validate_company(company: &Company) -> ValidationResult<()> {
    if company.name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    if !company.inn.is_empty() {
        let digits_only = company.inn.chars().all(|c| c.is_ascii_digit());
        if !digits_only || !matches!(company.inn.len(), 10 | 12) {
            return Err(ValidationError::InvalidFormat {
                field: "inn",
                reason: "must be 10 or 12 digits".to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a product record before it is saved.
///
/// ## Rules
/// - name must not be empty
/// - price must not be negative
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }
    if product.price.kopecks() < 0 {
        return Err(ValidationError::InvalidFormat {
            field: "price",
            reason: "must not be negative".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
