//! # schetovod-core: Pure Business Logic for Schetovod
//!
//! This crate is the **heart** of Schetovod, a small-business accounting
//! engine. It contains all business logic as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Schetovod Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Host (CLI / web UI)                         │   │
//! │  │   edits reference data ──► picks a document ──► print/export   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots in, artifacts out            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ schetovod-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌─────────┐ ┌───────┐  │   │
//! │  │   │  types  │ │  money  │ │ aggregate │ │ render  │ │export │  │   │
//! │  │   │  words  │ │ template│ │    qr     │ │ blocks  │ │ sheet │  │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └─────────┘ └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORE ACCESS • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                schetovod-store (persistence)                    │   │
//! │  │           JSON key-value snapshots, counters, seed              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - domain types (Company, Product, Document, typed ids)
//! - [`money`] - integer-kopeck Money, inclusive-VAT math, ru formatting
//! - [`words`] - Russian amount-in-words conversion
//! - [`aggregate`] - line/total aggregation over catalog snapshots
//! - [`template`] - print template schema, defaults and validation
//! - [`render`] - the HTML rendering engine (templated + legacy layouts)
//! - [`qr`] - ST00012 payment payload and the image encoder trait
//! - [`export`] - spreadsheet grid and XML encoders
//! - [`validation`] - boundary parsing and reference-data validation
//! - [`demo`] - preview / first-run fixtures
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same snapshots in, same artifact out
//! 2. **No I/O**: persistence and encoders live behind the store and
//!    host-implemented traits
//! 3. **Integer money**: every amount is i64 kopecks, floats never touch
//!    monetary arithmetic
//! 4. **Dangling references are data**: unknown product and company ids
//!    degrade visibly ("—", placeholder page), they do not panic
//!
//! ## Example
//!
//! ```rust
//! use schetovod_core::money::Money;
//! use schetovod_core::types::VatRate;
//! use schetovod_core::words::amount_in_words;
//!
//! let total = Money::from_kopecks(500_000).line_total(2);
//! let vat = total.included_vat(VatRate::from_percent(20));
//! assert_eq!(vat.kopecks(), 166_667);
//! assert_eq!(
//!     amount_in_words(total.kopecks()),
//!     "Десять тысяч рублей 00 копеек"
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod demo;
pub mod error;
pub mod export;
pub mod money;
pub mod qr;
pub mod render;
pub mod template;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use schetovod_core::Money` instead of
// `use schetovod_core::money::Money`.

pub use error::{CoreError, CoreResult, TemplateError, ValidationError};
pub use money::Money;
pub use template::TemplateSettings;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Width of zero-padded document numbers: counter value 7 prints as
/// "0007". Numbers are assigned once and never reused.
pub const DOC_NUMBER_WIDTH: usize = 4;

/// Formats a counter value as a display number.
pub fn format_doc_number(counter: u64) -> String {
    format!("{:0width$}", counter, width = DOC_NUMBER_WIDTH)
}
