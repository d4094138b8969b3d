//! # Domain Types
//!
//! Core domain types for the accounting engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Company      │   │     Product     │   │    Document     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  id, name       │   │  id, number     │       │
//! │  │  inn, kpp       │   │  price (Money)  │   │  date, lines    │       │
//! │  │  bank, bik      │   │  vat (VatRate)  │   │  seller/buyer   │       │
//! │  │  rs, ks, role   │   │  unit, barcode  │   │  details (enum) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Weak References
//! Documents reference companies and products by typed id only. A
//! referenced entity may have been deleted: every resolution goes through
//! [`find_company`] / [`find_product`], which return `Option`, so each
//! call site decides what a dangling reference means for it (placeholder
//! name, skipped QR block, rendering short-circuit).
//!
//! ## Snapshot Pattern
//! [`DocLine`] freezes the product's price and VAT rate at the moment the
//! line is created. Editing or deleting the product later never changes
//! existing documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Vat Rate
// =============================================================================

/// VAT rate as an integer percent.
///
/// The catalog UI offers 0 / 10 / 20, but the type itself does not
/// restrict the set - historical documents may carry e.g. 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[serde(transparent)]
#[ts(export)]
pub struct VatRate(u8);

impl VatRate {
    /// Creates a rate from an integer percent.
    #[inline]
    pub const fn from_percent(percent: u8) -> Self {
        VatRate(percent)
    }

    /// Returns the rate as an integer percent.
    #[inline]
    pub const fn percent(&self) -> u8 {
        self.0
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for VatRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Supported document currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub enum Currency {
    #[default]
    #[serde(rename = "RUB")]
    Rub,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    /// Display symbol appended to formatted amounts.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Rub => "₽",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    /// ISO 4217 alpha code, as persisted.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// The official wording used in the UPD currency field "(7)".
    /// Only the ruble has a mandated spelling; other currencies show
    /// their alpha code.
    pub fn official_name(&self) -> &'static str {
        match self {
            Currency::Rub => "Российский рубль (643)",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

// =============================================================================
// Typed Identifiers
// =============================================================================

/// Declares a typed opaque id over a string.
///
/// Ids are plain strings in the persisted snapshots; the newtypes exist
/// so that a `ProductId` can never be passed where a `CompanyId` is
/// expected, and so that resolution is always an explicit lookup.
macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS, Default,
        )]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing id string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh unique id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// The raw string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Company`].
    CompanyId
);
string_id!(
    /// Identifier of a [`Product`].
    ProductId
);
string_id!(
    /// Identifier of a [`Document`].
    DocumentId
);
string_id!(
    /// Identifier of a print template.
    TemplateId
);

// =============================================================================
// Company
// =============================================================================

/// Which side of a deal a company appears on.
///
/// The role partitions companies into two disjoint display pools; it does
/// not constrain which documents may reference the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CompanyRole {
    Seller,
    Buyer,
}

/// A counterparty: the business itself or one of its clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Company {
    pub id: CompanyId,
    /// Legal name, e.g. `ООО "Ромашка"`.
    pub name: String,
    /// Taxpayer number: 10 digits for organizations, 12 for individuals.
    pub inn: String,
    /// Tax registration reason code; empty for individual entrepreneurs.
    pub kpp: String,
    /// Bank name.
    pub bank: String,
    /// Bank identification code.
    pub bik: String,
    /// Settlement account.
    pub rs: String,
    /// Correspondent account.
    pub ks: String,
    pub address: String,
    pub role: CompanyRole,
    /// Signatory names; older records predate these fields, so they
    /// default to empty on load.
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub accountant: String,
}

/// Resolves a company id against a catalog snapshot.
pub fn find_company<'a>(companies: &'a [Company], id: &CompanyId) -> Option<&'a Company> {
    companies.iter().find(|c| &c.id == id)
}

// =============================================================================
// Product
// =============================================================================

fn default_unit() -> String {
    "шт".to_string()
}

/// A catalog item: goods or a service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in minor units, VAT included.
    pub price: Money,
    pub vat: VatRate,
    pub barcode: String,
    pub currency: Currency,
    /// Unit-of-measure label; older records predate the field and load
    /// with the conventional "шт".
    #[serde(default = "default_unit")]
    pub unit: String,
}

/// Resolves a product id against a catalog snapshot.
pub fn find_product<'a>(products: &'a [Product], id: &ProductId) -> Option<&'a Product> {
    products.iter().find(|p| &p.id == id)
}

// =============================================================================
// Document Lines
// =============================================================================

/// A line item inside a document.
///
/// `price` and `vat` are snapshots copied from the product when the line
/// was created (and editable independently afterwards); `product_id` is
/// only used to look up the display name and unit at render time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocLine {
    pub id: String,
    pub product_id: ProductId,
    /// Integer quantity, ≥ 1 (enforced at the input boundary).
    pub quantity: i64,
    pub price: Money,
    pub vat: VatRate,
}

// =============================================================================
// Documents
// =============================================================================

/// The three document kinds the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DocKind {
    Invoice,
    Act,
    Upd,
}

impl DocKind {
    /// Localized short label, used in list views and export filenames.
    pub const fn label(&self) -> &'static str {
        match self {
            DocKind::Invoice => "Счет",
            DocKind::Act => "Акт",
            DocKind::Upd => "УПД",
        }
    }
}

/// UPD status: whether the document also serves as a tax invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum UpdStatus {
    /// "1" - combined tax invoice and transfer act.
    #[serde(rename = "1")]
    InvoiceAndTransfer,
    /// "2" - transfer act only.
    #[serde(rename = "2")]
    TransferOnly,
}

impl UpdStatus {
    /// The digit printed in the status box.
    pub const fn code(&self) -> &'static str {
        match self {
            UpdStatus::InvoiceAndTransfer => "1",
            UpdStatus::TransferOnly => "2",
        }
    }

    /// The official status wording printed next to the digit.
    pub const fn label(&self) -> &'static str {
        match self {
            UpdStatus::InvoiceAndTransfer => "Счет-фактура и передаточный документ (акт)",
            UpdStatus::TransferOnly => "Передаточный документ (акт)",
        }
    }
}

/// Variant-specific payload of a [`Document`].
///
/// Untagged on the wire: the persisted records are flat objects whose
/// extra fields identify the kind, byte-compatible with the original
/// snapshots. `Invoice` carries no extra fields and must stay the last
/// variant so deserialization tries the discriminating shapes first.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum DocDetails {
    Act {
        #[serde(rename = "contractNumber")]
        contract_number: String,
        #[serde(rename = "contractDate", with = "opt_date_string")]
        #[ts(as = "Option<String>")]
        contract_date: Option<NaiveDate>,
    },
    Upd {
        #[serde(rename = "correctionNumber")]
        correction_number: String,
        status: UpdStatus,
    },
    Invoice {},
}

/// A document: the common shape plus the kind-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Document {
    pub id: DocumentId,
    /// Zero-padded display number, assigned once from the per-kind
    /// counter and never reassigned.
    pub number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub seller_id: CompanyId,
    pub buyer_id: CompanyId,
    pub lines: Vec<DocLine>,
    pub currency: Currency,
    #[serde(flatten)]
    pub details: DocDetails,
}

impl Document {
    /// The document's kind, derived from its payload.
    pub fn kind(&self) -> DocKind {
        match self.details {
            DocDetails::Invoice {} => DocKind::Invoice,
            DocDetails::Act { .. } => DocKind::Act,
            DocDetails::Upd { .. } => DocKind::Upd,
        }
    }
}

// =============================================================================
// Date Display
// =============================================================================

/// Formats a date the Russian way: `dd.mm.yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// (De)serializes `Option<NaiveDate>` as a plain string, treating the
/// empty string as absent - older act records stored `""` for a missing
/// contract date.
mod opt_date_string {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> DocLine {
        DocLine {
            id: "l1".to_string(),
            product_id: ProductId::new("p1"),
            quantity: 2,
            price: Money::from_kopecks(500_000),
            vat: VatRate::from_percent(20),
        }
    }

    #[test]
    fn test_document_kind_dispatch() {
        let mut doc = Document {
            id: DocumentId::new("d1"),
            number: "0001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            seller_id: CompanyId::new("c1"),
            buyer_id: CompanyId::new("c2"),
            lines: vec![line()],
            currency: Currency::Rub,
            details: DocDetails::Invoice {},
        };
        assert_eq!(doc.kind(), DocKind::Invoice);

        doc.details = DocDetails::Act {
            contract_number: "17".to_string(),
            contract_date: None,
        };
        assert_eq!(doc.kind(), DocKind::Act);

        doc.details = DocDetails::Upd {
            correction_number: String::new(),
            status: UpdStatus::InvoiceAndTransfer,
        };
        assert_eq!(doc.kind(), DocKind::Upd);
    }

    #[test]
    fn test_document_snapshot_roundtrip() {
        // The persisted shape is flat: variant fields sit next to the
        // common ones, as in the original records.
        let doc = Document {
            id: DocumentId::new("a1"),
            number: "0002".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            seller_id: CompanyId::new("c1"),
            buyer_id: CompanyId::new("c2"),
            lines: vec![line()],
            currency: Currency::Rub,
            details: DocDetails::Act {
                contract_number: "Д-42".to_string(),
                contract_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            },
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["contractNumber"], "Д-42");
        assert_eq!(json["contractDate"], "2024-01-10");
        assert_eq!(json["sellerId"], "c1");

        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), DocKind::Act);
    }

    #[test]
    fn test_act_empty_contract_date_loads_as_none() {
        let json = serde_json::json!({
            "id": "a2", "number": "0003", "date": "2024-06-01",
            "sellerId": "c1", "buyerId": "c2", "lines": [],
            "currency": "RUB", "contractNumber": "", "contractDate": ""
        });
        let doc: Document = serde_json::from_value(json).unwrap();
        match doc.details {
            DocDetails::Act { contract_date, .. } => assert!(contract_date.is_none()),
            _ => panic!("expected act"),
        }
    }

    #[test]
    fn test_invoice_snapshot_has_no_variant_fields() {
        let json = serde_json::json!({
            "id": "i1", "number": "0001", "date": "2024-06-01",
            "sellerId": "c1", "buyerId": "c2", "lines": [],
            "currency": "RUB"
        });
        let doc: Document = serde_json::from_value(json).unwrap();
        assert_eq!(doc.kind(), DocKind::Invoice);
    }

    #[test]
    fn test_upd_status_serde() {
        assert_eq!(
            serde_json::to_string(&UpdStatus::InvoiceAndTransfer).unwrap(),
            "\"1\""
        );
        let status: UpdStatus = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(status, UpdStatus::TransferOnly);
    }

    #[test]
    fn test_product_unit_migration_default() {
        // Records written before the unit field existed load with "шт".
        let json = serde_json::json!({
            "id": "p9", "name": "Настройка", "price": 100000,
            "vat": 20, "barcode": "", "currency": "RUB"
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.unit, "шт");
    }

    #[test]
    fn test_company_signatories_migration_default() {
        let json = serde_json::json!({
            "id": "c9", "name": "ООО Тест", "inn": "7700000000", "kpp": "",
            "bank": "", "bik": "", "rs": "", "ks": "",
            "address": "", "role": "seller"
        });
        let company: Company = serde_json::from_value(json).unwrap();
        assert_eq!(company.director, "");
        assert_eq!(company.accountant, "");
    }

    #[test]
    fn test_find_company_dangling() {
        let companies = vec![];
        assert!(find_company(&companies, &CompanyId::new("ghost")).is_none());
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(d), "05.03.2024");
    }
}
