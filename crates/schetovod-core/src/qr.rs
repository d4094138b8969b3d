//! # Payment QR Payload
//!
//! Builds the ST00012 payment payload (GOST R 56042-2014) printed on
//! invoices as a scannable QR code.
//!
//! ## Payload Grammar
//! ```text
//! ST00012|Name=…|PersonalAcc=…|BankName=…|BIC=…|CorrespAcc=…|PayeeINN=…
//!        [|KPP=…]|Sum=…|Purpose=Оплата по счету №N от dd.mm.yyyy
//! ```
//!
//! Empty fields are omitted entirely - a bank app scanning
//! `KPP=` with no value would reject the code.
//!
//! `Sum` is in **kopecks** (minor units), as the standard mandates; the
//! display path divides by 100, the wire path never does.
//!
//! Turning the payload into pixels is the job of the [`QrImageEncoder`]
//! collaborator, implemented by the host (qrcode → PNG → data URL).

use chrono::NaiveDate;

use crate::aggregate::aggregate_document;
use crate::money::Money;
use crate::types::{find_company, format_date, Company, Document};

// =============================================================================
// Image Encoder Collaborator
// =============================================================================

/// Renders a payload string into an image reference usable in an
/// `<img src>` attribute (typically a PNG data URL).
///
/// The engine never generates pixels itself; hosts plug in a real
/// encoder, tests plug in a stub.
pub trait QrImageEncoder {
    /// Returns the data URL for the payload, or `None` when encoding
    /// fails - the renderer then skips the QR block.
    fn data_url(&self, payload: &str) -> Option<String>;
}

/// Encoder that produces no image; renders skip their QR block.
pub struct NoQrEncoder;

impl QrImageEncoder for NoQrEncoder {
    fn data_url(&self, _payload: &str) -> Option<String> {
        None
    }
}

// =============================================================================
// Payload Builder
// =============================================================================

const SERVICE_TAG: &str = "ST00012";

/// Builds the payment payload for a resolved seller.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use schetovod_core::demo::demo_seller;
/// use schetovod_core::money::Money;
/// use schetovod_core::qr::payment_payload;
///
/// let payload = payment_payload(
///     &demo_seller(),
///     Money::from_kopecks(16_000_000),
///     "0001",
///     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
/// );
/// assert!(payload.starts_with("ST00012|Name=ООО \"Ромашка\""));
/// assert!(payload.contains("|Sum=16000000|"));
/// ```
pub fn payment_payload(seller: &Company, total: Money, number: &str, date: NaiveDate) -> String {
    let purpose = format!("Оплата по счету №{} от {}", number, format_date(date));
    let fields: [(&str, &str); 7] = [
        ("Name", seller.name.as_str()),
        ("PersonalAcc", seller.rs.as_str()),
        ("BankName", seller.bank.as_str()),
        ("BIC", seller.bik.as_str()),
        ("CorrespAcc", seller.ks.as_str()),
        ("PayeeINN", seller.inn.as_str()),
        ("KPP", seller.kpp.as_str()),
    ];

    let mut parts: Vec<String> = Vec::with_capacity(10);
    parts.push(SERVICE_TAG.to_string());
    for (key, value) in fields.iter() {
        if !value.is_empty() {
            parts.push(format!("{key}={value}"));
        }
    }
    // Sum in kopecks per GOST R 56042-2014.
    parts.push(format!("Sum={}", total.kopecks()));
    parts.push(format!("Purpose={purpose}"));
    parts.join("|")
}

/// Builds the payload for an invoice document, resolving the seller from
/// the company snapshot. Returns `None` when the seller reference
/// dangles - an invoice without requisites cannot be paid by QR.
pub fn invoice_payload(
    doc: &Document,
    companies: &[Company],
    products: &[crate::types::Product],
) -> Option<String> {
    let seller = find_company(companies, &doc.seller_id)?;
    let totals = aggregate_document(doc, companies, products).totals;
    Some(payment_payload(seller, totals.total, &doc.number, doc.date))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{demo_buyer, demo_seller};
    use crate::types::{CompanyId, Currency, DocDetails, DocLine, DocumentId, ProductId, VatRate};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_full_payload() {
        let payload = payment_payload(&demo_seller(), Money::from_kopecks(16_000_000), "0001", date());
        assert_eq!(
            payload,
            "ST00012|Name=ООО \"Ромашка\"|PersonalAcc=40702810938000012345\
             |BankName=ПАО Сбербанк|BIC=044525225|CorrespAcc=30101810400000000225\
             |PayeeINN=7707123456|KPP=770701001|Sum=16000000\
             |Purpose=Оплата по счету №0001 от 15.03.2024"
        );
    }

    #[test]
    fn test_empty_kpp_is_omitted_entirely() {
        // Individual entrepreneurs have no KPP; the segment must vanish,
        // not degrade to "KPP=".
        let payload = payment_payload(&demo_buyer(), Money::from_kopecks(100), "0002", date());
        assert!(!payload.contains("KPP"));
        assert!(payload.contains("PayeeINN=771234567890"));
    }

    #[test]
    fn test_unresolved_seller_yields_none() {
        let doc = Document {
            id: DocumentId::new("d1"),
            number: "0001".to_string(),
            date: date(),
            seller_id: CompanyId::new("ghost"),
            buyer_id: CompanyId::new("c2"),
            lines: vec![],
            currency: Currency::Rub,
            details: DocDetails::Invoice {},
        };
        assert!(invoice_payload(&doc, &[], &[]).is_none());
    }

    #[test]
    fn test_sum_is_minor_units_of_line_totals() {
        let seller = demo_seller();
        let doc = Document {
            id: DocumentId::new("d2"),
            number: "0007".to_string(),
            date: date(),
            seller_id: seller.id.clone(),
            buyer_id: CompanyId::new("c2"),
            lines: vec![DocLine {
                id: "l1".to_string(),
                product_id: ProductId::new("ghost"),
                quantity: 3,
                price: Money::from_kopecks(12_345),
                vat: VatRate::from_percent(20),
            }],
            currency: Currency::Rub,
            details: DocDetails::Invoice {},
        };
        let payload = invoice_payload(&doc, std::slice::from_ref(&seller), &[]).unwrap();
        assert!(payload.contains("|Sum=37035|"));
        assert!(payload.ends_with("Purpose=Оплата по счету №0007 от 15.03.2024"));
    }
}
