//! # Document Data Aggregator
//!
//! Joins a document's lines against the product catalog and the two
//! counterparty records, computing per-line and grand totals.
//!
//! ## Data Flow
//! ```text
//! DocLine[] ──┐
//! Product[] ──┼──► aggregate() ──► DocData { seller?, buyer?, rows, totals }
//! Company[] ──┘                         │
//!                                       ├──► render  (HTML)
//!                                       └──► export  (XLSX grid, XML)
//! ```
//!
//! Aggregation is a pure function of the snapshots it receives: no
//! caching, no store access. Callers re-aggregate whenever the document,
//! the catalog or the counterparties change.
//!
//! Grand totals are always the sum of per-line results - never
//! recomputed from an aggregate price × quantity - so the inclusive-VAT
//! rounding of each line carries into the totals without drift.

use crate::money::Money;
use crate::types::{
    find_company, find_product, Company, CompanyId, DocLine, Document, Product, VatRate,
};

// =============================================================================
// Row & Totals
// =============================================================================

/// One computed table row: the line snapshot joined with catalog data.
#[derive(Debug, Clone)]
pub struct DocRow {
    /// Product display name; "—" when the product no longer exists.
    pub name: String,
    /// Unit-of-measure label; "шт" when the product no longer exists.
    pub unit: String,
    pub quantity: i64,
    /// Unit price snapshot (VAT inclusive).
    pub price: Money,
    pub vat: VatRate,
    /// Gross line total: price × quantity.
    pub total: Money,
    /// VAT included in `total`.
    pub vat_amount: Money,
    /// `total − vat_amount`.
    pub net: Money,
}

/// Grand totals over all rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocTotals {
    pub total: Money,
    pub vat: Money,
    pub net: Money,
}

/// The aggregated view of one document, ready for rendering or export.
#[derive(Debug, Clone)]
pub struct DocData<'a> {
    /// Resolved counterparties; `None` when the reference dangles.
    pub seller: Option<&'a Company>,
    pub buyer: Option<&'a Company>,
    pub rows: Vec<DocRow>,
    pub totals: DocTotals,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Display name substituted for a product that no longer exists.
pub const MISSING_PRODUCT_NAME: &str = "—";

fn row_from_line(line: &DocLine, products: &[Product]) -> DocRow {
    let product = find_product(products, &line.product_id);
    let total = line.price.line_total(line.quantity);
    let vat_amount = total.included_vat(line.vat);
    DocRow {
        name: product
            .map(|p| p.name.clone())
            .unwrap_or_else(|| MISSING_PRODUCT_NAME.to_string()),
        unit: product.map(|p| p.unit.clone()).unwrap_or_else(|| "шт".to_string()),
        quantity: line.quantity,
        price: line.price,
        vat: line.vat,
        total,
        vat_amount,
        net: total - vat_amount,
    }
}

/// Aggregates a line sequence against catalog snapshots.
///
/// Unknown product ids are non-fatal (placeholder name, preserved
/// numbers); unresolved counterparties surface as `None` and every
/// caller must decide how to degrade.
pub fn aggregate<'a>(
    lines: &[DocLine],
    products: &[Product],
    companies: &'a [Company],
    seller_id: &CompanyId,
    buyer_id: &CompanyId,
) -> DocData<'a> {
    let rows: Vec<DocRow> = lines.iter().map(|l| row_from_line(l, products)).collect();

    let totals = DocTotals {
        total: rows.iter().map(|r| r.total).sum(),
        vat: rows.iter().map(|r| r.vat_amount).sum(),
        net: rows.iter().map(|r| r.net).sum(),
    };

    DocData {
        seller: find_company(companies, seller_id),
        buyer: find_company(companies, buyer_id),
        rows,
        totals,
    }
}

/// Convenience wrapper for a whole document.
pub fn aggregate_document<'a>(
    doc: &Document,
    companies: &'a [Company],
    products: &[Product],
) -> DocData<'a> {
    aggregate(&doc.lines, products, companies, &doc.seller_id, &doc.buyer_id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompanyRole, ProductId};

    fn product(id: &str, name: &str, price: i64, vat: u8) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Money::from_kopecks(price),
            vat: VatRate::from_percent(vat),
            barcode: String::new(),
            currency: crate::types::Currency::Rub,
            unit: "час".to_string(),
        }
    }

    fn company(id: &str, role: CompanyRole) -> Company {
        Company {
            id: CompanyId::new(id),
            name: format!("Фирма {id}"),
            inn: "7707123456".to_string(),
            kpp: String::new(),
            bank: String::new(),
            bik: String::new(),
            rs: String::new(),
            ks: String::new(),
            address: String::new(),
            role,
            director: String::new(),
            accountant: String::new(),
        }
    }

    fn line(product_id: &str, qty: i64, price: i64, vat: u8) -> DocLine {
        DocLine {
            id: format!("l-{product_id}"),
            product_id: ProductId::new(product_id),
            quantity: qty,
            price: Money::from_kopecks(price),
            vat: VatRate::from_percent(vat),
        }
    }

    #[test]
    fn test_empty_lines_zero_totals() {
        let data = aggregate(&[], &[], &[], &CompanyId::new("s"), &CompanyId::new("b"));
        assert!(data.rows.is_empty());
        assert_eq!(data.totals, DocTotals::default());
    }

    #[test]
    fn test_grand_totals_are_per_line_sums() {
        let products = vec![product("p1", "Консультация", 500_000, 20)];
        let lines = vec![
            line("p1", 2, 500_000, 20),
            line("p1", 3, 33_333, 20),
            line("p1", 1, 77, 10),
        ];
        let data = aggregate(&lines, &products, &[], &CompanyId::new("s"), &CompanyId::new("b"));

        let mut total = Money::zero();
        let mut vat = Money::zero();
        let mut net = Money::zero();
        for l in &lines {
            let t = l.price.line_total(l.quantity);
            total += t;
            vat += t.included_vat(l.vat);
            net += t.net_of_vat(l.vat);
        }
        assert_eq!(data.totals.total, total);
        assert_eq!(data.totals.vat, vat);
        assert_eq!(data.totals.net, net);
        assert_eq!(data.totals.net + data.totals.vat, data.totals.total);
    }

    #[test]
    fn test_missing_product_keeps_line_numbers() {
        // The product was deleted after the line was created; the line's
        // frozen price/VAT still drive every number.
        let lines = vec![line("ghost", 2, 500_000, 20)];
        let data = aggregate(&lines, &[], &[], &CompanyId::new("s"), &CompanyId::new("b"));

        let row = &data.rows[0];
        assert_eq!(row.name, MISSING_PRODUCT_NAME);
        assert_eq!(row.unit, "шт");
        assert_eq!(row.quantity, 2);
        assert_eq!(row.total.kopecks(), 1_000_000);
        assert_eq!(row.vat_amount.kopecks(), 166_667);
        assert_eq!(row.net.kopecks(), 833_333);
    }

    #[test]
    fn test_counterparty_resolution() {
        let companies = vec![company("c1", CompanyRole::Seller), company("c2", CompanyRole::Buyer)];
        let data = aggregate(&[], &[], &companies, &CompanyId::new("c1"), &CompanyId::new("nope"));
        assert!(data.seller.is_some());
        assert!(data.buyer.is_none());
    }

    #[test]
    fn test_demo_figures() {
        // The two demo lines used by the template preview.
        let products = vec![
            product("p1", "Консультация (1 час)", 500_000, 20),
            product("p2", "Разработка сайта", 15_000_000, 20),
        ];
        let lines = vec![line("p1", 2, 500_000, 20), line("p2", 1, 15_000_000, 20)];
        let data = aggregate(&lines, &products, &[], &CompanyId::new("s"), &CompanyId::new("b"));

        assert_eq!(data.rows[0].vat_amount.kopecks(), 166_667);
        assert_eq!(data.rows[0].net.kopecks(), 833_333);
        assert_eq!(data.rows[1].vat_amount.kopecks(), 2_500_000);
        assert_eq!(data.totals.total.kopecks(), 16_000_000);
        assert_eq!(data.totals.vat.kopecks(), 2_666_667);
    }
}
