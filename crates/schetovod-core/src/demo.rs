//! # Demo Data
//!
//! Synthetic companies, products and lines used in two places:
//!
//! 1. the live template-editor preview, which must render a plausible
//!    document without touching any persisted state;
//! 2. the first-run seed of an empty store.
//!
//! The preview prefers real companies of the matching role and falls
//! back to the fixtures here only when none exist.

use crate::money::Money;
use crate::types::{
    Company, CompanyId, CompanyRole, DocLine, Product, ProductId, VatRate,
};

// =============================================================================
// Demo Counterparties
// =============================================================================

/// The stand-in seller used by previews when no real seller exists.
pub fn demo_seller() -> Company {
    Company {
        id: CompanyId::new("demo"),
        name: "ООО \"Ромашка\"".to_string(),
        inn: "7707123456".to_string(),
        kpp: "770701001".to_string(),
        bank: "ПАО Сбербанк".to_string(),
        bik: "044525225".to_string(),
        rs: "40702810938000012345".to_string(),
        ks: "30101810400000000225".to_string(),
        address: "г. Москва, ул. Ленина, д. 1".to_string(),
        role: CompanyRole::Seller,
        director: "Петров А.В.".to_string(),
        accountant: "Сидорова Е.Н.".to_string(),
    }
}

/// The stand-in buyer used by previews when no real buyer exists.
pub fn demo_buyer() -> Company {
    Company {
        id: CompanyId::new("demo2"),
        name: "ИП Иванов И.И.".to_string(),
        inn: "771234567890".to_string(),
        kpp: String::new(),
        bank: "АО Тинькофф Банк".to_string(),
        bik: "044525974".to_string(),
        rs: "40802810100000012345".to_string(),
        ks: "30101810145250000974".to_string(),
        address: "г. Москва, ул. Пушкина, д. 5".to_string(),
        role: CompanyRole::Buyer,
        director: "Иванов И.И.".to_string(),
        accountant: String::new(),
    }
}

/// Picks the first real company with the given role, or the demo one.
pub fn preview_company(companies: &[Company], role: CompanyRole) -> Company {
    companies
        .iter()
        .find(|c| c.role == role)
        .cloned()
        .unwrap_or_else(|| match role {
            CompanyRole::Seller => demo_seller(),
            CompanyRole::Buyer => demo_buyer(),
        })
}

// =============================================================================
// Demo Catalog & Lines
// =============================================================================

/// The two demo products (also the first-run catalog seed).
pub fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("p1"),
            name: "Консультация (1 час)".to_string(),
            price: Money::from_kopecks(500_000),
            vat: VatRate::from_percent(20),
            barcode: "4600000000001".to_string(),
            currency: crate::types::Currency::Rub,
            unit: "час".to_string(),
        },
        Product {
            id: ProductId::new("p2"),
            name: "Разработка сайта".to_string(),
            price: Money::from_kopecks(15_000_000),
            vat: VatRate::from_percent(20),
            barcode: "4600000000002".to_string(),
            currency: crate::types::Currency::Rub,
            unit: "шт".to_string(),
        },
    ]
}

/// The two fixed preview lines: 2 × consultation, 1 × website.
pub fn demo_lines() -> Vec<DocLine> {
    vec![
        DocLine {
            id: "demo-l1".to_string(),
            product_id: ProductId::new("p1"),
            quantity: 2,
            price: Money::from_kopecks(500_000),
            vat: VatRate::from_percent(20),
        },
        DocLine {
            id: "demo-l2".to_string(),
            product_id: ProductId::new("p2"),
            quantity: 1,
            price: Money::from_kopecks(15_000_000),
            vat: VatRate::from_percent(20),
        },
    ]
}

/// First-run seed companies: the demo pair under stable catalog ids.
pub fn seed_companies() -> Vec<Company> {
    let mut seller = demo_seller();
    seller.id = CompanyId::new("c1");
    let mut buyer = demo_buyer();
    buyer.id = CompanyId::new("c2");
    vec![seller, buyer]
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_prefers_real_companies() {
        let mut real = demo_seller();
        real.id = CompanyId::new("real-1");
        real.name = "ООО Настоящая".to_string();

        let picked = preview_company(std::slice::from_ref(&real), CompanyRole::Seller);
        assert_eq!(picked.name, "ООО Настоящая");

        // No buyer in the pool: the demo buyer steps in.
        let fallback = preview_company(std::slice::from_ref(&real), CompanyRole::Buyer);
        assert_eq!(fallback.name, "ИП Иванов И.И.");
    }

    #[test]
    fn test_demo_lines_reference_demo_products() {
        let products = demo_products();
        for line in demo_lines() {
            assert!(crate::types::find_product(&products, &line.product_id).is_some());
        }
    }
}
