//! # XML Export
//!
//! Serializes an aggregated document into the fixed exchange tree:
//!
//! ```text
//! <Invoice | Act | UPD>
//!   <Number/> <Date/> <Currency/>
//!   [<ContractNumber/> <ContractDate/>]   acts
//!   [<Status/>]                           UPDs
//!   <Seller> Name INN KPP Bank BIK RS KS </Seller>
//!   <Buyer> Name INN KPP </Buyer>
//!   <Lines> <Line> Number Name Quantity Price VAT VATAmount Total </Line>… </Lines>
//!   <Total/> <TotalVAT/>
//! </…>
//! ```
//!
//! Monetary values are raw minor units (kopecks); dates are ISO
//! `yyyy-mm-dd`. Serialization is serde-driven through quick-xml.

use serde::Serialize;

use crate::aggregate::aggregate_document;
use crate::types::{Company, DocDetails, DocKind, Document, Product};

use super::ExportError;

// =============================================================================
// Wire Structures
// =============================================================================

#[derive(Debug, Serialize)]
struct XmlSeller {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "INN")]
    inn: String,
    #[serde(rename = "KPP")]
    kpp: String,
    #[serde(rename = "Bank")]
    bank: String,
    #[serde(rename = "BIK")]
    bik: String,
    #[serde(rename = "RS")]
    rs: String,
    #[serde(rename = "KS")]
    ks: String,
}

#[derive(Debug, Serialize)]
struct XmlBuyer {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "INN")]
    inn: String,
    #[serde(rename = "KPP")]
    kpp: String,
}

#[derive(Debug, Serialize)]
struct XmlLine {
    #[serde(rename = "Number")]
    number: usize,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "Price")]
    price: i64,
    #[serde(rename = "VAT")]
    vat: u8,
    #[serde(rename = "VATAmount")]
    vat_amount: i64,
    #[serde(rename = "Total")]
    total: i64,
}

#[derive(Debug, Serialize)]
struct XmlLines {
    #[serde(rename = "Line")]
    lines: Vec<XmlLine>,
}

/// The document tree; field order is the element order on the wire.
#[derive(Debug, Serialize)]
struct XmlDoc {
    #[serde(rename = "Number")]
    number: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Currency")]
    currency: &'static str,
    #[serde(rename = "ContractNumber", skip_serializing_if = "Option::is_none")]
    contract_number: Option<String>,
    #[serde(rename = "ContractDate", skip_serializing_if = "Option::is_none")]
    contract_date: Option<String>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(rename = "Seller")]
    seller: XmlSeller,
    #[serde(rename = "Buyer")]
    buyer: XmlBuyer,
    #[serde(rename = "Lines")]
    lines: XmlLines,
    #[serde(rename = "Total")]
    total: i64,
    #[serde(rename = "TotalVAT")]
    total_vat: i64,
}

// =============================================================================
// Encoding
// =============================================================================

fn root_tag(kind: DocKind) -> &'static str {
    match kind {
        DocKind::Invoice => "Invoice",
        DocKind::Act => "Act",
        DocKind::Upd => "UPD",
    }
}

/// Serializes a document to XML text with declaration.
///
/// Missing counterparties degrade to empty elements - an export is a
/// data dump, not a legal print, so it never short-circuits.
pub fn document_xml(
    doc: &Document,
    companies: &[Company],
    products: &[Product],
) -> Result<String, ExportError> {
    let data = aggregate_document(doc, companies, products);

    let (contract_number, contract_date, status) = match &doc.details {
        DocDetails::Invoice {} => (None, None, None),
        DocDetails::Act {
            contract_number,
            contract_date,
        } => {
            if contract_number.is_empty() {
                (None, None, None)
            } else {
                (
                    Some(contract_number.clone()),
                    contract_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    None,
                )
            }
        }
        DocDetails::Upd { status, .. } => (None, None, Some(status.code())),
    };

    let tree = XmlDoc {
        number: doc.number.clone(),
        date: doc.date.format("%Y-%m-%d").to_string(),
        currency: doc.currency.code(),
        contract_number,
        contract_date,
        status,
        seller: XmlSeller {
            name: data.seller.map(|c| c.name.clone()).unwrap_or_default(),
            inn: data.seller.map(|c| c.inn.clone()).unwrap_or_default(),
            kpp: data.seller.map(|c| c.kpp.clone()).unwrap_or_default(),
            bank: data.seller.map(|c| c.bank.clone()).unwrap_or_default(),
            bik: data.seller.map(|c| c.bik.clone()).unwrap_or_default(),
            rs: data.seller.map(|c| c.rs.clone()).unwrap_or_default(),
            ks: data.seller.map(|c| c.ks.clone()).unwrap_or_default(),
        },
        buyer: XmlBuyer {
            name: data.buyer.map(|c| c.name.clone()).unwrap_or_default(),
            inn: data.buyer.map(|c| c.inn.clone()).unwrap_or_default(),
            kpp: data.buyer.map(|c| c.kpp.clone()).unwrap_or_default(),
        },
        lines: XmlLines {
            lines: data
                .rows
                .iter()
                .enumerate()
                .map(|(i, r)| XmlLine {
                    number: i + 1,
                    name: r.name.clone(),
                    quantity: r.quantity,
                    price: r.price.kopecks(),
                    vat: r.vat.percent(),
                    vat_amount: r.vat_amount.kopecks(),
                    total: r.total.kopecks(),
                })
                .collect(),
        },
        total: data.totals.total.kopecks(),
        total_vat: data.totals.vat.kopecks(),
    };

    let mut body = String::new();
    let mut ser = quick_xml::se::Serializer::with_root(&mut body, Some(root_tag(doc.kind())))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    ser.indent(' ', 2);
    tree.serialize(ser)
        .map_err(|e| ExportError::Xml(e.to_string()))?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"))
}

// =============================================================================
// Unit Tests
// =============================================================================
