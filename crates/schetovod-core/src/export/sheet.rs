//! # Spreadsheet Grid Builder
//!
//! Builds the 2-D array of cells (plus column width hints) that the
//! workbook encoder collaborator turns into a binary .xlsx.
//!
//! ## Collaborator Contract
//! ```text
//! core:  document ──► Spreadsheet { sheet_name, column_widths, rows }
//! host:  Spreadsheet ──► SpreadsheetEncoder::encode ──► .xlsx bytes
//! ```
//!
//! The grid layout per document kind is fixed: a title row, the
//! counterparty requisite rows, the line-item table and the trailing
//! totals rows, in exactly this order. Monetary cells carry the
//! locale-formatted string; counts and row numbers stay numeric.

use crate::aggregate::aggregate_document;
use crate::money::format_money;
use crate::types::{format_date, Company, DocDetails, Document, Product};

use super::ExportError;

// =============================================================================
// Grid Model
// =============================================================================

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

/// A ready-to-encode worksheet: name, column width hints, row grid.
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub sheet_name: String,
    /// Width hints in characters, one per column.
    pub column_widths: Vec<f64>,
    pub rows: Vec<Vec<Cell>>,
}

/// The external workbook encoder (implemented by the host with a real
/// xlsx library; tests use stubs).
pub trait SpreadsheetEncoder {
    /// Encodes the worksheet into workbook bytes.
    fn encode(&self, sheet: &Spreadsheet) -> Result<Vec<u8>, ExportError>;
}

// =============================================================================
// Grid Builders
// =============================================================================

fn name_of(company: Option<&Company>) -> String {
    company.map(|c| c.name.clone()).unwrap_or_default()
}

fn field_of(company: Option<&Company>, pick: fn(&Company) -> &str) -> String {
    company.map(|c| pick(c).to_string()).unwrap_or_default()
}

/// Builds the worksheet for any document kind.
pub fn document_sheet(doc: &Document, companies: &[Company], products: &[Product]) -> Spreadsheet {
    match &doc.details {
        DocDetails::Invoice {} => invoice_sheet(doc, companies, products),
        DocDetails::Act { .. } => act_sheet(doc, companies, products),
        DocDetails::Upd { .. } => upd_sheet(doc, companies, products),
    }
}

/// Invoice grid: full bank requisites for the seller, nine-column line
/// table, three totals rows.
pub fn invoice_sheet(doc: &Document, companies: &[Company], products: &[Product]) -> Spreadsheet {
    let data = aggregate_document(doc, companies, products);
    let cur = doc.currency;
    let money = |m| Cell::Text(format_money(m, cur));
    let seller = data.seller;
    let buyer = data.buyer;

    let mut rows: Vec<Vec<Cell>> = vec![
        vec![Cell::Text(format!(
            "Счет на оплату №{} от {}",
            doc.number,
            format_date(doc.date)
        ))],
        vec![],
        vec!["Продавец:".into(), name_of(seller).into()],
        vec![
            "ИНН:".into(),
            field_of(seller, |c| &c.inn).into(),
            "КПП:".into(),
            field_of(seller, |c| &c.kpp).into(),
        ],
        vec![
            "Банк:".into(),
            field_of(seller, |c| &c.bank).into(),
            "БИК:".into(),
            field_of(seller, |c| &c.bik).into(),
        ],
        vec![
            "Р/с:".into(),
            field_of(seller, |c| &c.rs).into(),
            "К/с:".into(),
            field_of(seller, |c| &c.ks).into(),
        ],
        vec![],
        vec!["Покупатель:".into(), name_of(buyer).into()],
        vec![
            "ИНН:".into(),
            field_of(buyer, |c| &c.inn).into(),
            "КПП:".into(),
            field_of(buyer, |c| &c.kpp).into(),
        ],
        vec![],
        vec![
            "№".into(),
            "Наименование".into(),
            "Ед.".into(),
            "Кол-во".into(),
            "Цена".into(),
            "Сумма без НДС".into(),
            "НДС".into(),
            "Сумма НДС".into(),
            "Всего".into(),
        ],
    ];

    for (i, r) in data.rows.iter().enumerate() {
        rows.push(vec![
            Cell::Int(i as i64 + 1),
            r.name.clone().into(),
            r.unit.clone().into(),
            Cell::Int(r.quantity),
            money(r.price),
            money(r.net),
            r.vat.to_string().into(),
            money(r.vat_amount),
            money(r.total),
        ]);
    }

    rows.push(vec![]);
    for (label, amount) in [
        ("Итого без НДС:", data.totals.net),
        ("НДС:", data.totals.vat),
        ("Всего:", data.totals.total),
    ] {
        let mut row = vec![Cell::Empty; 7];
        row.push(label.into());
        row.push(money(amount));
        rows.push(row);
    }

    Spreadsheet {
        sheet_name: "Счет".to_string(),
        column_widths: vec![5.0, 30.0, 6.0, 8.0, 14.0, 14.0, 6.0, 14.0, 16.0],
        rows,
    }
}

/// Act grid: contract line, six-column table, VAT and total rows.
pub fn act_sheet(doc: &Document, companies: &[Company], products: &[Product]) -> Spreadsheet {
    let data = aggregate_document(doc, companies, products);
    let cur = doc.currency;
    let money = |m| Cell::Text(format_money(m, cur));

    let mut rows: Vec<Vec<Cell>> = vec![vec![Cell::Text(format!(
        "Акт №{} от {}",
        doc.number,
        format_date(doc.date)
    ))]];
    if let DocDetails::Act {
        contract_number,
        contract_date,
    } = &doc.details
    {
        if !contract_number.is_empty() {
            let when = contract_date.map(format_date).unwrap_or_else(|| "___".to_string());
            rows.push(vec![Cell::Text(format!(
                "К договору №{contract_number} от {when}"
            ))]);
        }
    }
    rows.extend([
        vec![],
        vec!["Исполнитель:".into(), name_of(data.seller).into()],
        vec!["Заказчик:".into(), name_of(data.buyer).into()],
        vec![],
        vec![
            "№".into(),
            "Наименование".into(),
            "Ед.".into(),
            "Кол-во".into(),
            "Цена".into(),
            "Сумма".into(),
        ],
    ]);

    for (i, r) in data.rows.iter().enumerate() {
        rows.push(vec![
            Cell::Int(i as i64 + 1),
            r.name.clone().into(),
            r.unit.clone().into(),
            Cell::Int(r.quantity),
            money(r.price),
            money(r.total),
        ]);
    }

    rows.push(vec![]);
    let mut row = vec![Cell::Empty; 4];
    row.push("НДС:".into());
    row.push(money(data.totals.vat));
    rows.push(row);
    let mut row = vec![Cell::Empty; 4];
    row.push("Итого:".into());
    row.push(money(data.totals.total));
    rows.push(row);

    Spreadsheet {
        sheet_name: "Акт".to_string(),
        column_widths: vec![5.0, 35.0, 6.0, 8.0, 15.0, 18.0],
        rows,
    }
}

/// UPD grid: status line, nine-column table, three totals rows.
pub fn upd_sheet(doc: &Document, companies: &[Company], products: &[Product]) -> Spreadsheet {
    let data = aggregate_document(doc, companies, products);
    let cur = doc.currency;
    let money = |m| Cell::Text(format_money(m, cur));

    let status = match &doc.details {
        DocDetails::Upd { status, .. } => status.code(),
        _ => "",
    };
    let mut rows: Vec<Vec<Cell>> = vec![
        vec![Cell::Text(format!(
            "УПД №{} от {}",
            doc.number,
            format_date(doc.date)
        ))],
        vec![Cell::Text(format!("Статус: {status}"))],
        vec![],
        vec!["Продавец:".into(), name_of(data.seller).into()],
        vec!["Покупатель:".into(), name_of(data.buyer).into()],
        vec![],
        vec![
            "№".into(),
            "Наименование".into(),
            "Ед.".into(),
            "Кол-во".into(),
            "Цена".into(),
            "Без НДС".into(),
            "НДС%".into(),
            "Сумма НДС".into(),
            "С НДС".into(),
        ],
    ];

    for (i, r) in data.rows.iter().enumerate() {
        rows.push(vec![
            Cell::Int(i as i64 + 1),
            r.name.clone().into(),
            r.unit.clone().into(),
            Cell::Int(r.quantity),
            money(r.price),
            money(r.net),
            r.vat.to_string().into(),
            money(r.vat_amount),
            money(r.total),
        ]);
    }

    rows.push(vec![]);
    for (label, amount) in [
        ("Без НДС:", data.totals.net),
        ("НДС:", data.totals.vat),
        ("Итого:", data.totals.total),
    ] {
        let mut row = vec![Cell::Empty; 7];
        row.push(label.into());
        row.push(money(amount));
        rows.push(row);
    }

    Spreadsheet {
        sheet_name: "УПД".to_string(),
        column_widths: vec![5.0, 30.0, 6.0, 8.0, 14.0, 14.0, 6.0, 14.0, 16.0],
        rows,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{demo_lines, demo_products, seed_companies};
    use crate::types::{
        CompanyId, Currency, DocumentId, UpdStatus,
    };
    use chrono::NaiveDate;

    fn doc(details: DocDetails) -> Document {
        Document {
            id: DocumentId::new("d1"),
            number: "0042".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            seller_id: CompanyId::new("c1"),
            buyer_id: CompanyId::new("c2"),
            lines: demo_lines(),
            currency: Currency::Rub,
            details,
        }
    }

    fn text(cell: &Cell) -> &str {
        match cell {
            Cell::Text(s) => s,
            _ => panic!("expected text cell, got {cell:?}"),
        }
    }

    #[test]
    fn test_invoice_grid_layout() {
        let companies = seed_companies();
        let sheet = invoice_sheet(&doc(DocDetails::Invoice {}), &companies, &demo_products());

        assert_eq!(sheet.sheet_name, "Счет");
        assert_eq!(sheet.column_widths.len(), 9);
        assert_eq!(text(&sheet.rows[0][0]), "Счет на оплату №0042 от 15.03.2024");
        assert_eq!(text(&sheet.rows[2][0]), "Продавец:");
        assert_eq!(text(&sheet.rows[2][1]), "ООО \"Ромашка\"");
        // Header row sits right after the blank separator.
        assert_eq!(text(&sheet.rows[10][0]), "№");
        // Two line rows follow, then blank, then three totals rows.
        assert_eq!(sheet.rows[11][0], Cell::Int(1));
        assert_eq!(sheet.rows[12][0], Cell::Int(2));
        assert!(sheet.rows[13].is_empty());
        assert_eq!(text(&sheet.rows[14][7]), "Итого без НДС:");
        assert_eq!(text(&sheet.rows[16][7]), "Всего:");
        assert_eq!(text(&sheet.rows[16][8]), "160\u{a0}000,00 ₽");
    }

    #[test]
    fn test_invoice_grid_tolerates_missing_seller() {
        let sheet = invoice_sheet(&doc(DocDetails::Invoice {}), &[], &demo_products());
        assert_eq!(text(&sheet.rows[2][1]), "");
    }

    #[test]
    fn test_act_grid_contract_row() {
        let companies = seed_companies();
        let with = act_sheet(
            &doc(DocDetails::Act {
                contract_number: "Д-7".to_string(),
                contract_date: NaiveDate::from_ymd_opt(2024, 1, 20),
            }),
            &companies,
            &demo_products(),
        );
        assert_eq!(text(&with.rows[1][0]), "К договору №Д-7 от 20.01.2024");

        let without = act_sheet(
            &doc(DocDetails::Act {
                contract_number: String::new(),
                contract_date: None,
            }),
            &companies,
            &demo_products(),
        );
        assert!(without.rows[1].is_empty());
    }

    #[test]
    fn test_upd_grid_status_row() {
        let sheet = upd_sheet(
            &doc(DocDetails::Upd {
                correction_number: String::new(),
                status: UpdStatus::TransferOnly,
            }),
            &seed_companies(),
            &demo_products(),
        );
        assert_eq!(text(&sheet.rows[1][0]), "Статус: 2");
        assert_eq!(sheet.sheet_name, "УПД");
    }

    #[test]
    fn test_quantities_stay_numeric() {
        let sheet = invoice_sheet(&doc(DocDetails::Invoice {}), &seed_companies(), &demo_products());
        // Row number and quantity are numbers for the workbook encoder.
        assert_eq!(sheet.rows[11][3], Cell::Int(2));
        assert!(matches!(sheet.rows[11][4], Cell::Text(_)));
    }
}
