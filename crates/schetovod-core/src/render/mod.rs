//! # Rendering Engine
//!
//! Turns an aggregated document plus a print template into a complete,
//! self-contained HTML page.
//!
//! ## Two Routine Families
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  render_document(doc, …, Some(template))                                │
//! │      └── templated pipeline (blocks.rs):                                │
//! │          ordered block list, each gated by its toggle                   │
//! │              logo → header → [bank] → title → parties → table →         │
//! │              totals → [words] → [signatures [+stamp]] → [QR] → footer   │
//! │                                                                         │
//! │  render_document(doc, …, None)                                          │
//! │      └── legacy layout (legacy.rs): the fixed 1C-style form with        │
//! │          every block on - bank requisites, QR, signatures, stamp        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each document kind gets its own routine - an invoice, an act and a UPD
//! are structurally different forms, not variations of one table.
//!
//! ## Entry Modes
//! - **document**: counterparties resolved from their ids; if either is
//!   missing the renderer short-circuits to a placeholder page instead of
//!   producing partial markup;
//! - **preview**: synthetic demo data for the template editor; never
//!   touches persisted documents.
//!
//! The only error a render can produce is a structurally corrupt
//! template; dangling references degrade, they do not fail.

mod blocks;
mod legacy;

use chrono::NaiveDate;

use crate::aggregate::{aggregate, aggregate_document, DocRow, DocTotals};
use crate::demo;
use crate::error::TemplateError;
use crate::money::{format_money, Money};
use crate::qr::{payment_payload, QrImageEncoder};
use crate::template::TemplateSettings;
use crate::types::{
    Company, CompanyRole, Currency, DocDetails, DocKind, Document, Product, UpdStatus,
};

// =============================================================================
// Render Context
// =============================================================================

/// Kind-specific header data, decoupled from [`Document`] so the preview
/// can fabricate it without a persisted document.
#[derive(Debug, Clone)]
pub struct DocMeta {
    pub kind: DocKind,
    pub number: String,
    pub date: NaiveDate,
    /// Act only; empty elsewhere.
    pub contract_number: String,
    pub contract_date: Option<NaiveDate>,
    /// UPD only; empty elsewhere.
    pub correction_number: String,
    pub status: UpdStatus,
}

impl DocMeta {
    fn for_document(doc: &Document) -> Self {
        let mut meta = DocMeta {
            kind: doc.kind(),
            number: doc.number.clone(),
            date: doc.date,
            contract_number: String::new(),
            contract_date: None,
            correction_number: String::new(),
            status: UpdStatus::InvoiceAndTransfer,
        };
        match &doc.details {
            DocDetails::Invoice {} => {}
            DocDetails::Act {
                contract_number,
                contract_date,
            } => {
                meta.contract_number = contract_number.clone();
                meta.contract_date = *contract_date;
            }
            DocDetails::Upd {
                correction_number,
                status,
            } => {
                meta.correction_number = correction_number.clone();
                meta.status = *status;
            }
        }
        meta
    }

    fn preview(kind: DocKind, today: NaiveDate) -> Self {
        DocMeta {
            kind,
            number: "0001".to_string(),
            date: today,
            contract_number: String::new(),
            contract_date: None,
            correction_number: String::new(),
            status: UpdStatus::InvoiceAndTransfer,
        }
    }
}

/// A rendered QR artifact: the wire payload and its image data URL.
#[derive(Debug, Clone)]
pub struct QrArt {
    pub payload: String,
    pub data_url: String,
}

/// Everything a block renderer may consult. Borrowed, immutable: block
/// functions are pure formatters.
pub(crate) struct RenderCtx<'a> {
    pub tpl: &'a TemplateSettings,
    pub meta: &'a DocMeta,
    pub seller: &'a Company,
    pub buyer: &'a Company,
    pub rows: &'a [DocRow],
    pub totals: DocTotals,
    pub currency: Currency,
    pub qr: Option<QrArt>,
}

impl RenderCtx<'_> {
    /// Shorthand: money in the document's currency.
    pub(crate) fn money(&self, amount: Money) -> String {
        format_money(amount, self.currency)
    }
}

// =============================================================================
// Page Assembly
// =============================================================================

/// Placeholder page returned when a counterparty reference dangles.
pub const MISSING_COUNTERPARTY_HTML: &str = "<p>Не указан продавец или покупатель</p>";

/// The per-template stylesheet. Every size is derived from the
/// template's typography fields by fixed offsets; nothing else feeds it.
fn css(tpl: &TemplateSettings) -> String {
    format!(
        "\n  * {{ margin: 0; padding: 0; box-sizing: border-box; }}\n  \
         body {{ font-family: '{font}', serif; font-size: {fs}px; color: #000; padding: {margin}mm; line-height: 1.3; }}\n  \
         table {{ width: 100%; border-collapse: collapse; }}\n  \
         .bordered td, .bordered th {{ border: 1px solid #000; padding: 3px 5px; font-size: {cell}px; }}\n  \
         .bordered th {{ background: {bg}; font-weight: bold; text-align: center; font-size: {th}px; }}\n  \
         .right {{ text-align: right; }}\n  \
         .center {{ text-align: center; }}\n  \
         .bold {{ font-weight: bold; }}\n  \
         .title {{ font-size: {title}px; font-weight: bold; text-align: center; margin: 8px 0; }}\n  \
         .subtitle {{ font-size: {fs}px; text-align: center; margin-bottom: 10px; }}\n  \
         .bank-block {{ margin-bottom: 10px; }}\n  \
         .bank-block td {{ padding: 2px 5px; font-size: {cell}px; vertical-align: top; }}\n  \
         .bank-block .header-cell {{ font-size: {fine}px; color: #666; }}\n  \
         .sign-block {{ margin-top: 20px; }}\n  \
         .sign-block td {{ padding: 4px 0; border: none; vertical-align: bottom; }}\n  \
         .sign-line {{ border-bottom: 1px solid #000; min-width: 150px; display: inline-block; }}\n  \
         .small {{ font-size: {fine}px; color: #666; }}\n  \
         .qr-block {{ margin-top: 15px; display: flex; align-items: flex-start; gap: 10px; }}\n  \
         .qr-block img {{ width: 120px; height: 120px; }}\n  \
         hr.thick {{ border: none; border-top: 2px solid #000; margin: 2px 0; }}\n  \
         hr.thin {{ border: none; border-top: 1px solid #000; margin: 1px 0; }}\n  \
         .totals-row td {{ border: none !important; padding: 2px 5px; font-size: {cell}px; }}\n  \
         .logo {{ max-height: 50px; margin-bottom: 5px; }}\n  \
         .header-text {{ font-size: {cell}px; color: #333; margin-bottom: 8px; white-space: pre-line; }}\n  \
         .footer-text {{ font-size: {th}px; color: #666; margin-top: 15px; border-top: 1px solid #ccc; padding-top: 8px; white-space: pre-line; }}\n  \
         @media print {{ body {{ padding: 5mm; }} }}\n  \
         @page {{ size: A4; margin: 10mm; }}\n  ",
        font = tpl.font,
        fs = tpl.font_size,
        margin = tpl.page_margin,
        cell = tpl.table_cell_size(),
        th = tpl.table_header_size(),
        fine = tpl.footnote_size(),
        bg = tpl.table_header_bg,
        title = tpl.title_font_size,
    )
}

/// Wraps a body into a complete printable page: doctype, charset,
/// inline stylesheet. No external resources.
fn wrap_html(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{style}</style></head><body>{body}</body></html>"
    )
}

// =============================================================================
// Entry Points
// =============================================================================

/// Renders a document bound to real catalog snapshots.
///
/// With a template, the templated block pipeline runs; without one, the
/// built-in legacy layout for the document's kind. A dangling seller or
/// buyer reference short-circuits to [`MISSING_COUNTERPARTY_HTML`].
///
/// ## Errors
/// Only a structurally corrupt (or wrong-kind) template fails.
pub fn render_document(
    doc: &Document,
    companies: &[Company],
    products: &[Product],
    tpl: Option<&TemplateSettings>,
    qr_encoder: &dyn QrImageEncoder,
) -> Result<String, TemplateError> {
    let kind = doc.kind();
    if let Some(t) = tpl {
        t.validate()?;
        if t.doc_type != kind {
            return Err(TemplateError::KindMismatch {
                template: t.name.clone(),
                expected: t.doc_type,
                actual: kind,
            });
        }
    }

    let data = aggregate_document(doc, companies, products);
    let (seller, buyer) = match (data.seller, data.buyer) {
        (Some(s), Some(b)) => (s, b),
        _ => return Ok(MISSING_COUNTERPARTY_HTML.to_string()),
    };

    let meta = DocMeta::for_document(doc);
    let want_qr = kind == DocKind::Invoice && tpl.map_or(true, |t| t.show_qr);
    let qr = if want_qr {
        make_qr(seller, data.totals.total, &meta, qr_encoder)
    } else {
        None
    };

    Ok(match tpl {
        Some(t) => {
            let ctx = RenderCtx {
                tpl: t,
                meta: &meta,
                seller,
                buyer,
                rows: &data.rows,
                totals: data.totals,
                currency: doc.currency,
                qr,
            };
            wrap_html(&t.name, &css(t), &blocks::render_body(&ctx))
        }
        None => {
            let ctx = legacy::LegacyCtx {
                meta: &meta,
                seller,
                buyer,
                rows: &data.rows,
                totals: data.totals,
                currency: doc.currency,
                qr,
            };
            let title = format!("{} №{}", kind.label(), meta.number);
            wrap_html(&title, &legacy::print_css(), &legacy::render_body(&ctx))
        }
    })
}

/// Renders the template editor's live preview from synthetic data.
///
/// Real companies of the matching role are preferred; the fixed demo
/// pair fills in otherwise. `today` is supplied by the caller so the
/// engine stays a pure function of its inputs.
pub fn render_preview(
    tpl: &TemplateSettings,
    companies: &[Company],
    today: NaiveDate,
    qr_encoder: &dyn QrImageEncoder,
) -> Result<String, TemplateError> {
    tpl.validate()?;

    let seller = demo::preview_company(companies, CompanyRole::Seller);
    let buyer = demo::preview_company(companies, CompanyRole::Buyer);
    let products = demo::demo_products();
    let lines = demo::demo_lines();
    let data = aggregate(&lines, &products, &[], &seller.id, &buyer.id);

    let meta = DocMeta::preview(tpl.doc_type, today);
    let qr = if tpl.doc_type == DocKind::Invoice && tpl.show_qr {
        make_qr(&seller, data.totals.total, &meta, qr_encoder)
    } else {
        None
    };

    let ctx = RenderCtx {
        tpl,
        meta: &meta,
        seller: &seller,
        buyer: &buyer,
        rows: &data.rows,
        totals: data.totals,
        currency: Currency::Rub,
        qr,
    };
    Ok(wrap_html(&tpl.name, &css(tpl), &blocks::render_body(&ctx)))
}

fn make_qr(
    seller: &Company,
    total: Money,
    meta: &DocMeta,
    encoder: &dyn QrImageEncoder,
) -> Option<QrArt> {
    let payload = payment_payload(seller, total, &meta.number, meta.date);
    let data_url = encoder.data_url(&payload)?;
    Some(QrArt { payload, data_url })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{demo_lines, demo_products, seed_companies};
    use crate::qr::NoQrEncoder;
    use crate::template::standard_templates;
    use crate::types::{CompanyId, DocumentId, TemplateId};

    struct StubQr;
    impl QrImageEncoder for StubQr {
        fn data_url(&self, _payload: &str) -> Option<String> {
            Some("data:image/png;base64,STUB".to_string())
        }
    }

    fn invoice() -> Document {
        Document {
            id: DocumentId::new("d1"),
            number: "0042".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            seller_id: CompanyId::new("c1"),
            buyer_id: CompanyId::new("c2"),
            lines: demo_lines(),
            currency: Currency::Rub,
            details: DocDetails::Invoice {},
        }
    }

    fn act() -> Document {
        Document {
            details: DocDetails::Act {
                contract_number: "Д-7".to_string(),
                contract_date: NaiveDate::from_ymd_opt(2024, 1, 20),
            },
            ..invoice()
        }
    }

    fn upd() -> Document {
        Document {
            details: DocDetails::Upd {
                correction_number: String::new(),
                status: UpdStatus::InvoiceAndTransfer,
            },
            ..invoice()
        }
    }

    fn template(kind: DocKind) -> TemplateSettings {
        TemplateSettings::with_defaults(TemplateId::new("t"), "Тестовый", kind)
    }

    #[test]
    fn test_missing_counterparty_short_circuits() {
        let doc = invoice();
        // No companies in the snapshot: both references dangle.
        let html = render_document(&doc, &[], &demo_products(), None, &NoQrEncoder).unwrap();
        assert_eq!(html, MISSING_COUNTERPARTY_HTML);
        // No partial markup leaked.
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_templated_invoice_uses_real_number_and_date() {
        let html = render_document(
            &invoice(),
            &seed_companies(),
            &demo_products(),
            Some(&template(DocKind::Invoice)),
            &StubQr,
        )
        .unwrap();
        assert!(html.contains("Счет на оплату № 0042 от 15.03.2024"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("charset=\"utf-8\""));
    }

    #[test]
    fn test_all_toggles_off_leaves_title_parties_table() {
        let mut tpl = template(DocKind::Invoice);
        tpl.show_logo = false;
        tpl.show_bank_block = false;
        tpl.show_qr = false;
        tpl.show_signatures = false;
        tpl.show_stamp = false;
        tpl.show_amount_words = false;
        tpl.show_item_numbers = false;

        let html = render_document(
            &invoice(),
            &seed_companies(),
            &demo_products(),
            Some(&tpl),
            &StubQr,
        )
        .unwrap();

        // Still present: title, parties, the line table.
        assert!(html.contains("Счет на оплату № 0042"));
        assert!(html.contains("Поставщик:"));
        assert!(html.contains("class=\"bordered\""));
        assert!(html.contains("Итого:"));
        // Gone: every toggled block.
        assert!(!html.contains("Банк получателя"));
        assert!(!html.contains("qr-block"));
        assert!(!html.contains("Руководитель"));
        assert!(!html.contains("М.П."));
        assert!(!html.contains("рубл"));
        assert!(!html.contains("<th style=\"width:30px;\">№</th>"));
    }

    #[test]
    fn test_toggles_are_independent() {
        // Disabling one block must not disturb another: the bank block
        // markup is identical with and without the QR block.
        let companies = seed_companies();
        let products = demo_products();

        let mut with_qr = template(DocKind::Invoice);
        with_qr.show_qr = true;
        let mut without_qr = template(DocKind::Invoice);
        without_qr.show_qr = false;

        let a = render_document(&invoice(), &companies, &products, Some(&with_qr), &StubQr).unwrap();
        let b =
            render_document(&invoice(), &companies, &products, Some(&without_qr), &StubQr).unwrap();

        let bank = "Банк получателя";
        assert!(a.contains(bank) && b.contains(bank));
        assert!(a.contains("qr-block") && !b.contains("qr-block"));
        // Everything before the QR block is byte-identical.
        let prefix = a.split("<div class=\"qr-block\"").next().unwrap();
        assert!(b.starts_with(prefix));
    }

    #[test]
    fn test_legacy_fallback_has_everything_on() {
        let html =
            render_document(&invoice(), &seed_companies(), &demo_products(), None, &StubQr).unwrap();
        assert!(html.contains("Банк получателя"));
        assert!(html.contains("Руководитель"));
        assert!(html.contains("qr-block"));
        assert!(html.contains("QR-код для оплаты (СТ00012)"));
        assert!(html.contains("рубл"));
        assert!(html.contains("<title>Счет №0042</title>"));
    }

    #[test]
    fn test_act_render_has_narrative_and_no_claims() {
        let html = render_document(
            &act(),
            &seed_companies(),
            &demo_products(),
            Some(&template(DocKind::Act)),
            &NoQrEncoder,
        )
        .unwrap();
        assert!(html.contains("Акт № 0042 от 15.03.2024"));
        assert!(html.contains("Мы, нижеподписавшиеся"));
        assert!(html.contains("Претензий нет"));
        assert!(html.contains("Исполнитель"));
        assert!(html.contains("Заказчик"));
    }

    #[test]
    fn test_upd_render_has_official_field_numbers() {
        let html = render_document(
            &upd(),
            &seed_companies(),
            &demo_products(),
            Some(&template(DocKind::Upd)),
            &NoQrEncoder,
        )
        .unwrap();
        assert!(html.contains("Универсальный передаточный документ"));
        assert!(html.contains("Продавец (1):"));
        assert!(html.contains("ИНН/КПП (6б):"));
        assert!(html.contains("Статус: <b>1</b>"));
        assert!(html.contains("[ II. Передаточный документ ]"));
    }

    #[test]
    fn test_legacy_upd_official_form() {
        let html =
            render_document(&upd(), &seed_companies(), &demo_products(), None, &NoQrEncoder)
                .unwrap();
        assert!(html.contains("Приложение №1 к постановлению Правительства РФ"));
        assert!(html.contains("Основание передачи (10):"));
        assert!(html.contains("Без договора"));
        assert!(html.contains("Валюта (7):"));
        assert!(html.contains("Российский рубль (643)"));
    }

    #[test]
    fn test_legacy_act_contract_subtitle() {
        let html =
            render_document(&act(), &seed_companies(), &demo_products(), None, &NoQrEncoder)
                .unwrap();
        assert!(html.contains("к договору № Д-7 от 20.01.2024"));
        assert!(html.contains("претензий по объему, качеству и срокам"));
    }

    #[test]
    fn test_preview_uses_demo_data_without_companies() {
        let tpl = template(DocKind::Invoice);
        let html = render_preview(
            &tpl,
            &[],
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            &StubQr,
        )
        .unwrap();
        assert!(html.contains("ООО \"Ромашка\""));
        assert!(html.contains("ИП Иванов И.И."));
        assert!(html.contains("Консультация (1 час)"));
        assert!(html.contains("№ 0001 от 01.06.2024"));
    }

    #[test]
    fn test_preview_prefers_real_companies() {
        let mut companies = seed_companies();
        companies[0].name = "ООО Вектор".to_string();
        let tpl = template(DocKind::Invoice);
        let html = render_preview(
            &tpl,
            &companies,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            &NoQrEncoder,
        )
        .unwrap();
        assert!(html.contains("ООО Вектор"));
        assert!(!html.contains("ООО \"Ромашка\""));
    }

    #[test]
    fn test_corrupt_template_fails_loudly() {
        let mut tpl = template(DocKind::Invoice);
        tpl.font = String::new();
        let err = render_document(
            &invoice(),
            &seed_companies(),
            &demo_products(),
            Some(&tpl),
            &NoQrEncoder,
        )
        .unwrap_err();
        assert!(err.to_string().contains("font"));
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let tpl = template(DocKind::Act);
        let err = render_document(
            &invoice(),
            &seed_companies(),
            &demo_products(),
            Some(&tpl),
            &NoQrEncoder,
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::KindMismatch { .. }));
    }

    #[test]
    fn test_missing_product_renders_placeholder_row() {
        let mut doc = invoice();
        doc.lines[0].product_id = crate::types::ProductId::new("deleted");
        let html = render_document(
            &doc,
            &seed_companies(),
            &demo_products(),
            Some(&template(DocKind::Invoice)),
            &NoQrEncoder,
        )
        .unwrap();
        assert!(html.contains("<td>—</td>"));
        // The frozen price still drives the numbers.
        assert!(html.contains("5\u{a0}000,00 ₽"));
    }

    #[test]
    fn test_typography_flows_into_css() {
        let mut tpl = template(DocKind::Invoice);
        tpl.font = "Arial".to_string();
        tpl.font_size = 13;
        tpl.page_margin = 20;
        tpl.table_header_bg = "#ffeecc".to_string();
        let html = render_document(
            &invoice(),
            &seed_companies(),
            &demo_products(),
            Some(&tpl),
            &NoQrEncoder,
        )
        .unwrap();
        assert!(html.contains("font-family: 'Arial', serif"));
        assert!(html.contains("font-size: 13px"));
        assert!(html.contains("padding: 20mm"));
        assert!(html.contains("background: #ffeecc"));
        // Derived sizes: 12px cells, 11px headers, 10px footnotes.
        assert!(html.contains("font-size: 12px"));
        assert!(html.contains("font-size: 11px"));
        assert!(html.contains("font-size: 10px"));
    }

    #[test]
    fn test_standard_templates_render_all_kinds() {
        let companies = seed_companies();
        let products = demo_products();
        for tpl in standard_templates() {
            let doc = match tpl.doc_type {
                DocKind::Invoice => invoice(),
                DocKind::Act => act(),
                DocKind::Upd => upd(),
            };
            let html =
                render_document(&doc, &companies, &products, Some(&tpl), &StubQr).unwrap();
            assert!(html.starts_with("<!DOCTYPE html>"), "{}", tpl.name);
        }
    }
}
