//! # Legacy Layouts
//!
//! The built-in fixed-style renderers used when no template targets a
//! document kind. These reproduce the familiar 1C-like paper forms with
//! every content block present: bank requisites, payment QR, signatures
//! with decoded names, stamp marks, amount in words.
//!
//! Unlike the templated pipelines, nothing here is configurable - the
//! stylesheet is the default template's stylesheet and the inline sizes
//! are the fixed point sizes of the paper originals.

use super::blocks::{inn_kpp_comma, inn_kpp_slash, inn_kpp_spaced};
use super::{css, DocMeta, QrArt};
use crate::aggregate::{DocRow, DocTotals};
use crate::money::{format_money, Money};
use crate::template::TemplateSettings;
use crate::types::{format_date, Company, Currency, DocKind, TemplateId};
use crate::words::amount_in_words;

// =============================================================================
// Context
// =============================================================================

/// Render input for the legacy layouts; no template is involved.
pub(super) struct LegacyCtx<'a> {
    pub meta: &'a DocMeta,
    pub seller: &'a Company,
    pub buyer: &'a Company,
    pub rows: &'a [DocRow],
    pub totals: DocTotals,
    pub currency: Currency,
    pub qr: Option<QrArt>,
}

impl LegacyCtx<'_> {
    fn money(&self, amount: Money) -> String {
        format_money(amount, self.currency)
    }
}

/// The fixed print stylesheet: exactly the default template's styles.
pub(super) fn print_css() -> String {
    let defaults =
        TemplateSettings::with_defaults(TemplateId::new("builtin"), "builtin", DocKind::Invoice);
    css(&defaults)
}

/// Dispatches to the kind's fixed layout.
pub(super) fn render_body(ctx: &LegacyCtx) -> String {
    match ctx.meta.kind {
        DocKind::Invoice => invoice(ctx),
        DocKind::Act => act(ctx),
        DocKind::Upd => upd(ctx),
    }
}

fn sign_or_blank(name: &str) -> &str {
    if name.is_empty() {
        "________________"
    } else {
        name
    }
}

fn name_or_dashes(name: &str) -> &str {
    if name.is_empty() {
        "___"
    } else {
        name
    }
}

// =============================================================================
// Invoice (payment form)
// =============================================================================

fn invoice(ctx: &LegacyCtx) -> String {
    let s = ctx.seller;
    let mut html = format!(
        "<table class=\"bank-block\" style=\"border:2px solid #000;\">\
         <tr><td style=\"width:55%;border-right:2px solid #000;border-bottom:1px solid #000;\" rowspan=\"2\">\
         <div class=\"header-cell\">Банк получателя</div><div class=\"bold\">{bank}</div></td>\
         <td style=\"border-bottom:1px solid #000;\"><div class=\"header-cell\">БИК</div><div>{bik}</div></td></tr>\
         <tr><td><div class=\"header-cell\">Сч. №</div><div>{ks}</div></td></tr>\
         <tr><td style=\"border-right:2px solid #000;border-top:2px solid #000;\">\
         <div class=\"header-cell\">Получатель</div><div class=\"bold\">{name}</div><div>{ids}</div></td>\
         <td style=\"border-top:2px solid #000;\"><div class=\"header-cell\">Сч. №</div>\
         <div class=\"bold\">{rs}</div></td></tr></table>",
        bank = s.bank,
        bik = s.bik,
        ks = s.ks,
        name = s.name,
        ids = inn_kpp_spaced(s),
        rs = s.rs,
    );

    html.push_str(&format!(
        "<div class=\"title\">Счет на оплату № {} от {}</div>\
         <hr class=\"thick\"/><hr class=\"thin\"/>\
         <table style=\"margin:8px 0;\">\
         <tr><td style=\"width:100px;\" class=\"bold\">Поставщик:</td><td>{}, {}, {}</td></tr>\
         <tr><td class=\"bold\">Покупатель:</td><td>{}, {}, {}</td></tr></table>",
        ctx.meta.number,
        format_date(ctx.meta.date),
        s.name,
        inn_kpp_comma(s),
        s.address,
        ctx.buyer.name,
        inn_kpp_comma(ctx.buyer),
        ctx.buyer.address,
    ));

    html.push_str(
        "<table class=\"bordered\"><thead><tr>\
         <th style=\"width:30px;\">№</th>\
         <th>Наименование товара, работы, услуги</th>\
         <th style=\"width:40px;\">Ед.</th><th style=\"width:45px;\">Кол-во</th>\
         <th style=\"width:75px;\">Цена</th><th style=\"width:80px;\">Сумма</th>\
         <th style=\"width:40px;\">НДС</th><th style=\"width:75px;\">Сумма НДС</th>\
         <th style=\"width:85px;\">Всего</th></tr></thead><tbody>",
    );
    for (i, r) in ctx.rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td class=\"center\">{}</td><td>{}</td><td class=\"center\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td>\
             <td class=\"center\">{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
            i + 1,
            r.name,
            r.unit,
            r.quantity,
            ctx.money(r.price),
            ctx.money(r.net),
            r.vat,
            ctx.money(r.vat_amount),
            ctx.money(r.total),
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(&format!(
        "<table>\
         <tr class=\"totals-row\"><td colspan=\"7\"></td>\
         <td class=\"right bold\" style=\"width:160px;\">Итого:</td>\
         <td class=\"right bold\" style=\"width:85px;\">{net}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"7\"></td>\
         <td class=\"right bold\">В том числе НДС:</td><td class=\"right bold\">{vat}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"7\"></td>\
         <td class=\"right bold\">Всего к оплате:</td><td class=\"right bold\">{total}</td></tr></table>\
         <p style=\"margin:10px 0;font-size:11px;\">Всего наименований {count}, на сумму {total}</p>\
         <p style=\"margin-bottom:15px;font-size:11px;font-weight:bold;\">{words}</p>",
        net = ctx.money(ctx.totals.net),
        vat = ctx.money(ctx.totals.vat),
        total = ctx.money(ctx.totals.total),
        count = ctx.rows.len(),
        words = amount_in_words(ctx.totals.total.kopecks()),
    ));

    html.push_str(&format!(
        "<hr class=\"thin\"/><table class=\"sign-block\" style=\"width:100%;\"><tr>\
         <td style=\"width:50%;\"><span class=\"bold\">Руководитель</span> \
         <span class=\"sign-line\"></span> / {} /</td>\
         <td><span class=\"bold\">Бухгалтер</span> <span class=\"sign-line\"></span> / {} /</td>\
         </tr></table>",
        sign_or_blank(&s.director),
        sign_or_blank(&s.accountant),
    ));

    if let Some(qr) = &ctx.qr {
        html.push_str(&format!(
            "<div class=\"qr-block\"><img src=\"{}\"/><div>\
             <p class=\"bold\">QR-код для оплаты (СТ00012)</p><p>Сумма: {}</p></div></div>",
            qr.data_url,
            ctx.money(ctx.totals.total),
        ));
    }
    html
}

// =============================================================================
// Act (work acceptance)
// =============================================================================

fn act(ctx: &LegacyCtx) -> String {
    let mut html = format!(
        "<div class=\"title\">Акт № {} от {}</div>",
        ctx.meta.number,
        format_date(ctx.meta.date)
    );
    if !ctx.meta.contract_number.is_empty() {
        let contract_date = ctx
            .meta
            .contract_date
            .map(format_date)
            .unwrap_or_else(|| "___".to_string());
        html.push_str(&format!(
            "<div class=\"subtitle\">к договору № {} от {}</div>",
            ctx.meta.contract_number, contract_date
        ));
    }

    html.push_str(&format!(
        "<hr class=\"thick\"/><hr class=\"thin\"/>\
         <table style=\"margin:8px 0;\">\
         <tr><td style=\"width:100px;\" class=\"bold\">Исполнитель:</td><td>{}, {}, {}</td></tr>\
         <tr><td class=\"bold\">Заказчик:</td><td>{}, {}, {}</td></tr></table>\
         <p style=\"margin:8px 0;\">Мы, нижеподписавшиеся, Исполнитель — {} в лице {}, \
         с одной стороны, и Заказчик — {} в лице {}, с другой стороны, составили настоящий \
         Акт о том, что Исполнителем были выполнены следующие работы/оказаны услуги:</p>",
        ctx.seller.name,
        inn_kpp_comma(ctx.seller),
        ctx.seller.address,
        ctx.buyer.name,
        inn_kpp_comma(ctx.buyer),
        ctx.buyer.address,
        ctx.seller.name,
        name_or_dashes(&ctx.seller.director),
        ctx.buyer.name,
        name_or_dashes(&ctx.buyer.director),
    ));

    html.push_str(
        "<table class=\"bordered\"><thead><tr>\
         <th style=\"width:30px;\">№</th><th>Наименование работы, услуги</th>\
         <th style=\"width:40px;\">Ед.</th><th style=\"width:50px;\">Кол-во</th>\
         <th style=\"width:80px;\">Цена</th><th style=\"width:90px;\">Сумма</th>\
         </tr></thead><tbody>",
    );
    for (i, r) in ctx.rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td class=\"center\">{}</td><td>{}</td><td class=\"center\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
            i + 1,
            r.name,
            r.unit,
            r.quantity,
            ctx.money(r.price),
            ctx.money(r.total),
        ));
    }
    html.push_str("</tbody></table>");

    // The rate shown next to "НДС" follows the first line, as the paper
    // form assumes a uniform rate per act.
    let shown_rate = ctx.rows.first().map(|r| r.vat.percent()).unwrap_or(20);
    html.push_str(&format!(
        "<table>\
         <tr class=\"totals-row\"><td colspan=\"4\"></td>\
         <td class=\"right bold\" style=\"width:100px;\">Итого:</td>\
         <td class=\"right bold\" style=\"width:90px;\">{net}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"4\"></td>\
         <td class=\"right bold\">НДС ({rate}%):</td><td class=\"right bold\">{vat}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"4\"></td>\
         <td class=\"right bold\">Всего:</td><td class=\"right bold\">{total}</td></tr></table>\
         <p style=\"margin:10px 0;font-size:11px;\">Всего оказано услуг на сумму: <b>{words}</b></p>\
         <p style=\"margin:5px 0;\">Вышеперечисленные работы (услуги) выполнены полностью и в срок. \
         Заказчик претензий по объему, качеству и срокам оказания услуг не имеет.</p>",
        net = ctx.money(ctx.totals.net),
        rate = shown_rate,
        vat = ctx.money(ctx.totals.vat),
        total = ctx.money(ctx.totals.total),
        words = amount_in_words(ctx.totals.total.kopecks()),
    ));

    html.push_str(&format!(
        "<hr class=\"thin\" style=\"margin-top:15px;\"/>\
         <table class=\"sign-block\" style=\"width:100%;\"><tr>\
         <td style=\"width:50%;padding-right:20px;\">\
         <p class=\"bold\" style=\"margin-bottom:20px;\">Исполнитель:</p><p>{seller}</p><br/>\
         <p><span class=\"sign-line\"></span> / {seller_sign} /</p>\
         <p class=\"small\">подпись</p><br/><p>М.П.</p></td>\
         <td style=\"padding-left:20px;\">\
         <p class=\"bold\" style=\"margin-bottom:20px;\">Заказчик:</p><p>{buyer}</p><br/>\
         <p><span class=\"sign-line\"></span> / {buyer_sign} /</p>\
         <p class=\"small\">подпись</p><br/><p>М.П.</p></td></tr></table>",
        seller = ctx.seller.name,
        seller_sign = sign_or_blank(&ctx.seller.director),
        buyer = ctx.buyer.name,
        buyer_sign = sign_or_blank(&ctx.buyer.director),
    ));
    html
}

// =============================================================================
// UPD (universal transfer document)
// =============================================================================

fn upd(ctx: &LegacyCtx) -> String {
    let mut html = format!(
        "<div style=\"text-align:right;font-size:10px;margin-bottom:5px;\">\
         Статус: <b>{}</b> — {}</div>\
         <table style=\"margin-bottom:5px;\"><tr><td colspan=\"2\" \
         style=\"text-align:center;font-size:9px;color:#666;\">\
         Приложение №1 к постановлению Правительства РФ от 26.12.2011 №1137</td></tr></table>\
         <div class=\"title\" style=\"font-size:12px;\">Универсальный передаточный документ</div>\
         <table style=\"margin-bottom:5px;\">\
         <tr><td class=\"bold\" style=\"width:200px;\">Счёт-фактура №</td><td>{} от {}</td></tr>",
        ctx.meta.status.code(),
        ctx.meta.status.label(),
        ctx.meta.number,
        format_date(ctx.meta.date),
    );
    if !ctx.meta.correction_number.is_empty() {
        html.push_str(&format!(
            "<tr><td class=\"bold\">Исправление №</td><td>{}</td></tr>",
            ctx.meta.correction_number
        ));
    }
    html.push_str("</table><hr class=\"thick\"/>");

    html.push_str(&format!(
        "<table style=\"margin:5px 0;font-size:10px;\">\
         <tr><td class=\"bold\" style=\"width:130px;\">Продавец (1):</td><td>{sname}</td></tr>\
         <tr><td class=\"bold\">Адрес (2):</td><td>{saddr}</td></tr>\
         <tr><td class=\"bold\">ИНН/КПП (2б):</td><td>{sids}</td></tr>\
         <tr><td class=\"bold\">Покупатель (6):</td><td>{bname}</td></tr>\
         <tr><td class=\"bold\">Адрес (6а):</td><td>{baddr}</td></tr>\
         <tr><td class=\"bold\">ИНН/КПП (6б):</td><td>{bids}</td></tr>\
         <tr><td class=\"bold\">Валюта (7):</td><td>{currency}</td></tr></table>",
        sname = ctx.seller.name,
        saddr = ctx.seller.address,
        sids = inn_kpp_slash(ctx.seller),
        bname = ctx.buyer.name,
        baddr = ctx.buyer.address,
        bids = inn_kpp_slash(ctx.buyer),
        currency = ctx.currency.official_name(),
    ));

    html.push_str(
        "<table class=\"bordered\"><thead><tr>\
         <th style=\"width:20px;font-size:8px;\">А</th>\
         <th style=\"width:25px;\">№<br/>(1)</th>\
         <th>Наименование товара<br/>(описание работ, услуг) (1а)</th>\
         <th style=\"width:35px;\">Ед.<br/>(2а)</th>\
         <th style=\"width:40px;\">Кол-во<br/>(3)</th>\
         <th style=\"width:70px;\">Цена<br/>(4)</th>\
         <th style=\"width:75px;\">Стоимость без НДС<br/>(5)</th>\
         <th style=\"width:35px;\">Ставка<br/>НДС (7)</th>\
         <th style=\"width:70px;\">Сумма НДС<br/>(8)</th>\
         <th style=\"width:80px;\">Стоимость с НДС<br/>(9)</th></tr></thead><tbody>",
    );
    for (i, r) in ctx.rows.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td class=\"center\" style=\"font-size:9px;\">1</td>\
             <td class=\"center\">{}</td><td>{}</td><td class=\"center\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td>\
             <td class=\"center\">{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
            i + 1,
            r.name,
            r.unit,
            r.quantity,
            ctx.money(r.price),
            ctx.money(r.net),
            r.vat,
            ctx.money(r.vat_amount),
            ctx.money(r.total),
        ));
    }
    html.push_str(&format!(
        "<tr class=\"bold\"><td colspan=\"6\" class=\"right\">Всего к оплате:</td>\
         <td class=\"right\">{net}</td><td class=\"center\">X</td>\
         <td class=\"right\">{vat}</td><td class=\"right\">{total}</td></tr></tbody></table>",
        net = ctx.money(ctx.totals.net),
        vat = ctx.money(ctx.totals.vat),
        total = ctx.money(ctx.totals.total),
    ));

    let basis = if ctx.meta.correction_number.is_empty() {
        "Без договора".to_string()
    } else {
        format!("Договор №{}", ctx.meta.correction_number)
    };
    html.push_str(&format!(
        "<hr class=\"thick\" style=\"margin-top:10px;\"/>\
         <div style=\"font-size:10px;text-align:center;margin:5px 0;font-weight:bold;\">\
         [ II. Передаточный документ (акт) ]</div>\
         <table style=\"margin:5px 0;font-size:10px;\">\
         <tr><td class=\"bold\" style=\"width:250px;\">Основание передачи (10):</td><td>{basis}</td></tr>\
         <tr><td class=\"bold\">Данные о транспортировке (11):</td><td>—</td></tr></table>\
         <p style=\"margin:10px 0;font-size:11px;\">Всего к оплате: <b>{words}</b></p><hr class=\"thin\"/>",
        basis = basis,
        words = amount_in_words(ctx.totals.total.kopecks()),
    ));

    html.push_str(&format!(
        "<table class=\"sign-block\" style=\"width:100%;\"><tr>\
         <td style=\"width:50%;padding-right:15px;vertical-align:top;\">\
         <p class=\"bold\" style=\"margin-bottom:8px;\">Товар (груз) передал / услугу оказал:</p>\
         <p>{seller}</p><br/><p><span class=\"sign-line\"></span> / {seller_sign} /</p>\
         <p class=\"small\">подпись, дата</p><p style=\"margin-top:10px;\">М.П.</p></td>\
         <td style=\"padding-left:15px;vertical-align:top;\">\
         <p class=\"bold\" style=\"margin-bottom:8px;\">Товар (груз) получил / услугу принял:</p>\
         <p>{buyer}</p><br/><p><span class=\"sign-line\"></span> / {buyer_sign} /</p>\
         <p class=\"small\">подпись, дата</p><p style=\"margin-top:10px;\">М.П.</p></td></tr></table>",
        seller = ctx.seller.name,
        seller_sign = sign_or_blank(&ctx.seller.director),
        buyer = ctx.buyer.name,
        buyer_sign = sign_or_blank(&ctx.buyer.director),
    ));
    html
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::demo::{demo_buyer, demo_lines, demo_products, demo_seller};
    use crate::types::UpdStatus;
    use chrono::NaiveDate;

    fn meta(kind: DocKind) -> DocMeta {
        let mut m = DocMeta::preview(kind, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        m.number = "0042".to_string();
        m
    }

    fn body(kind: DocKind, meta: &DocMeta) -> String {
        let seller = demo_seller();
        let buyer = demo_buyer();
        let products = demo_products();
        let lines = demo_lines();
        let data = aggregate(&lines, &products, &[], &seller.id, &buyer.id);
        let ctx = LegacyCtx {
            meta,
            seller: &seller,
            buyer: &buyer,
            rows: &data.rows,
            totals: data.totals,
            currency: Currency::Rub,
            qr: None,
        };
        render_body(&ctx)
    }

    #[test]
    fn test_invoice_signature_blanks() {
        // The demo buyer has no accountant; the invoice signs for the
        // seller, whose names are filled.
        let html = body(DocKind::Invoice, &meta(DocKind::Invoice));
        assert!(html.contains("/ Петров А.В. /"));
        assert!(html.contains("/ Сидорова Е.Н. /"));
    }

    #[test]
    fn test_invoice_has_full_table_header() {
        let html = body(DocKind::Invoice, &meta(DocKind::Invoice));
        assert!(html.contains("Наименование товара, работы, услуги"));
        assert!(html.contains("Всего наименований 2, на сумму 160\u{a0}000,00 ₽"));
    }

    #[test]
    fn test_act_narrative_names_both_parties() {
        let html = body(DocKind::Act, &meta(DocKind::Act));
        assert!(html.contains("Исполнитель — ООО \"Ромашка\" в лице Петров А.В."));
        assert!(html.contains("Заказчик — ИП Иванов И.И. в лице Иванов И.И."));
        assert!(html.contains("НДС (20%):"));
    }

    #[test]
    fn test_upd_status_two() {
        let mut m = meta(DocKind::Upd);
        m.status = UpdStatus::TransferOnly;
        let html = body(DocKind::Upd, &m);
        assert!(html.contains("Статус: <b>2</b>"));
        assert!(html.contains("Передаточный документ (акт)"));
    }

    #[test]
    fn test_upd_correction_number_row() {
        let mut m = meta(DocKind::Upd);
        m.correction_number = "3".to_string();
        let html = body(DocKind::Upd, &m);
        assert!(html.contains("Исправление №"));
        assert!(html.contains("Договор №3"));

        let plain = body(DocKind::Upd, &meta(DocKind::Upd));
        assert!(!plain.contains("Исправление №"));
        assert!(plain.contains("Без договора"));
    }

    #[test]
    fn test_upd_grid_column_a() {
        let html = body(DocKind::Upd, &meta(DocKind::Upd));
        assert!(html.contains(">А</th>"));
        assert!(html.contains("Стоимость без НДС<br/>(5)"));
        assert!(html.contains("colspan=\"6\""));
    }

    #[test]
    fn test_print_css_matches_defaults() {
        let style = print_css();
        assert!(style.contains("'Times New Roman'"));
        assert!(style.contains("font-size: 11px"));
        assert!(style.contains("padding: 15mm"));
    }
}
