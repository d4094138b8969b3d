//! # Templated Block Pipelines
//!
//! Each document kind is an *ordered list* of block-renderer functions.
//! The engine walks the list in its fixed order, asks each block's gate
//! whether the template enables it, and concatenates the survivors.
//!
//! This makes the block order a structural invariant - toggling a block
//! can never reorder or alter its neighbours - and keeps every toggle
//! purely additive/subtractive.
//!
//! Invoice order:
//! logo → header → [bank] → title → parties → table → totals →
//! [amount-words] → [signatures [+stamp]] → [QR] → footer.
//! The act replaces the bank/QR blocks with its acceptance narrative and
//! "no claims" line; the UPD renders the official dual-section form.

use super::RenderCtx;
use crate::template::TemplateSettings;
use crate::types::{format_date, Company, DocKind};
use crate::words::amount_in_words;

// =============================================================================
// Pipeline Infrastructure
// =============================================================================

/// One content block: a toggle gate plus a pure markup producer.
struct Block {
    enabled: fn(&TemplateSettings) -> bool,
    render: fn(&RenderCtx) -> String,
}

fn always(_: &TemplateSettings) -> bool {
    true
}
fn show_logo(t: &TemplateSettings) -> bool {
    t.show_logo
}
fn show_bank_block(t: &TemplateSettings) -> bool {
    t.show_bank_block
}
fn show_qr(t: &TemplateSettings) -> bool {
    t.show_qr
}
fn show_signatures(t: &TemplateSettings) -> bool {
    t.show_signatures
}
fn show_amount_words(t: &TemplateSettings) -> bool {
    t.show_amount_words
}
/// The stamp hangs off the signature block; alone it has nowhere to go.
fn stamp_with_signatures(t: &TemplateSettings) -> bool {
    t.show_stamp && t.show_signatures
}

/// Runs the pipeline for the context's document kind.
pub(super) fn render_body(ctx: &RenderCtx) -> String {
    let pipeline: &[Block] = match ctx.meta.kind {
        DocKind::Invoice => INVOICE_BLOCKS,
        DocKind::Act => ACT_BLOCKS,
        DocKind::Upd => UPD_BLOCKS,
    };
    pipeline
        .iter()
        .filter(|b| (b.enabled)(ctx.tpl))
        .map(|b| (b.render)(ctx))
        .collect()
}

// =============================================================================
// Shared Blocks
// =============================================================================

fn logo(ctx: &RenderCtx) -> String {
    if ctx.tpl.logo_url.is_empty() {
        return String::new();
    }
    format!("<img src=\"{}\" class=\"logo\"/>", ctx.tpl.logo_url)
}

fn header_text(ctx: &RenderCtx) -> String {
    if ctx.tpl.header_text.is_empty() {
        return String::new();
    }
    format!("<div class=\"header-text\">{}</div>", ctx.tpl.header_text)
}

fn footer_text(ctx: &RenderCtx) -> String {
    if ctx.tpl.footer_text.is_empty() {
        return String::new();
    }
    format!("<div class=\"footer-text\">{}</div>", ctx.tpl.footer_text)
}

/// "ИНН … КПП …" (space form, bank block).
pub(super) fn inn_kpp_spaced(c: &Company) -> String {
    if c.kpp.is_empty() {
        format!("ИНН {}", c.inn)
    } else {
        format!("ИНН {} КПП {}", c.inn, c.kpp)
    }
}

/// "ИНН …, КПП …" (comma form, party lines).
pub(super) fn inn_kpp_comma(c: &Company) -> String {
    if c.kpp.is_empty() {
        format!("ИНН {}", c.inn)
    } else {
        format!("ИНН {}, КПП {}", c.inn, c.kpp)
    }
}

/// "ИНН / КПП" (slash form, UPD requisites).
pub(super) fn inn_kpp_slash(c: &Company) -> String {
    if c.kpp.is_empty() {
        c.inn.clone()
    } else {
        format!("{} / {}", c.inn, c.kpp)
    }
}

fn sign_name(name: &str) -> &str {
    if name.is_empty() {
        "___"
    } else {
        name
    }
}

// =============================================================================
// Invoice Blocks
// =============================================================================

const INVOICE_BLOCKS: &[Block] = &[
    Block { enabled: show_logo, render: logo },
    Block { enabled: always, render: header_text },
    Block { enabled: show_bank_block, render: invoice_bank_block },
    Block { enabled: always, render: invoice_title },
    Block { enabled: always, render: invoice_parties },
    Block { enabled: always, render: invoice_table },
    Block { enabled: always, render: invoice_totals },
    Block { enabled: show_amount_words, render: invoice_amount_words },
    Block { enabled: show_signatures, render: invoice_signatures },
    Block { enabled: stamp_with_signatures, render: stamp },
    Block { enabled: show_qr, render: invoice_qr },
    Block { enabled: always, render: footer_text },
];

fn invoice_bank_block(ctx: &RenderCtx) -> String {
    let s = ctx.seller;
    format!(
        "<table class=\"bank-block\" style=\"border:2px solid #000;\">\
         <tr><td style=\"width:55%;border-right:2px solid #000;border-bottom:1px solid #000;\" rowspan=\"2\">\
         <div class=\"header-cell\">Банк получателя</div><div class=\"bold\">{bank}</div></td>\
         <td style=\"border-bottom:1px solid #000;\"><div class=\"header-cell\">БИК</div><div>{bik}</div></td></tr>\
         <tr><td><div class=\"header-cell\">Сч. №</div><div>{ks}</div></td></tr>\
         <tr><td style=\"border-right:2px solid #000;border-top:2px solid #000;\">\
         <div class=\"header-cell\">Получатель</div><div class=\"bold\">{name}</div><div>{inn_kpp}</div></td>\
         <td style=\"border-top:2px solid #000;\"><div class=\"header-cell\">Сч. №</div>\
         <div class=\"bold\">{rs}</div></td></tr></table>",
        bank = s.bank,
        bik = s.bik,
        ks = s.ks,
        name = s.name,
        inn_kpp = inn_kpp_spaced(s),
        rs = s.rs,
    )
}

fn invoice_title(ctx: &RenderCtx) -> String {
    format!(
        "<div class=\"title\">Счет на оплату № {} от {}</div><hr class=\"thick\"/><hr class=\"thin\"/>",
        ctx.meta.number,
        format_date(ctx.meta.date)
    )
}

fn invoice_parties(ctx: &RenderCtx) -> String {
    format!(
        "<table style=\"margin:8px 0;\">\
         <tr><td style=\"width:100px;\" class=\"bold\">Поставщик:</td>\
         <td>{}, {}, {}</td></tr>\
         <tr><td class=\"bold\">Покупатель:</td><td>{}, {}, {}</td></tr></table>",
        ctx.seller.name,
        inn_kpp_comma(ctx.seller),
        ctx.seller.address,
        ctx.buyer.name,
        inn_kpp_comma(ctx.buyer),
        ctx.buyer.address,
    )
}

fn invoice_table(ctx: &RenderCtx) -> String {
    let mut html = String::from("<table class=\"bordered\"><thead><tr>");
    if ctx.tpl.show_item_numbers {
        html.push_str("<th style=\"width:30px;\">№</th>");
    }
    html.push_str(
        "<th>Наименование</th><th style=\"width:40px;\">Ед.</th>\
         <th style=\"width:45px;\">Кол-во</th><th style=\"width:75px;\">Цена</th>\
         <th style=\"width:80px;\">Сумма</th><th style=\"width:40px;\">НДС</th>\
         <th style=\"width:75px;\">Сумма НДС</th><th style=\"width:85px;\">Всего</th>\
         </tr></thead><tbody>",
    );
    for (i, r) in ctx.rows.iter().enumerate() {
        html.push_str("<tr>");
        if ctx.tpl.show_item_numbers {
            html.push_str(&format!("<td class=\"center\">{}</td>", i + 1));
        }
        html.push_str(&format!(
            "<td>{}</td><td class=\"center\">{}</td><td class=\"right\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td><td class=\"center\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
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
    html
}

fn invoice_totals(ctx: &RenderCtx) -> String {
    format!(
        "<table>\
         <tr class=\"totals-row\"><td colspan=\"7\"></td>\
         <td class=\"right bold\" style=\"width:160px;\">Итого:</td>\
         <td class=\"right bold\" style=\"width:85px;\">{net}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"7\"></td>\
         <td class=\"right bold\">В том числе НДС:</td><td class=\"right bold\">{vat}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"7\"></td>\
         <td class=\"right bold\">Всего к оплате:</td><td class=\"right bold\">{total}</td></tr>\
         </table>\
         <p style=\"margin:10px 0;\">Всего наименований {count}, на сумму {total}</p>",
        net = ctx.money(ctx.totals.net),
        vat = ctx.money(ctx.totals.vat),
        total = ctx.money(ctx.totals.total),
        count = ctx.rows.len(),
    )
}

fn invoice_amount_words(ctx: &RenderCtx) -> String {
    format!(
        "<p style=\"margin-bottom:15px;font-weight:bold;\">{}</p>",
        amount_in_words(ctx.totals.total.kopecks())
    )
}

fn invoice_signatures(ctx: &RenderCtx) -> String {
    format!(
        "<hr class=\"thin\"/><table class=\"sign-block\" style=\"width:100%;\"><tr>\
         <td style=\"width:50%;\"><span class=\"bold\">Руководитель</span> \
         <span class=\"sign-line\"></span> / {} /</td>\
         <td><span class=\"bold\">Бухгалтер</span> <span class=\"sign-line\"></span> / {} /</td>\
         </tr></table>",
        sign_name(&ctx.seller.director),
        sign_name(&ctx.seller.accountant),
    )
}

fn stamp(_ctx: &RenderCtx) -> String {
    "<p style=\"margin-top:10px;\">М.П.</p>".to_string()
}

fn invoice_qr(ctx: &RenderCtx) -> String {
    match &ctx.qr {
        Some(qr) => format!(
            "<div class=\"qr-block\"><img src=\"{}\"/><div>\
             <p class=\"bold\">QR-код для оплаты</p><p>Сумма: {}</p></div></div>",
            qr.data_url,
            ctx.money(ctx.totals.total),
        ),
        None => String::new(),
    }
}

// =============================================================================
// Act Blocks
// =============================================================================

const ACT_BLOCKS: &[Block] = &[
    Block { enabled: show_logo, render: logo },
    Block { enabled: always, render: header_text },
    Block { enabled: always, render: act_title },
    Block { enabled: always, render: act_parties },
    Block { enabled: always, render: act_narrative },
    Block { enabled: always, render: act_table },
    Block { enabled: always, render: act_totals },
    Block { enabled: show_amount_words, render: act_amount_words },
    Block { enabled: always, render: act_claims },
    Block { enabled: show_signatures, render: act_signatures },
    Block { enabled: always, render: footer_text },
];

fn act_title(ctx: &RenderCtx) -> String {
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
    html.push_str("<hr class=\"thick\"/><hr class=\"thin\"/>");
    html
}

fn act_parties(ctx: &RenderCtx) -> String {
    format!(
        "<table style=\"margin:8px 0;\">\
         <tr><td style=\"width:100px;\" class=\"bold\">Исполнитель:</td>\
         <td>{}, ИНН {}, {}</td></tr>\
         <tr><td class=\"bold\">Заказчик:</td><td>{}, ИНН {}, {}</td></tr></table>",
        ctx.seller.name,
        ctx.seller.inn,
        ctx.seller.address,
        ctx.buyer.name,
        ctx.buyer.inn,
        ctx.buyer.address,
    )
}

fn act_narrative(_ctx: &RenderCtx) -> String {
    "<p style=\"margin:8px 0;\">Мы, нижеподписавшиеся, составили настоящий Акт о выполнении работ:</p>"
        .to_string()
}

fn act_table(ctx: &RenderCtx) -> String {
    let mut html = String::from("<table class=\"bordered\"><thead><tr>");
    if ctx.tpl.show_item_numbers {
        html.push_str("<th style=\"width:30px;\">№</th>");
    }
    html.push_str(
        "<th>Наименование</th><th style=\"width:40px;\">Ед.</th>\
         <th style=\"width:50px;\">Кол-во</th><th style=\"width:80px;\">Цена</th>\
         <th style=\"width:90px;\">Сумма</th></tr></thead><tbody>",
    );
    for (i, r) in ctx.rows.iter().enumerate() {
        html.push_str("<tr>");
        if ctx.tpl.show_item_numbers {
            html.push_str(&format!("<td class=\"center\">{}</td>", i + 1));
        }
        html.push_str(&format!(
            "<td>{}</td><td class=\"center\">{}</td><td class=\"right\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
            r.name,
            r.unit,
            r.quantity,
            ctx.money(r.price),
            ctx.money(r.total),
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn act_totals(ctx: &RenderCtx) -> String {
    format!(
        "<table>\
         <tr class=\"totals-row\"><td colspan=\"4\"></td>\
         <td class=\"right bold\">НДС:</td><td class=\"right bold\">{vat}</td></tr>\
         <tr class=\"totals-row\"><td colspan=\"4\"></td>\
         <td class=\"right bold\">Всего:</td><td class=\"right bold\">{total}</td></tr></table>",
        vat = ctx.money(ctx.totals.vat),
        total = ctx.money(ctx.totals.total),
    )
}

fn act_amount_words(ctx: &RenderCtx) -> String {
    format!(
        "<p style=\"margin:10px 0;font-weight:bold;\">{}</p>",
        amount_in_words(ctx.totals.total.kopecks())
    )
}

fn act_claims(_ctx: &RenderCtx) -> String {
    "<p style=\"margin:5px 0;\">Работы выполнены полностью и в срок. Претензий нет.</p>".to_string()
}

fn act_signatures(ctx: &RenderCtx) -> String {
    let stamp_cell = if ctx.tpl.show_stamp {
        "<p style='margin-top:10px;'>М.П.</p>"
    } else {
        ""
    };
    format!(
        "<hr class=\"thin\" style=\"margin-top:15px;\"/>\
         <table class=\"sign-block\" style=\"width:100%;\"><tr>\
         <td style=\"width:50%;padding-right:20px;\">\
         <p class=\"bold\" style=\"margin-bottom:20px;\">Исполнитель:</p><p>{seller}</p><br/>\
         <p><span class=\"sign-line\"></span> / {seller_sign} /</p>{stamp}</td>\
         <td style=\"padding-left:20px;\">\
         <p class=\"bold\" style=\"margin-bottom:20px;\">Заказчик:</p><p>{buyer}</p><br/>\
         <p><span class=\"sign-line\"></span> / {buyer_sign} /</p>{stamp}</td>\
         </tr></table>",
        seller = ctx.seller.name,
        seller_sign = sign_name(&ctx.seller.director),
        buyer = ctx.buyer.name,
        buyer_sign = sign_name(&ctx.buyer.director),
        stamp = stamp_cell,
    )
}

// =============================================================================
// UPD Blocks
// =============================================================================

const UPD_BLOCKS: &[Block] = &[
    Block { enabled: show_logo, render: logo },
    Block { enabled: always, render: header_text },
    Block { enabled: always, render: upd_status },
    Block { enabled: always, render: upd_title },
    Block { enabled: always, render: upd_requisites },
    Block { enabled: always, render: upd_table },
    Block { enabled: show_amount_words, render: act_amount_words },
    Block { enabled: show_signatures, render: upd_signatures },
    Block { enabled: always, render: footer_text },
];

fn upd_status(ctx: &RenderCtx) -> String {
    format!(
        "<div style=\"text-align:right;font-size:{}px;margin-bottom:5px;\">\
         Статус: <b>{}</b> — {}</div>",
        ctx.tpl.table_cell_size(),
        ctx.meta.status.code(),
        ctx.meta.status.label(),
    )
}

fn upd_title(ctx: &RenderCtx) -> String {
    let mut html = format!(
        "<div class=\"title\" style=\"font-size:{}px;\">Универсальный передаточный документ</div>\
         <table style=\"margin-bottom:5px;\"><tr><td class=\"bold\" style=\"width:200px;\">\
         Счёт-фактура №</td><td>{} от {}</td></tr>",
        ctx.tpl.title_font_size - 2,
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
    html
}

fn upd_requisites(ctx: &RenderCtx) -> String {
    format!(
        "<table style=\"margin:5px 0;font-size:{size}px;\">\
         <tr><td class=\"bold\" style=\"width:130px;\">Продавец (1):</td><td>{sname}</td></tr>\
         <tr><td class=\"bold\">Адрес (2):</td><td>{saddr}</td></tr>\
         <tr><td class=\"bold\">ИНН/КПП (2б):</td><td>{sids}</td></tr>\
         <tr><td class=\"bold\">Покупатель (6):</td><td>{bname}</td></tr>\
         <tr><td class=\"bold\">ИНН/КПП (6б):</td><td>{bids}</td></tr></table>",
        size = ctx.tpl.table_cell_size(),
        sname = ctx.seller.name,
        saddr = ctx.seller.address,
        sids = inn_kpp_slash(ctx.seller),
        bname = ctx.buyer.name,
        bids = inn_kpp_slash(ctx.buyer),
    )
}

fn upd_table(ctx: &RenderCtx) -> String {
    let mut html = String::from("<table class=\"bordered\"><thead><tr>");
    if ctx.tpl.show_item_numbers {
        html.push_str("<th style=\"width:25px;\">№</th>");
    }
    html.push_str(
        "<th>Наименование (1а)</th><th style=\"width:35px;\">Ед.</th>\
         <th style=\"width:40px;\">Кол-во</th><th style=\"width:70px;\">Цена</th>\
         <th style=\"width:75px;\">Без НДС</th><th style=\"width:35px;\">НДС</th>\
         <th style=\"width:70px;\">Сумма НДС</th><th style=\"width:80px;\">С НДС</th>\
         </tr></thead><tbody>",
    );
    for (i, r) in ctx.rows.iter().enumerate() {
        html.push_str("<tr>");
        if ctx.tpl.show_item_numbers {
            html.push_str(&format!("<td class=\"center\">{}</td>", i + 1));
        }
        html.push_str(&format!(
            "<td>{}</td><td class=\"center\">{}</td><td class=\"right\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td><td class=\"center\">{}</td>\
             <td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
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
        "<tr class=\"bold\"><td colspan=\"{}\" class=\"right\">Всего:</td>\
         <td class=\"right\">{}</td><td class=\"center\">X</td>\
         <td class=\"right\">{}</td><td class=\"right\">{}</td></tr></tbody></table>",
        if ctx.tpl.show_item_numbers { 5 } else { 4 },
        ctx.money(ctx.totals.net),
        ctx.money(ctx.totals.vat),
        ctx.money(ctx.totals.total),
    ));
    html
}

fn upd_signatures(ctx: &RenderCtx) -> String {
    let stamp_cell = if ctx.tpl.show_stamp {
        "<p style='margin-top:10px;'>М.П.</p>"
    } else {
        ""
    };
    format!(
        "<hr class=\"thick\" style=\"margin-top:10px;\"/>\
         <div style=\"text-align:center;margin:5px 0;font-weight:bold;\">[ II. Передаточный документ ]</div>\
         <table class=\"sign-block\" style=\"width:100%;\"><tr>\
         <td style=\"width:50%;\"><p class=\"bold\" style=\"margin-bottom:8px;\">Передал:</p>\
         <p>{seller}</p><br/><p><span class=\"sign-line\"></span> / {seller_sign} /</p>{stamp}</td>\
         <td><p class=\"bold\" style=\"margin-bottom:8px;\">Получил:</p>\
         <p>{buyer}</p><br/><p><span class=\"sign-line\"></span> / {buyer_sign} /</p>{stamp}</td>\
         </tr></table>",
        seller = ctx.seller.name,
        seller_sign = sign_name(&ctx.seller.director),
        buyer = ctx.buyer.name,
        buyer_sign = sign_name(&ctx.buyer.director),
        stamp = stamp_cell,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
