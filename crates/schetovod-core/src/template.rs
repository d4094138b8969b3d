//! # Print Templates
//!
//! The schema of a user-authored print template: typography, page
//! geometry and seven independent content-block toggles.
//!
//! ## Lifecycle
//! Templates are created and edited by the user, several may target the
//! same document kind, and a document kind without any template falls
//! back to the built-in legacy layout (see [`crate::render`]).
//!
//! Because templates are user configuration, a structurally corrupt one
//! (missing font, absurd sizes) fails loudly at [`TemplateSettings::validate`]
//! instead of silently rendering a broken page. Deserialization is
//! equally strict: template records carry no serde defaults.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::TemplateError;
use crate::types::{DocKind, TemplateId};

// =============================================================================
// Template Settings
// =============================================================================

/// Visual style and content configuration for one document kind.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TemplateSettings {
    pub id: TemplateId,
    /// Display name shown in the template list.
    pub name: String,
    pub doc_type: DocKind,

    // -- typography -----------------------------------------------------------
    /// Body font family.
    pub font: String,
    /// Body font size, px. Table cells, table headers and footnotes are
    /// derived from it by fixed offsets (−1, −2, −3).
    pub font_size: i32,
    /// Document title font size, px.
    pub title_font_size: i32,
    /// Page padding, mm.
    pub page_margin: i32,
    /// Table header background; any valid CSS color value.
    pub table_header_bg: String,

    // -- content toggles (each gates exactly one block) -----------------------
    pub show_logo: bool,
    pub logo_url: String,
    pub show_bank_block: bool,
    #[serde(rename = "showQR")]
    pub show_qr: bool,
    pub show_signatures: bool,
    pub show_stamp: bool,
    pub show_amount_words: bool,
    pub show_item_numbers: bool,

    // -- free-text blocks -----------------------------------------------------
    pub header_text: String,
    pub footer_text: String,
}

impl TemplateSettings {
    /// Creates a template with the standard defaults: Times New Roman
    /// 11/14 px, 15 mm margin, light-grey table header, every block on
    /// except the logo.
    pub fn with_defaults(id: TemplateId, name: impl Into<String>, doc_type: DocKind) -> Self {
        TemplateSettings {
            id,
            name: name.into(),
            doc_type,
            font: "Times New Roman".to_string(),
            font_size: 11,
            title_font_size: 14,
            page_margin: 15,
            table_header_bg: "#e8e8e8".to_string(),
            show_logo: false,
            logo_url: String::new(),
            show_bank_block: true,
            show_qr: true,
            show_signatures: true,
            show_stamp: true,
            show_amount_words: true,
            show_item_numbers: true,
            header_text: String::new(),
            footer_text: String::new(),
        }
    }

    // -- derived font sizes ---------------------------------------------------

    /// Table cell font size.
    #[inline]
    pub fn table_cell_size(&self) -> i32 {
        self.font_size - 1
    }

    /// Table header font size.
    #[inline]
    pub fn table_header_size(&self) -> i32 {
        self.font_size - 2
    }

    /// Footnote / fine-print font size.
    #[inline]
    pub fn footnote_size(&self) -> i32 {
        self.font_size - 3
    }

    /// Validates the structural integrity of the template.
    ///
    /// ## Errors
    /// Returns a [`TemplateError`] naming the offending field; rendering
    /// refuses to run with a template that fails here.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::MissingField {
                template: self.id.to_string(),
                field: "name",
            });
        }
        if self.font.trim().is_empty() {
            return Err(TemplateError::MissingField {
                template: self.name.clone(),
                field: "font",
            });
        }
        self.check_range("fontSize", self.font_size, 6, 72)?;
        self.check_range("titleFontSize", self.title_font_size, 6, 96)?;
        self.check_range("pageMargin", self.page_margin, 0, 50)?;
        Ok(())
    }

    fn check_range(
        &self,
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    ) -> Result<(), TemplateError> {
        if value < min || value > max {
            return Err(TemplateError::OutOfRange {
                template: self.name.clone(),
                field,
                value: value as i64,
                min: min as i64,
                max: max as i64,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Standard Templates
// =============================================================================

/// The three templates seeded into an empty store: a standard layout per
/// document kind. Bank requisites and the payment QR only make sense on
/// an invoice, so the act and UPD templates start with those off.
pub fn standard_templates() -> Vec<TemplateSettings> {
    let invoice = TemplateSettings::with_defaults(
        TemplateId::new("tpl-invoice"),
        "Счет (стандартный)",
        DocKind::Invoice,
    );
    let mut act = TemplateSettings::with_defaults(
        TemplateId::new("tpl-act"),
        "Акт (стандартный)",
        DocKind::Act,
    );
    act.show_bank_block = false;
    act.show_qr = false;
    let mut upd = TemplateSettings::with_defaults(
        TemplateId::new("tpl-upd"),
        "УПД (стандартный)",
        DocKind::Upd,
    );
    upd.show_bank_block = false;
    upd.show_qr = false;
    vec![invoice, act, upd]
}

// =============================================================================
// Unit Tests
// =============================================================================
