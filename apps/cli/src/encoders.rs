//! External encoder collaborators.
//!
//! The core defines two traits for artifacts it refuses to build
//! itself: QR images and binary workbooks. This module provides the
//! real implementations the CLI plugs in.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use rust_xlsxwriter::Workbook;
use tracing::warn;

use schetovod_core::export::sheet::{Cell, Spreadsheet, SpreadsheetEncoder};
use schetovod_core::export::ExportError;
use schetovod_core::qr::QrImageEncoder;

// =============================================================================
// QR Image Encoder
// =============================================================================

/// Renders ST00012 payloads into PNG data URLs.
///
/// Error-correction level M is the conventional choice for payment
/// codes: dense enough for bank requisites, robust enough for paper.
pub struct PngQrEncoder;

impl QrImageEncoder for PngQrEncoder {
    fn data_url(&self, payload: &str) -> Option<String> {
        let code = match QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M) {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "QR payload rejected by encoder");
                return None;
            }
        };
        let img = code.render::<Luma<u8>>().min_dimensions(240, 240).build();

        // image 0.25: write_to requires Write + Seek -> Cursor<Vec<u8>>
        let mut cursor = Cursor::new(Vec::<u8>::new());
        if image::DynamicImage::ImageLuma8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .is_err()
        {
            warn!("QR PNG encoding failed");
            return None;
        }
        Some(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(cursor.into_inner())
        ))
    }
}

// =============================================================================
// Workbook Encoder
// =============================================================================

/// Turns the core's cell grid into .xlsx bytes.
pub struct XlsxEncoder;

impl SpreadsheetEncoder for XlsxEncoder {
    fn encode(&self, sheet: &Spreadsheet) -> Result<Vec<u8>, ExportError> {
        let xlsx = |e: rust_xlsxwriter::XlsxError| ExportError::Spreadsheet(e.to_string());

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.sheet_name).map_err(xlsx)?;

        for (col, width) in sheet.column_widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width).map_err(xlsx)?;
        }
        for (row, cells) in sheet.rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet
                            .write_string(row as u32, col as u16, text)
                            .map_err(xlsx)?;
                    }
                    Cell::Int(value) => {
                        worksheet
                            .write_number(row as u32, col as u16, *value as f64)
                            .map_err(xlsx)?;
                    }
                }
            }
        }
        workbook.save_to_buffer().map_err(xlsx)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
