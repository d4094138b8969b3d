//! # Export Encoders
//!
//! Pure transformations of an aggregated document into exchange
//! formats:
//!
//! - [`sheet`] - the fixed 2-D cell grid fed to the workbook encoder
//!   collaborator (the binary .xlsx itself is produced by the host);
//! - [`xml`] - the fixed-element-tree XML rendition.
//!
//! Exports depend only on document + catalog + counterparties; template
//! settings never influence them.

pub mod sheet;
pub mod xml;

use thiserror::Error;

use crate::types::DocKind;

/// Errors produced by export encoding.
#[derive(Debug, Error)]
pub enum ExportError {
    /// XML serialization failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// The external workbook encoder reported a failure.
    #[error("spreadsheet encoder error: {0}")]
    Spreadsheet(String),
}

/// The export file naming convention: localized kind label, underscore,
/// document number, extension - `Счет_0001.xlsx`, `УПД_0007.xml`.
pub fn export_filename(kind: DocKind, number: &str, extension: &str) -> String {
    format!("{}_{}.{}", kind.label(), number, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filenames() {
        assert_eq!(export_filename(DocKind::Invoice, "0001", "xlsx"), "Счет_0001.xlsx");
        assert_eq!(export_filename(DocKind::Act, "0002", "xml"), "Акт_0002.xml");
        assert_eq!(export_filename(DocKind::Upd, "0013", "xlsx"), "УПД_0013.xlsx");
    }
}
