//! Register payload resolution and column mapping.
//!
//! An upload arrives as raw bytes plus a file name. Resolution turns
//! that into a header row and data rows, rejecting empty payloads,
//! unsupported extensions, and archives with no embedded spreadsheet,
//! each with its own error. The actual container parsing sits behind
//! the [`SheetReader`] / [`ArchiveReader`] seams; the built-in readers
//! cover delimited text.
//!
//! Column mapping turns a source header name into a parcel field. The
//! mapping is plain key-value configuration loaded once at startup; a
//! built-in default covers the common register layouts.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an uploaded payload could not be resolved to spreadsheet rows.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImportFileError {
    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Unsupported file type: .{0}")]
    UnsupportedFileType(String),

    #[error("Archive contains no spreadsheet")]
    NoSpreadsheetInArchive,

    #[error("Malformed spreadsheet: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Reader seams
// ---------------------------------------------------------------------------

/// Parsed spreadsheet content: one header row and zero or more data
/// rows of string cells. Short rows are padded by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Capability: turn raw bytes into rows of named cell values.
pub trait SheetReader: Send + Sync {
    /// Whether this reader handles files with the given (lowercase)
    /// extension.
    fn supports_extension(&self, extension: &str) -> bool;

    /// Parse the payload. The extension has already been checked via
    /// [`SheetReader::supports_extension`].
    fn read(&self, bytes: &[u8], extension: &str) -> Result<SheetData, ImportFileError>;
}

/// Capability: find the first embedded spreadsheet inside an archive.
pub trait ArchiveReader: Send + Sync {
    /// Whether this reader handles archives with the given (lowercase)
    /// extension.
    fn supports_extension(&self, extension: &str) -> bool;

    /// Return the first embedded file whose extension `sheets` supports,
    /// as `(file_name, bytes)`, or `None` when the archive holds no
    /// spreadsheet.
    fn first_spreadsheet(
        &self,
        bytes: &[u8],
        sheets: &dyn SheetReader,
    ) -> Option<(String, Vec<u8>)>;
}

/// Resolve an uploaded payload to spreadsheet rows.
///
/// Dispatches on the lowercased file extension: archive extensions go
/// through `archives` first, spreadsheet extensions straight to
/// `sheets`, anything else is rejected.
pub fn resolve_payload(
    bytes: &[u8],
    filename: &str,
    sheets: &dyn SheetReader,
    archives: &dyn ArchiveReader,
) -> Result<SheetData, ImportFileError> {
    if bytes.is_empty() {
        return Err(ImportFileError::EmptyFile);
    }

    let extension = file_extension(filename);

    if archives.supports_extension(&extension) {
        let (inner_name, inner_bytes) = archives
            .first_spreadsheet(bytes, sheets)
            .ok_or(ImportFileError::NoSpreadsheetInArchive)?;
        if inner_bytes.is_empty() {
            return Err(ImportFileError::EmptyFile);
        }
        return sheets.read(&inner_bytes, &file_extension(&inner_name));
    }

    if sheets.supports_extension(&extension) {
        return sheets.read(bytes, &extension);
    }

    Err(ImportFileError::UnsupportedFileType(extension))
}

/// Lowercase extension without the dot; empty when the name has none.
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Built-in delimited-text reader
// ---------------------------------------------------------------------------

/// Reader for delimited text registers (`.csv`, `.tsv`).
///
/// Handles quoted fields with embedded delimiters and newlines, doubled
/// quotes, and CRLF line endings.
#[derive(Debug, Default)]
pub struct DelimitedReader;

impl DelimitedReader {
    fn delimiter(extension: &str) -> u8 {
        if extension == "tsv" {
            b'\t'
        } else {
            b','
        }
    }

    fn parse(text: &str, delimiter: u8) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    _ => field.push(c),
                }
            } else {
                match c {
                    '"' if field.is_empty() => in_quotes = true,
                    '\r' => {}
                    '\n' => {
                        row.push(std::mem::take(&mut field));
                        rows.push(std::mem::take(&mut row));
                    }
                    c if c == delimiter as char => {
                        row.push(std::mem::take(&mut field));
                    }
                    _ => field.push(c),
                }
            }
        }

        if !field.is_empty() || !row.is_empty() {
            row.push(field);
            rows.push(row);
        }

        // Drop fully empty trailing rows.
        rows.retain(|r| r.iter().any(|cell| !cell.trim().is_empty()));
        rows
    }
}

impl SheetReader for DelimitedReader {
    fn supports_extension(&self, extension: &str) -> bool {
        matches!(extension, "csv" | "tsv")
    }

    fn read(&self, bytes: &[u8], extension: &str) -> Result<SheetData, ImportFileError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ImportFileError::Malformed(format!("Invalid UTF-8: {e}")))?;

        let mut rows = Self::parse(text, Self::delimiter(extension));
        if rows.is_empty() {
            return Err(ImportFileError::Malformed(
                "Spreadsheet has no header row".to_string(),
            ));
        }

        let headers = rows.remove(0).iter().map(|h| h.trim().to_string()).collect();
        Ok(SheetData { headers, rows })
    }
}

/// Archive reader with no extraction capability: it recognises archive
/// extensions so they are not rejected as unknown file types, but every
/// archive resolves to [`ImportFileError::NoSpreadsheetInArchive`]
/// unless a real extractor is injected.
#[derive(Debug, Default)]
pub struct NoopArchiveReader;

/// Archive extensions recognised by [`NoopArchiveReader`].
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar"];

impl ArchiveReader for NoopArchiveReader {
    fn supports_extension(&self, extension: &str) -> bool {
        ARCHIVE_EXTENSIONS.contains(&extension)
    }

    fn first_spreadsheet(
        &self,
        _bytes: &[u8],
        _sheets: &dyn SheetReader,
    ) -> Option<(String, Vec<u8>)> {
        None
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// A parcel field a source column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelField {
    TariffCode,
    ProductName,
    Description,
    CountryCode,
    Quantity,
    Weight,
    OrderNumber,
    PostingNumber,
}

/// Header-name to parcel-field mapping, loaded once at startup.
/// Header lookup is trimmed and case-insensitive.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    map: HashMap<String, ParcelField>,
}

impl ColumnMapping {
    /// Built-in mapping covering the common register layouts.
    pub fn default_mapping() -> Self {
        let pairs: &[(&str, ParcelField)] = &[
            ("тн вэд", ParcelField::TariffCode),
            ("код тн вэд", ParcelField::TariffCode),
            ("наименование", ParcelField::ProductName),
            ("наименование товара", ParcelField::ProductName),
            ("описание", ParcelField::Description),
            ("описание товара", ParcelField::Description),
            ("страна", ParcelField::CountryCode),
            ("страна отправления", ParcelField::CountryCode),
            ("количество", ParcelField::Quantity),
            ("кол-во", ParcelField::Quantity),
            ("вес", ParcelField::Weight),
            ("вес, кг", ParcelField::Weight),
            ("номер заказа", ParcelField::OrderNumber),
            ("номер отправления", ParcelField::PostingNumber),
        ];
        Self {
            map: pairs
                .iter()
                .map(|(header, field)| (header.to_string(), *field))
                .collect(),
        }
    }

    /// Load a `{ "Header": "field_name" }` JSON mapping file.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Internal(format!(
                "Failed to read column mapping {}: {e}",
                path.display()
            ))
        })?;
        let entries: HashMap<String, ParcelField> = serde_json::from_str(&raw).map_err(|e| {
            CoreError::Internal(format!("Invalid column mapping {}: {e}", path.display()))
        })?;

        Ok(Self {
            map: entries
                .into_iter()
                .map(|(header, field)| (header.trim().to_lowercase(), field))
                .collect(),
        })
    }

    pub fn lookup(&self, header: &str) -> Option<ParcelField> {
        self.map.get(&header.trim().to_lowercase()).copied()
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// One spreadsheet row mapped onto parcel fields. Fields absent from
/// the source (or unparseable numerics) stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRow {
    pub tariff_code: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub country_code: Option<String>,
    pub quantity: Option<i32>,
    pub weight_kg: Option<f64>,
    pub order_number: Option<String>,
    pub posting_number: Option<String>,
}

impl MappedRow {
    /// Map one data row using the header row and the column mapping.
    pub fn from_cells(mapping: &ColumnMapping, headers: &[String], cells: &[String]) -> Self {
        let mut row = Self::default();

        for (idx, header) in headers.iter().enumerate() {
            let Some(field) = mapping.lookup(header) else {
                continue;
            };
            let Some(value) = cells.get(idx).map(|c| c.trim()).filter(|c| !c.is_empty())
            else {
                continue;
            };

            match field {
                ParcelField::TariffCode => row.tariff_code = Some(value.to_string()),
                ParcelField::ProductName => row.product_name = Some(value.to_string()),
                ParcelField::Description => row.description = Some(value.to_string()),
                ParcelField::CountryCode => row.country_code = Some(value.to_string()),
                ParcelField::Quantity => row.quantity = parse_int(value),
                ParcelField::Weight => row.weight_kg = parse_decimal(value),
                ParcelField::OrderNumber => row.order_number = Some(value.to_string()),
                ParcelField::PostingNumber => row.posting_number = Some(value.to_string()),
            }
        }

        row
    }
}

fn parse_int(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}

/// Registers use a comma decimal separator as often as a dot.
fn parse_decimal(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn csv(text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    /// Archive stub handing back a fixed embedded file.
    struct StubArchive {
        inner: Option<(String, Vec<u8>)>,
    }

    impl ArchiveReader for StubArchive {
        fn supports_extension(&self, extension: &str) -> bool {
            extension == "zip"
        }
        fn first_spreadsheet(
            &self,
            _bytes: &[u8],
            _sheets: &dyn SheetReader,
        ) -> Option<(String, Vec<u8>)> {
            self.inner.clone()
        }
    }

    // -- resolve_payload --

    #[test]
    fn test_empty_payload_is_rejected() {
        assert_matches!(
            resolve_payload(&[], "register.csv", &DelimitedReader, &NoopArchiveReader),
            Err(ImportFileError::EmptyFile)
        );
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = resolve_payload(
            &csv("a,b\n1,2\n"),
            "register.pdf",
            &DelimitedReader,
            &NoopArchiveReader,
        )
        .unwrap_err();
        assert_eq!(err, ImportFileError::UnsupportedFileType("pdf".to_string()));
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let data = resolve_payload(
            &csv("a,b\n1,2\n"),
            "REGISTER.CSV",
            &DelimitedReader,
            &NoopArchiveReader,
        )
        .unwrap();
        assert_eq!(data.headers, vec!["a", "b"]);
    }

    #[test]
    fn test_archive_without_spreadsheet_is_rejected() {
        assert_matches!(
            resolve_payload(
                &[1, 2, 3],
                "batch.zip",
                &DelimitedReader,
                &NoopArchiveReader
            ),
            Err(ImportFileError::NoSpreadsheetInArchive)
        );
    }

    #[test]
    fn test_archive_with_embedded_spreadsheet_resolves() {
        let archive = StubArchive {
            inner: Some(("register.csv".to_string(), csv("a,b\n1,2\n"))),
        };
        let data =
            resolve_payload(&[1, 2, 3], "batch.zip", &DelimitedReader, &archive).unwrap();
        assert_eq!(data.rows, vec![vec!["1", "2"]]);
    }

    // -- DelimitedReader --

    #[test]
    fn test_csv_header_and_rows() {
        let data = DelimitedReader
            .read(&csv("ТН ВЭД,Наименование\n8517120000,Телефон\n"), "csv")
            .unwrap();
        assert_eq!(data.headers, vec!["ТН ВЭД", "Наименование"]);
        assert_eq!(data.rows, vec![vec!["8517120000", "Телефон"]]);
    }

    #[test]
    fn test_csv_quoted_field_with_delimiter() {
        let data = DelimitedReader
            .read(&csv("a,b\n\"x, y\",2\n"), "csv")
            .unwrap();
        assert_eq!(data.rows[0][0], "x, y");
    }

    #[test]
    fn test_csv_doubled_quotes() {
        let data = DelimitedReader.read(&csv("a\n\"say \"\"hi\"\"\"\n"), "csv").unwrap();
        assert_eq!(data.rows[0][0], "say \"hi\"");
    }

    #[test]
    fn test_csv_quoted_field_with_newline() {
        let data = DelimitedReader
            .read(&csv("a,b\n\"line1\nline2\",2\n"), "csv")
            .unwrap();
        assert_eq!(data.rows[0][0], "line1\nline2");
    }

    #[test]
    fn test_csv_crlf_line_endings() {
        let data = DelimitedReader.read(&csv("a,b\r\n1,2\r\n"), "csv").unwrap();
        assert_eq!(data.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_tsv_uses_tab_delimiter() {
        let data = DelimitedReader.read(&csv("a\tb\n1\t2\n"), "tsv").unwrap();
        assert_eq!(data.headers, vec!["a", "b"]);
        assert_eq!(data.rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_blank_trailing_rows_are_dropped() {
        let data = DelimitedReader.read(&csv("a,b\n1,2\n,\n\n"), "csv").unwrap();
        assert_eq!(data.rows.len(), 1);
    }

    #[test]
    fn test_header_only_sheet_has_no_rows() {
        let data = DelimitedReader.read(&csv("a,b\n"), "csv").unwrap();
        assert!(data.rows.is_empty());
    }

    #[test]
    fn test_non_utf8_payload_is_malformed() {
        assert_matches!(
            DelimitedReader.read(&[0xff, 0xfe, 0x00], "csv"),
            Err(ImportFileError::Malformed(_))
        );
    }

    // -- ColumnMapping --

    #[test]
    fn test_default_mapping_covers_tariff_and_name() {
        let mapping = ColumnMapping::default_mapping();
        assert_eq!(mapping.lookup("ТН ВЭД"), Some(ParcelField::TariffCode));
        assert_eq!(
            mapping.lookup("Наименование товара"),
            Some(ParcelField::ProductName)
        );
        assert_eq!(mapping.lookup("Неизвестная колонка"), None);
    }

    #[test]
    fn test_mapping_lookup_trims_and_folds_case() {
        let mapping = ColumnMapping::default_mapping();
        assert_eq!(mapping.lookup("  тн вэд "), Some(ParcelField::TariffCode));
    }

    #[test]
    fn test_mapping_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        write!(file, r#"{{"HS Code": "tariff_code", "Item": "product_name"}}"#).unwrap();

        let mapping = ColumnMapping::from_file(file.path()).unwrap();
        assert_eq!(mapping.lookup("hs code"), Some(ParcelField::TariffCode));
        assert_eq!(mapping.lookup("Item"), Some(ParcelField::ProductName));
    }

    // -- MappedRow --

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_maps_onto_fields() {
        let mapping = ColumnMapping::default_mapping();
        let row = MappedRow::from_cells(
            &mapping,
            &headers(&["ТН ВЭД", "Наименование", "Количество", "Вес"]),
            &headers(&["8517120000", "Телефон", "2", "1,5"]),
        );
        assert_eq!(row.tariff_code.as_deref(), Some("8517120000"));
        assert_eq!(row.product_name.as_deref(), Some("Телефон"));
        assert_eq!(row.quantity, Some(2));
        assert_eq!(row.weight_kg, Some(1.5));
    }

    #[test]
    fn test_short_row_leaves_missing_fields_none() {
        let mapping = ColumnMapping::default_mapping();
        let row = MappedRow::from_cells(
            &mapping,
            &headers(&["ТН ВЭД", "Наименование"]),
            &headers(&["8517120000"]),
        );
        assert_eq!(row.tariff_code.as_deref(), Some("8517120000"));
        assert!(row.product_name.is_none());
    }

    #[test]
    fn test_unparseable_quantity_stays_none() {
        let mapping = ColumnMapping::default_mapping();
        let row = MappedRow::from_cells(
            &mapping,
            &headers(&["Количество"]),
            &headers(&["две штуки"]),
        );
        assert!(row.quantity.is_none());
    }

    #[test]
    fn test_unmapped_columns_are_ignored() {
        let mapping = ColumnMapping::default_mapping();
        let row = MappedRow::from_cells(
            &mapping,
            &headers(&["Служебная", "ТН ВЭД"]),
            &headers(&["x", "8517120000"]),
        );
        assert_eq!(row.tariff_code.as_deref(), Some("8517120000"));
    }
}
