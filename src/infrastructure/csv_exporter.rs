//! CSV export sink
//!
//! UTF-8 with a leading byte-order mark so spreadsheet tools detect the
//! encoding; the header row is the export schema in column order.

#![allow(clippy::uninlined_format_args)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::domain::product_record::{ExportField, ProductRecord};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write header plus one row per record, replacing any existing file
    pub fn write(&self, records: &[ProductRecord]) -> Result<usize, ExportError> {
        let io_error = |source: io::Error| ExportError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = File::create(&self.path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        write_csv(&mut writer, records)?;
        writer.flush().map_err(io_error)?;

        info!("Saved {} products to {:?}", records.len(), self.path);
        Ok(records.len())
    }
}

/// BOM, header and rows to any writer
pub fn write_csv<W: Write>(mut out: W, records: &[ProductRecord]) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM).map_err(|e| ExportError::Csv(e.into()))?;

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(ExportField::headers())?;
    for record in records {
        writer.write_record(record.values())?;
    }
    writer.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ProductRecord {
        ProductRecord {
            id: "27513497".to_string(),
            name: name.to_string(),
            sale_price: "199000".to_string(),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn test_writes_bom_header_and_rows() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[record("Đèn bàn, LED \"mini\"")]).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), ExportField::headers().join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("27513497,simple,,\"Đèn bàn, LED \"\"mini\"\"\",1,0,visible"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_rows_read_back_with_schema_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("products.csv");

        let written = CsvExporter::new(&path)
            .write(&[record("Lamp"), record("Ghế gỗ")])
            .unwrap();
        assert_eq!(written, 2);

        let bytes = fs::read(&path).unwrap();
        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), ExportField::COUNT);
        assert_eq!(&headers[0], "ID");
        assert_eq!(&headers[ExportField::COUNT - 1], "Position");

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][3], "Ghế gỗ");
    }

    #[test]
    fn test_empty_run_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        CsvExporter::new(&path).write(&[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_start_matches('\u{feff}').lines().count(), 1);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = CsvExporter::new(blocker.join("out.csv")).write(&[]).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
