//! Delimited-file export.
//!
//! Writes a header row followed by one record per table row, without an index
//! column. Files are written next to the target and renamed into place, so an
//! interrupted export never leaves a truncated file behind.

use crate::config::ExportConfig;
use crate::error::{ExtractError, Result};
use crate::table::Table;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serializes tables as delimiter-separated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExporter {
    delimiter: char,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl CsvExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Creates an exporter from the export settings.
    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new().with_delimiter(config.delimiter)
    }

    /// Writes the table to `writer`. Each record ends with `\n`.
    pub fn write_to<W: Write>(&self, table: &Table, writer: &mut W) -> io::Result<()> {
        self.write_record(writer, table.columns().iter().map(String::as_str))?;
        let subseconds = table.column_subseconds();
        for row in table.rows() {
            let fields: Vec<String> = row
                .iter()
                .zip(&subseconds)
                .map(|(value, subseconds)| value.to_export_string_with(*subseconds))
                .collect();
            self.write_record(writer, fields.iter().map(String::as_str))?;
        }
        Ok(())
    }

    /// Renders the table to a string.
    pub fn to_csv_string(&self, table: &Table) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(table, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Writes the table to `path`, replacing any existing file.
    ///
    /// On failure the target path is left untouched and the temporary file
    /// is removed.
    pub fn write_file(&self, table: &Table, path: &Path) -> Result<()> {
        let tmp_path = partial_path(path)?;
        debug!("Writing export to temporary file {}", tmp_path.display());

        let result = self
            .write_new_file(table, &tmp_path)
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(ExtractError::export(format!(
                "Failed to write {}: {e}",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            rows = table.row_count(),
            "Exported table"
        );
        Ok(())
    }

    fn write_new_file(&self, table: &Table, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(table, &mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()
    }

    fn write_record<'a, W, I>(&self, writer: &mut W, fields: I) -> io::Result<()>
    where
        W: Write,
        I: Iterator<Item = &'a str>,
    {
        let mut delimiter = [0u8; 4];
        let delimiter = self.delimiter.encode_utf8(&mut delimiter).as_bytes();

        for (i, field) in fields.enumerate() {
            if i > 0 {
                writer.write_all(delimiter)?;
            }
            if self.needs_quotes(field) {
                writer.write_all(b"\"")?;
                writer.write_all(field.replace('"', "\"\"").as_bytes())?;
                writer.write_all(b"\"")?;
            } else {
                writer.write_all(field.as_bytes())?;
            }
        }
        writer.write_all(b"\n")
    }

    fn needs_quotes(&self, field: &str) -> bool {
        field
            .chars()
            .any(|c| c == self.delimiter || matches!(c, '"' | '\r' | '\n'))
    }
}

/// Returns the hidden sibling path used while an export is in progress.
fn partial_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        ExtractError::export(format!("'{}' does not name a file", path.display()))
    })?;
    Ok(path.with_file_name(format!(".{}.partial", file_name.to_string_lossy())))
}
