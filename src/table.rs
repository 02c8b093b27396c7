//! In-memory result table and its console rendering.

use crate::config::DisplayConfig;
use crate::db::{QueryResult, Row, Subseconds};
use crate::error::{ExtractError, Result};
use unicode_width::UnicodeWidthStr;

/// Column names paired with the rows fetched for them.
///
/// Every row holds exactly one value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, rejecting rows whose width differs from the header.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ExtractError::internal(format!(
                "row {index} has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from a query result.
    pub fn from_query_result(result: QueryResult) -> Result<Self> {
        let columns = result.column_names();
        Self::new(columns, result.rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fractional-second precision for each column, so a column's
    /// temporal values all share one shape.
    pub fn column_subseconds(&self) -> Vec<Subseconds> {
        (0..self.columns.len())
            .map(|i| Subseconds::for_column(self.rows.iter().map(|row| &row[i])))
            .collect()
    }

    /// Renders the table for the console.
    ///
    /// A leading index column numbers the rows from 0. Tables longer than
    /// `display.max_rows` show only `display.min_rows` rows split between
    /// head and tail around an ellipsis line.
    pub fn render(&self, display: &DisplayConfig) -> String {
        let mut headers = Vec::with_capacity(self.columns.len() + 1);
        headers.push(String::new());
        headers.extend(self.columns.iter().cloned());

        let subseconds = self.column_subseconds();
        let mut body: Vec<Vec<String>> = Vec::new();
        if self.rows.len() > display.max_rows {
            let head = display.min_rows.div_ceil(2).min(self.rows.len());
            let tail = (display.min_rows / 2).min(self.rows.len() - head);
            body.extend((0..head).map(|i| self.display_row(i, &subseconds)));
            body.push(vec!["...".to_string(); headers.len()]);
            body.extend(
                (self.rows.len() - tail..self.rows.len()).map(|i| self.display_row(i, &subseconds)),
            );
        } else {
            body.extend((0..self.rows.len()).map(|i| self.display_row(i, &subseconds)));
        }

        let mut output = format_grid(&headers, &body);
        if self.is_empty() {
            output.push_str("(0 rows)\n");
        }
        output.push_str(&format!(
            "[{} rows x {} columns]",
            self.row_count(),
            self.column_count()
        ));
        output
    }

    fn display_row(&self, index: usize, subseconds: &[Subseconds]) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.columns.len() + 1);
        cells.push(index.to_string());
        cells.extend(
            self.rows[index]
                .iter()
                .zip(subseconds)
                .map(|(value, subseconds)| value.to_display_string_with(*subseconds)),
        );
        cells
    }
}

/// Formats headers and rows as padded columns, one line each.
///
/// Widths are measured in terminal columns, so wide and combining
/// characters stay aligned.
fn format_grid(headers: &[String], rows: &[Vec<String>]) -> String {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.width());
            }
        }
    }

    let format_line = |cells: &[String]| -> String {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                let padding = width.saturating_sub(cell.width());
                format!("{cell}{}", " ".repeat(padding))
            })
            .collect();
        let mut line = line.join(" │ ").trim_end().to_string();
        line.push('\n');
        line
    };

    let mut output = format_line(headers);

    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    output.push_str(&separator.join("─┼─"));
    output.push('\n');

    for row in rows {
        output.push_str(&format_line(row));
    }

    output
}
