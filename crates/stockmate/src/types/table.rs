//! Tabular query results and their markdown rendering

use serde::{Deserialize, Serialize};
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
};

/// A single cell of a query result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Real(_))
    }

    /// Text shown in a rendered table
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Real(f) => f.to_string(),
            CellValue::Text(s) => s.replace('|', "\\|").replace('\n', " "),
            CellValue::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

/// Rows by named columns, as returned by the query runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a pipe-style markdown table
    ///
    /// Columns whose non-null cells are all numbers are right-aligned,
    /// every other column is left-aligned.
    pub fn to_markdown(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().cloned());
        for row in &self.rows {
            builder.push_record(
                (0..self.columns.len())
                    .map(|i| row.get(i).map(CellValue::display).unwrap_or_default()),
            );
        }

        let mut table = builder.build();
        table.with(Style::markdown());
        for i in 0..self.columns.len() {
            if self.is_numeric_column(i) {
                table.modify(Columns::single(i), Alignment::right());
            }
        }

        table.to_string()
    }

    fn is_numeric_column(&self, index: usize) -> bool {
        let mut values = self
            .rows
            .iter()
            .filter_map(|row| row.get(index))
            .filter(|v| !matches!(v, CellValue::Null))
            .peekable();
        values.peek().is_some() && values.all(CellValue::is_numeric)
    }
}
