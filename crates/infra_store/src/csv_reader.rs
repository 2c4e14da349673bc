//! CSV record sets
//!
//! Reads an uploaded CSV into a [`Frame`]. Each column's element type is
//! inferred from its non-empty cells: all integers gives an int column, all
//! numbers gives a float column, anything else gives text. Empty cells are
//! missing values.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use core_kernel::{ColumnData, Frame};
use crate::error::StoreError;

/// CSV to frame reader
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
    trim: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
        }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Parses CSV bytes with a header row
    ///
    /// # Errors
    ///
    /// `Csv` for malformed input or ragged rows, `EmptyCsv` when there are no
    /// data rows, `Frame` for repeated header names.
    pub fn read_frame(&self, bytes: &[u8]) -> Result<Frame, StoreError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        let records = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;
        if headers.is_empty() || records.is_empty() {
            return Err(StoreError::EmptyCsv);
        }

        let columns = headers.iter().enumerate().map(|(index, name)| {
            let cells: Vec<&str> = records.iter().map(|r| r.get(index).unwrap_or("")).collect();
            (name.to_string(), infer_column(&cells))
        });
        let frame = Frame::from_columns(columns.collect::<Vec<_>>())?;

        debug!(rows = frame.len(), columns = frame.width(), "Parsed CSV record set");
        Ok(frame)
    }
}

fn infer_column(cells: &[&str]) -> ColumnData {
    let present = || cells.iter().filter(|c| !c.is_empty());

    if present().all(|c| c.parse::<i64>().is_ok()) {
        ColumnData::Int(cells.iter().map(|c| c.parse().ok()).collect())
    } else if present().all(|c| c.parse::<f64>().is_ok()) {
        ColumnData::from_f64(cells.iter().map(|c| c.parse().ok()).collect())
    } else {
        ColumnData::Text(
            cells
                .iter()
                .map(|c| (!c.is_empty()).then(|| c.to_string()))
                .collect(),
        )
    }
}
