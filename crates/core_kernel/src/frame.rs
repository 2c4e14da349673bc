//! Tabular record set
//!
//! A [`Frame`] is an ordered collection of named, typed columns that all share
//! the same row count. It is the working structure threaded through every
//! pipeline step: steps may add, replace, rename or drop columns, but no
//! operation on a frame ever drops rows.
//!
//! Columns are stored as [`ColumnData`], one `Vec<Option<T>>` per element
//! type, where `None` marks a missing cell.

use crate::error::FrameError;
use crate::value::{DType, Scalar};

/// Values of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// Creates a column of `len` missing cells
    pub fn missing(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::Float => ColumnData::Float(vec![None; len]),
            DType::Int => ColumnData::Int(vec![None; len]),
            DType::Text => ColumnData::Text(vec![None; len]),
        }
    }

    /// Creates a column repeating `value` for `len` rows
    pub fn repeat(value: &Scalar, len: usize) -> Self {
        match value {
            Scalar::Float(v) => ColumnData::Float(vec![Some(*v); len]),
            Scalar::Int(v) => ColumnData::Int(vec![Some(*v); len]),
            Scalar::Text(v) => ColumnData::Text(vec![Some(v.clone()); len]),
        }
    }

    /// Float column from computed values; non-finite results become missing
    pub fn from_f64(values: Vec<Option<f64>>) -> Self {
        ColumnData::Float(
            values
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect(),
        )
    }

    /// Column from heterogeneous values
    ///
    /// All-integer input stays integer, all-numeric input becomes float, and
    /// anything mixing text is rendered as text. All-missing input is float.
    pub fn from_scalars(values: Vec<Option<Scalar>>) -> Self {
        let present = || values.iter().flatten();

        if present().all(|v| matches!(v, Scalar::Int(_))) && present().next().is_some() {
            ColumnData::Int(values.iter().map(|v| v.as_ref().and_then(Scalar::as_i64)).collect())
        } else if present().all(|v| v.dtype().is_numeric()) {
            ColumnData::Float(values.iter().map(|v| v.as_ref().and_then(Scalar::as_f64)).collect())
        } else {
            ColumnData::Text(values.iter().map(|v| v.as_ref().map(|s| s.to_string())).collect())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Float(_) => DType::Float,
            ColumnData::Int(_) => DType::Int,
            ColumnData::Text(_) => DType::Text,
        }
    }

    /// Returns the value at `row`, `None` if missing or out of bounds
    pub fn get(&self, row: usize) -> Option<Scalar> {
        match self {
            ColumnData::Float(v) => v.get(row).copied().flatten().map(Scalar::Float),
            ColumnData::Int(v) => v.get(row).copied().flatten().map(Scalar::Int),
            ColumnData::Text(v) => v.get(row).cloned().flatten().map(Scalar::Text),
        }
    }

    /// Numeric value at `row`; text cells and missing cells yield `None`
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Float(v) => v.get(row).copied().flatten(),
            ColumnData::Int(v) => v.get(row).copied().flatten().map(|x| x as f64),
            ColumnData::Text(_) => None,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Float(v) => matches!(v.get(row), Some(None)),
            ColumnData::Int(v) => matches!(v.get(row), Some(None)),
            ColumnData::Text(v) => matches!(v.get(row), Some(None)),
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Int(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// All cells as optional scalars
    pub fn scalars(&self) -> Vec<Option<Scalar>> {
        (0..self.len()).map(|row| self.get(row)).collect()
    }

    /// Converts every present cell to `to`
    ///
    /// Missing cells stay missing. Floats convert to integers by truncation
    /// toward zero; text converts to numbers by parsing the trimmed value.
    pub fn cast(&self, column: &str, to: DType) -> Result<ColumnData, FrameError> {
        match (self, to) {
            (ColumnData::Float(_), DType::Float)
            | (ColumnData::Int(_), DType::Int)
            | (ColumnData::Text(_), DType::Text) => Ok(self.clone()),

            (ColumnData::Int(cells), DType::Float) => Ok(ColumnData::Float(
                cells.iter().map(|c| c.map(|x| x as f64)).collect(),
            )),

            (ColumnData::Float(cells), DType::Int) => cells
                .iter()
                .map(|c| match c {
                    None => Ok(None),
                    Some(x) if x.is_finite() => Ok(Some(x.trunc() as i64)),
                    Some(x) => Err(FrameError::conversion(column, to, x)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ColumnData::Int),

            (ColumnData::Text(cells), DType::Int) => cells
                .iter()
                .map(|c| match c {
                    None => Ok(None),
                    Some(s) => s
                        .trim()
                        .parse::<i64>()
                        .map(Some)
                        .map_err(|_| FrameError::conversion(column, to, s)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ColumnData::Int),

            (ColumnData::Text(cells), DType::Float) => cells
                .iter()
                .map(|c| match c {
                    None => Ok(None),
                    Some(s) => s
                        .trim()
                        .parse::<f64>()
                        .map(Some)
                        .map_err(|_| FrameError::conversion(column, to, s)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ColumnData::Float),

            (ColumnData::Float(_) | ColumnData::Int(_), DType::Text) => Ok(ColumnData::Text(
                self.scalars()
                    .into_iter()
                    .map(|c| c.map(|v| v.to_string()))
                    .collect(),
            )),
        }
    }

    /// Replaces every missing cell with `value`
    ///
    /// Integer columns accept integers and integral floats; a non-integral
    /// float widens the column to float. Float columns accept any number.
    /// Text columns accept any scalar, rendered as text. A text value cannot
    /// fill a numeric column.
    pub fn fill_missing(&mut self, column: &str, value: &Scalar) -> Result<(), FrameError> {
        if self.missing_count() == 0 {
            return Ok(());
        }

        match self {
            ColumnData::Int(cells) => {
                if let Some(fill) = value.as_i64() {
                    cells.iter_mut().filter(|c| c.is_none()).for_each(|c| *c = Some(fill));
                } else if let Some(fill) = value.as_f64() {
                    let widened = cells
                        .iter()
                        .map(|c| Some(c.map(|x| x as f64).unwrap_or(fill)))
                        .collect();
                    *self = ColumnData::Float(widened);
                } else {
                    return Err(FrameError::conversion(column, DType::Int, value));
                }
            }
            ColumnData::Float(cells) => {
                let fill = value
                    .as_f64()
                    .ok_or_else(|| FrameError::conversion(column, DType::Float, value))?;
                cells.iter_mut().filter(|c| c.is_none()).for_each(|c| *c = Some(fill));
            }
            ColumnData::Text(cells) => {
                let fill = value.to_string();
                cells
                    .iter_mut()
                    .filter(|c| c.is_none())
                    .for_each(|c| *c = Some(fill.clone()));
            }
        }

        Ok(())
    }

    /// Picks the given rows, in the given order
    fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Float(v) => ColumnData::Float(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Int(v) => ColumnData::Int(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }
}

/// Tabular record set with a fixed row count
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    rows: usize,
    columns: Vec<Column>,
}

impl Frame {
    /// Creates an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frame from `(name, data)` pairs, in order
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if the columns disagree on row count and
    /// `DuplicateColumn` if a name repeats.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (S, ColumnData)>,
        S: Into<String>,
    {
        let mut frame = Frame::new();
        for (name, data) in columns {
            let name = name.into();
            if frame.contains(&name) {
                return Err(FrameError::DuplicateColumn(name));
            }
            frame.insert(name, data)?;
        }
        Ok(frame)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.position(name).map(|i| &self.columns[i].data)
    }

    /// Like [`Frame::column`] but absent columns are an error
    pub fn require(&self, name: &str) -> Result<&ColumnData, FrameError> {
        self.column(name).ok_or_else(|| FrameError::missing_column(name))
    }

    /// Value of one cell
    pub fn value(&self, column: &str, row: usize) -> Option<Scalar> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Inserts a column, replacing an existing one of the same name in place
    ///
    /// The first column inserted into an empty frame fixes its row count.
    pub fn insert(&mut self, name: impl Into<String>, data: ColumnData) -> Result<(), FrameError> {
        let name = name.into();

        if self.columns.is_empty() && self.rows == 0 {
            self.rows = data.len();
        } else if data.len() != self.rows {
            return Err(FrameError::LengthMismatch {
                column: name,
                expected: self.rows,
                actual: data.len(),
            });
        }

        match self.position(&name) {
            Some(i) => self.columns[i].data = data,
            None => self.columns.push(Column { name, data }),
        }
        Ok(())
    }

    /// Removes a column, returning its data if it was present
    pub fn remove(&mut self, name: &str) -> Option<ColumnData> {
        self.position(name).map(|i| self.columns.remove(i).data)
    }

    /// Renames a column in place
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), FrameError> {
        let index = self
            .position(from)
            .ok_or_else(|| FrameError::missing_column(from))?;
        if from != to && self.contains(to) {
            return Err(FrameError::DuplicateColumn(to.to_string()));
        }
        self.columns[index].name = to.to_string();
        Ok(())
    }

    /// Converts a column to another element type in place
    pub fn cast_column(&mut self, name: &str, to: DType) -> Result<(), FrameError> {
        let index = self
            .position(name)
            .ok_or_else(|| FrameError::missing_column(name))?;
        let cast = self.columns[index].data.cast(name, to)?;
        self.columns[index].data = cast;
        Ok(())
    }

    /// Fills missing cells of a column
    ///
    /// Returns `Ok(false)` without touching the frame when the column is
    /// absent.
    pub fn fill_missing(&mut self, name: &str, value: &Scalar) -> Result<bool, FrameError> {
        match self.position(name) {
            Some(i) => {
                self.columns[i].data.fill_missing(name, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// New frame holding only `names`, in the order given
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame, FrameError> {
        let mut selected = Frame {
            rows: self.rows,
            columns: Vec::with_capacity(names.len()),
        };
        for name in names {
            let name = name.as_ref();
            let data = self.require(name)?.clone();
            selected.columns.push(Column {
                name: name.to_string(),
                data,
            });
        }
        Ok(selected)
    }

    /// New frame holding the given rows, in the order given
    pub fn take_rows(&self, rows: &[usize]) -> Result<Frame, FrameError> {
        if let Some(&index) = rows.iter().find(|&&r| r >= self.rows) {
            return Err(FrameError::RowOutOfBounds {
                index,
                len: self.rows,
            });
        }
        Ok(Frame {
            rows: rows.len(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(rows),
                })
                .collect(),
        })
    }

    /// Returns true if any cell of any column is missing
    pub fn has_missing(&self) -> bool {
        self.columns.iter().any(|c| c.data.missing_count() > 0)
    }

    /// Row-major numeric matrix of the whole frame
    ///
    /// Every column must be numeric and fully populated.
    pub fn to_numeric_rows(&self) -> Result<Vec<Vec<f64>>, FrameError> {
        for column in &self.columns {
            if !column.data.dtype().is_numeric() {
                return Err(FrameError::NonNumeric {
                    column: column.name.clone(),
                    dtype: column.data.dtype(),
                });
            }
        }

        (0..self.rows)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| {
                        c.data.get_f64(row).ok_or_else(|| FrameError::MissingValue {
                            column: c.name.clone(),
                            row,
                        })
                    })
                    .collect()
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}
