//! Aligned text rendering of query results.
//!
//! The renderer prints a header of column names before the first row, then
//! one line per row. Every field is right-justified to a fixed width and
//! nothing is escaped or truncated.

use std::fmt;
use std::io::{self, Write};

use crate::error::{Result, TourError};

/// Field width used when none is configured.
pub const DEFAULT_COLUMN_WIDTH: usize = 15;

/// Significant digits kept when printing a float.
pub const FLOAT_PRECISION: usize = 6;

/// Runtime storage class of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

/// A single typed value. SQLite types each value independently of its
/// column, so the tag travels with the cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    Null,
    /// A value the source could not classify. Renders as an empty field.
    Unsupported,
}

impl Cell {
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Integer(_) => Some(CellKind::Integer),
            Cell::Float(_) => Some(CellKind::Float),
            Cell::Text(_) => Some(CellKind::Text),
            Cell::Blob(_) => Some(CellKind::Blob),
            Cell::Null => Some(CellKind::Null),
            Cell::Unsupported => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(v) => fmt::Display::fmt(v, f),
            Cell::Float(v) => f.pad(&format_general(*v, FLOAT_PRECISION)),
            Cell::Text(v) => f.pad(v),
            Cell::Blob(_) => f.pad("BLOB"),
            Cell::Null => f.pad("NULL"),
            Cell::Unsupported => f.pad(""),
        }
    }
}

/// `%g`-style formatting: `precision` significant digits, fixed notation
/// unless the exponent is below -4 or at least `precision`, trailing zeros
/// removed.
pub fn format_general(v: f64, precision: usize) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let precision = precision.max(1);
    // Rounding to `precision` digits can bump the exponent (999999.5 -> 1e+06).
    let sci = format!("{:.*e}", precision - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<Vec<u8>> for Cell {
    fn from(v: Vec<u8>) -> Self {
        Cell::Blob(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub ordinal: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }
}

/// Build a schema from names, numbering columns from zero.
pub fn columns_from_names<I, S>(names: I) -> Vec<Column>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .enumerate()
        .map(|(ordinal, name)| Column::new(name, ordinal))
        .collect()
}

pub type Row = Vec<Cell>;

/// A stream of rows sharing one schema.
pub trait RowSource {
    type Error: From<io::Error>;

    fn columns(&self) -> &[Column];

    fn next_row(&mut self) -> std::result::Result<Option<Row>, Self::Error>;
}

/// A fully materialized query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_columns(columns_from_names(names))
    }

    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Its width must equal the column count.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(TourError::RowShape {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> OwnedRows {
        OwnedRows {
            columns: self.columns,
            rows: self.rows.into_iter(),
        }
    }
}

/// Consuming row stream over a [`ResultSet`].
#[derive(Debug)]
pub struct OwnedRows {
    columns: Vec<Column>,
    rows: std::vec::IntoIter<Row>,
}

impl RowSource for OwnedRows {
    type Error = io::Error;

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> io::Result<Option<Row>> {
        Ok(self.rows.next())
    }
}

/// Writes rows as fixed-width, right-justified text.
///
/// The header is written once, before the first row this renderer sees.
/// A renderer that never receives a row writes nothing.
#[derive(Debug)]
pub struct TableRenderer<W> {
    out: W,
    width: usize,
    rows: u64,
}

impl<W: Write> TableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: DEFAULT_COLUMN_WIDTH,
            rows: 0,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Rows written so far.
    pub fn rows_rendered(&self) -> u64 {
        self.rows
    }

    pub fn push_row(&mut self, columns: &[Column], row: &[Cell]) -> io::Result<()> {
        debug_assert_eq!(columns.len(), row.len());
        let width = self.width;
        if self.rows == 0 {
            for column in columns {
                write!(self.out, "{:>width$}", column.name)?;
            }
            writeln!(self.out)?;
        }
        for cell in row {
            write!(self.out, "{cell:>width$}")?;
        }
        writeln!(self.out)?;
        self.rows += 1;
        Ok(())
    }

    /// Drain `source`, returning how many rows it produced.
    pub fn render<S: RowSource>(&mut self, source: &mut S) -> std::result::Result<u64, S::Error> {
        let start = self.rows;
        while let Some(row) = source.next_row()? {
            self.push_row(source.columns(), &row)?;
        }
        Ok(self.rows - start)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render a whole result set with the default width.
pub fn render_table<W: Write>(out: W, result: ResultSet) -> io::Result<u64> {
    TableRenderer::new(out).render(&mut result.into_rows())
}
