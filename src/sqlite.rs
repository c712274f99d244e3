use std::io::Write;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params, Batch, Connection, OpenFlags, Params, Rows, Statement};
use tracing::info;

use crate::error::{Result, TourError};
use crate::render::{
    columns_from_names, Cell, Column, ResultSet, Row, RowSource, TableRenderer,
    DEFAULT_COLUMN_WIDTH,
};

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Integer(v),
            ValueRef::Real(v) => Cell::Float(v),
            ValueRef::Text(v) => Cell::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => Cell::Blob(v.to_vec()),
        }
    }
}

/// Rows of a running statement, read one step at a time.
pub struct StatementRows<'stmt> {
    columns: Vec<Column>,
    rows: Rows<'stmt>,
}

impl<'stmt> StatementRows<'stmt> {
    /// Bind `params` and start stepping `stmt`.
    pub fn new<P: Params>(stmt: &'stmt mut Statement<'_>, params: P) -> Result<Self> {
        let columns = columns_from_names(stmt.column_names());
        let rows = stmt.query(params)?;
        Ok(Self { columns, rows })
    }
}

impl RowSource for StatementRows<'_> {
    type Error = TourError;

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        let width = self.columns.len();
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(Cell::from(row.get_ref(idx)?));
        }
        Ok(Some(cells))
    }
}

/// An open SQLite database and the width its result tables are printed with.
pub struct Database {
    conn: Connection,
    path: String,
    column_width: usize,
}

impl Database {
    /// Open `path` read-write, creating the file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().display().to_string();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|source| TourError::Open {
            path: path.clone(),
            source,
        })?;
        info!("database {} opened successfully", path);
        Ok(Self::from_connection(conn, path))
    }

    pub fn open_in_memory() -> Result<Self> {
        let path = ":memory:".to_string();
        let conn = Connection::open_in_memory().map_err(|source| TourError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self::from_connection(conn, path))
    }

    fn from_connection(conn: Connection, path: String) -> Self {
        Self {
            conn,
            path,
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }

    pub fn with_column_width(mut self, width: usize) -> Self {
        self.column_width = width;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run every statement in `sql`, rendering whatever rows they produce.
    ///
    /// One renderer serves the whole batch, so the header is printed at most
    /// once. Returns the number of rows rendered.
    pub fn execute_rendered<W: Write>(&self, sql: &str, out: W) -> Result<u64> {
        let mut renderer = self.renderer(out);
        let mut batch = Batch::new(&self.conn, sql);
        while let Some(mut stmt) = batch.next()? {
            let mut rows = StatementRows::new(&mut stmt, params![])?;
            renderer.render(&mut rows)?;
        }
        Ok(renderer.rows_rendered())
    }

    /// Prepare `sql`, logging how many positional parameters it takes.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        let stmt = self.conn.prepare(sql)?;
        info!(
            "the statement \"{}\" has {} parameter(s)",
            sql,
            stmt.parameter_count()
        );
        Ok(stmt)
    }

    /// Bind `params` to an already prepared statement and render its rows.
    pub fn render_statement<P: Params, W: Write>(
        &self,
        stmt: &mut Statement<'_>,
        params: P,
        out: W,
    ) -> Result<u64> {
        let mut rows = StatementRows::new(stmt, params)?;
        self.renderer(out).render(&mut rows)
    }

    pub fn query_rendered<P: Params, W: Write>(&self, sql: &str, params: P, out: W) -> Result<u64> {
        let mut stmt = self.prepare(sql)?;
        self.render_statement(&mut stmt, params, out)
    }

    /// Run a query and keep its rows in memory.
    pub fn collect<P: Params>(&self, sql: &str, params: P) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = StatementRows::new(&mut stmt, params)?;
        let mut result = ResultSet::with_columns(rows.columns().to_vec());
        while let Some(row) = rows.next_row()? {
            result.push(row)?;
        }
        Ok(result)
    }

    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, source)| TourError::Close {
                path: path.clone(),
                source,
            })?;
        info!("database {} closed", path);
        Ok(())
    }

    fn renderer<W: Write>(&self, out: W) -> TableRenderer<W> {
        TableRenderer::new(out).with_width(self.column_width)
    }
}
