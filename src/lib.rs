//! A guided tour of SQLite through `rusqlite`.
//!
//! # Intention
//!
//! - Show the basic life of an embedded database: open a file, create
//!   tables, insert rows with literal SQL and with prepared statements, and
//!   query them back.
//! - Print any query result as an aligned text table, whatever its width or
//!   the runtime type of each cell.
//!
//! # Architectural Boundaries
//!
//! - [`render`] knows nothing about SQLite; it formats rows from any
//!   [`render::RowSource`].
//! - [`sqlite`] owns the connection and adapts SQLite rows to the renderer.
//! - [`tour`] is the demonstration sequence and nothing else.

pub mod error;
pub mod render;
pub mod sqlite;
pub mod tour;

pub use error::{Result, TourError};
pub use render::{Cell, CellKind, Column, ResultSet, Row, RowSource, TableRenderer};
pub use sqlite::Database;
pub use tour::{TourConfig, TourReport};
