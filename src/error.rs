use thiserror::Error;

#[derive(Debug, Error)]
pub enum TourError {
    #[error("error opening database {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },
    #[error("error closing database {path}: {source}")]
    Close {
        path: String,
        source: rusqlite::Error,
    },
    #[error("SQL statement error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("row has {actual} cells but the result set has {expected} columns")]
    RowShape { expected: usize, actual: usize },
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TourError>;
