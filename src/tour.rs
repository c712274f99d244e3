//! The demonstration sequence: two tables, filled once with literal SQL and
//! once through a reused prepared statement, each read back as a table.
//!
//! Every step writes a blank line and its name to the output before running.

use std::io::Write;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::params;
use tracing::{error, info};

use crate::error::Result;
use crate::render::DEFAULT_COLUMN_WIDTH;
use crate::sqlite::Database;

pub const DEFAULT_DB_PATH: &str = "database.db";
pub const DEFAULT_GENERATED_ROWS: usize = 1000;
pub const DEFAULT_THRESHOLD: i64 = 90_000;

/// Process status when any step failed; the low byte of -1.
pub const FAILURE_EXIT_STATUS: u8 = 255;

/// Length of the random names written to `generated_data`.
pub const GENERATED_NAME_LEN: usize = 4;
/// Generated numbers fall in `[0, GENERATED_NUMBER_SCALE)`.
pub const GENERATED_NUMBER_SCALE: f64 = 100_000.0;

const CREATE_COMPANY: &str = "
    CREATE TABLE company (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        name    TEXT    NOT NULL,
        age     INTEGER NOT NULL,
        address CHAR(50),
        salary  REAL
    );";

const POPULATE_COMPANY: &str = "
    INSERT INTO company (name, age, address, salary) VALUES ('Paul', 32, 'California', 20000.00);
    INSERT INTO company (name, age, address, salary) VALUES ('Allen', 25, 'Texas', 15000.00);
    INSERT INTO company (name, age, address, salary) VALUES ('Teddy', 23, 'Norway', 25000.00);
    INSERT INTO company (name, age, address, salary) VALUES ('Mark', 25, 'Rich-Mond ', 65000.00);";

const SELECT_COMPANY: &str = "SELECT * FROM company";

const CREATE_GENERATED: &str = "
    CREATE TABLE generated_data (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        name   TEXT NOT NULL,
        number REAL
    );";

const INSERT_GENERATED: &str = "INSERT INTO generated_data (name, number) VALUES (?1, ?2);";

const SELECT_GENERATED: &str =
    "SELECT id, name, number FROM generated_data WHERE number > ?1 ORDER BY number DESC LIMIT 10";

#[derive(Debug, Clone, PartialEq)]
pub struct TourConfig {
    pub db_path: PathBuf,
    pub column_width: usize,
    /// Rows inserted into `generated_data`.
    pub generated_rows: usize,
    /// Lower bound (exclusive) on `number` for the final query.
    pub threshold: i64,
    /// Fixed seed for the generated data. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            column_width: DEFAULT_COLUMN_WIDTH,
            generated_rows: DEFAULT_GENERATED_ROWS,
            threshold: DEFAULT_THRESHOLD,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub struct StepReport {
    pub name: &'static str,
    /// Rows rendered, or rows inserted for `populate_table_advanced`.
    pub outcome: Result<u64>,
}

#[derive(Debug, Default)]
pub struct TourReport {
    pub steps: Vec<StepReport>,
}

impl TourReport {
    fn record(&mut self, name: &'static str, outcome: Result<u64>) {
        match &outcome {
            Ok(rows) => info!("{name} finished, {rows} row(s)"),
            Err(err) => error!("{name}: {err}"),
        }
        self.steps.push(StepReport { name, outcome });
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.outcome.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            FAILURE_EXIT_STATUS
        }
    }
}

fn banner<W: Write>(out: &mut W, step: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{step}")?;
    Ok(())
}

pub fn create_table_simple<W: Write>(db: &Database, out: &mut W) -> Result<u64> {
    banner(out, "create_table_simple")?;
    db.execute_rendered(CREATE_COMPANY, &mut *out)
}

pub fn populate_table_simple<W: Write>(db: &Database, out: &mut W) -> Result<u64> {
    banner(out, "populate_table_simple")?;
    db.execute_rendered(POPULATE_COMPANY, &mut *out)
}

pub fn select_simple<W: Write>(db: &Database, out: &mut W) -> Result<u64> {
    banner(out, "select_simple")?;
    db.execute_rendered(SELECT_COMPANY, &mut *out)
}

pub fn create_table_advanced<W: Write>(db: &Database, out: &mut W) -> Result<u64> {
    banner(out, "create_table_advanced")?;
    db.execute_rendered(CREATE_GENERATED, &mut *out)
}

/// Insert `count` random rows through one prepared statement.
pub fn populate_table_advanced<W: Write, R: Rng>(
    db: &Database,
    out: &mut W,
    rng: &mut R,
    count: usize,
) -> Result<u64> {
    banner(out, "populate_table_advanced")?;
    let mut stmt = db.prepare(INSERT_GENERATED)?;
    for _ in 0..count {
        let name = random_name(rng, GENERATED_NAME_LEN);
        let number = rng.gen::<f64>() * GENERATED_NUMBER_SCALE;
        stmt.execute(params![name, number])?;
    }
    Ok(count as u64)
}

pub fn select_advanced<W: Write>(db: &Database, out: &mut W, threshold: i64) -> Result<u64> {
    banner(out, "select_advanced")?;
    let mut stmt = db.prepare(SELECT_GENERATED)?;
    db.render_statement(&mut stmt, params![threshold], &mut *out)
}

/// Lowercase ASCII letters, `len` of them.
pub fn random_name<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Run every step against an open database. A failed step is logged and the
/// next one still runs.
pub fn run_steps<W: Write>(db: &Database, config: &TourConfig, out: &mut W) -> TourReport {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut report = TourReport::default();
    report.record("create_table_simple", create_table_simple(db, out));
    report.record("populate_table_simple", populate_table_simple(db, out));
    report.record("select_simple", select_simple(db, out));
    report.record("create_table_advanced", create_table_advanced(db, out));
    report.record(
        "populate_table_advanced",
        populate_table_advanced(db, out, &mut rng, config.generated_rows),
    );
    report.record("select_advanced", select_advanced(db, out, config.threshold));
    report
}

/// Open the configured database, run the tour and close it again.
///
/// Only opening and closing abort the run; step failures land in the report.
pub fn run<W: Write>(config: &TourConfig, out: &mut W) -> Result<TourReport> {
    let db = Database::open(&config.db_path)?.with_column_width(config.column_width);
    let report = run_steps(&db, config, out);
    db.close()?;
    Ok(report)
}
