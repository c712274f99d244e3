use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sqlite_tour::render::DEFAULT_COLUMN_WIDTH;
use sqlite_tour::tour::{
    self, TourConfig, DEFAULT_DB_PATH, DEFAULT_GENERATED_ROWS, DEFAULT_THRESHOLD,
};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "sqlite-tour")]
#[command(about = "Create, fill and query a small SQLite database, printing results as tables")]
#[command(version)]
struct Cli {
    /// Database file, created if missing
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Width of every printed column
    #[arg(long, default_value_t = DEFAULT_COLUMN_WIDTH)]
    width: usize,

    /// Rows to generate with the prepared INSERT
    #[arg(long, default_value_t = DEFAULT_GENERATED_ROWS)]
    rows: usize,

    /// Only generated rows with a number above this are selected
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: i64,

    /// Seed for the generated data
    #[arg(long)]
    seed: Option<u64>,
}

impl From<Cli> for TourConfig {
    fn from(cli: Cli) -> Self {
        Self {
            db_path: cli.db,
            column_width: cli.width,
            generated_rows: cli.rows,
            threshold: cli.threshold,
            seed: cli.seed,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries only the tables.
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = TourConfig::from(Cli::parse());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = tour::run(&config, &mut out)?;

    let failed: Vec<&str> = report.failures().map(|step| step.name).collect();
    if !failed.is_empty() {
        error!("{} step(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(ExitCode::from(report.exit_status()))
}
