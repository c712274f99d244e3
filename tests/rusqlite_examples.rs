use rusqlite::params;
use sqlite_tour::render::render_table;
use sqlite_tour::tour::{self, TourConfig, GENERATED_NUMBER_SCALE};
use sqlite_tour::{Cell, Database, Result, ResultSet, TourError};
use tempfile::{NamedTempFile, TempDir};

// Helper function to create an in-memory database with both tour tables
fn create_test_db() -> Result<Database> {
    let db = Database::open_in_memory()?;
    let mut sink = Vec::<u8>::new();
    tour::create_table_simple(&db, &mut sink)?;
    tour::create_table_advanced(&db, &mut sink)?;
    Ok(db)
}

// Helper function to create a tour config backed by a temporary file
fn create_temp_config(generated_rows: usize) -> (TourConfig, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let config = TourConfig {
        db_path: temp_file.path().to_path_buf(),
        generated_rows,
        seed: Some(2024),
        ..TourConfig::default()
    };
    (config, temp_file)
}

fn count_rows(db: &Database, table: &str) -> i64 {
    db.connection()
        .query_row(&format!("SELECT count(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

// Lines printed by one step, without its banner
fn step_output<'a>(text: &'a str, step: &str) -> Vec<&'a str> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| *line == step).unwrap() + 1;
    lines[start..]
        .iter()
        .take_while(|line| !line.is_empty())
        .copied()
        .collect()
}

#[test]
fn test_full_tour_on_file() {
    let (config, temp_file) = create_temp_config(1000);
    let mut out = Vec::new();
    let report = tour::run(&config, &mut out).unwrap();
    assert!(report.is_success());
    assert_eq!(report.steps.len(), 6);

    let text = String::from_utf8(out).unwrap();
    let company = step_output(&text, "select_simple");
    assert_eq!(company.len(), 5);
    assert!(company[0].ends_with("salary"));
    assert!(company[4].contains("Rich-Mond"));

    // 1000 uniform draws leave far more than 10 above 90000
    let selected = step_output(&text, "select_advanced");
    assert_eq!(selected.len(), 11);
    assert_eq!(
        selected[0].split_whitespace().collect::<Vec<_>>(),
        ["id", "name", "number"]
    );
    let numbers: Vec<f64> = selected[1..]
        .iter()
        .map(|line| line.split_whitespace().nth(2).unwrap().parse().unwrap())
        .collect();
    assert!(selected.iter().all(|line| line.len() == 3 * config.column_width));
    // six significant digits can round a value just above the threshold onto it
    assert!(numbers.iter().all(|n| *n >= config.threshold as f64));
    assert!(numbers.windows(2).all(|pair| pair[0] >= pair[1]));

    let db = Database::open(temp_file.path()).unwrap();
    assert_eq!(db.path(), temp_file.path().display().to_string());
    assert_eq!(count_rows(&db, "company"), 4);
    assert_eq!(count_rows(&db, "generated_data"), 1000);
    db.close().unwrap();
}

#[test]
fn test_second_run_keeps_going() {
    let (config, _temp_file) = create_temp_config(10);
    tour::run(&config, &mut Vec::<u8>::new()).unwrap();
    let report = tour::run(&config, &mut Vec::<u8>::new()).unwrap();

    let failed: Vec<&str> = report.failures().map(|step| step.name).collect();
    assert_eq!(failed, ["create_table_simple", "create_table_advanced"]);
    assert!(matches!(report.steps[0].outcome, Err(TourError::Sql(_))));

    let db = Database::open(&config.db_path).unwrap();
    assert_eq!(count_rows(&db, "company"), 8);
    assert_eq!(count_rows(&db, "generated_data"), 20);
}

#[test]
fn test_generated_rows() {
    let db = create_test_db().unwrap();
    let mut rng = rand::thread_rng();
    let inserted =
        tour::populate_table_advanced(&db, &mut Vec::<u8>::new(), &mut rng, 250).unwrap();
    assert_eq!(inserted, 250);

    let result = db
        .collect("SELECT id, name, number FROM generated_data ORDER BY id", params![])
        .unwrap();
    assert_eq!(result.len(), 250);
    for (idx, row) in result.rows().iter().enumerate() {
        assert_eq!(row[0], Cell::Integer(idx as i64 + 1));
        match &row[1] {
            Cell::Text(name) => {
                assert_eq!(name.len(), 4);
                assert!(name.bytes().all(|b| b.is_ascii_lowercase()));
            }
            other => panic!("unexpected name cell {other:?}"),
        }
        match row[2] {
            Cell::Float(n) => assert!((0.0..GENERATED_NUMBER_SCALE).contains(&n)),
            ref other => panic!("unexpected number cell {other:?}"),
        }
    }
}

#[test]
fn test_select_advanced_without_matches() {
    let db = create_test_db().unwrap();
    let mut out = Vec::new();
    let rendered = tour::select_advanced(&db, &mut out, 90_000).unwrap();
    assert_eq!(rendered, 0);
    assert_eq!(String::from_utf8(out).unwrap(), "\nselect_advanced\n");
}

#[test]
fn test_open_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("database.db");
    let err = Database::open(&path).err().unwrap();
    assert!(matches!(err, TourError::Open { .. }));
    assert!(err.to_string().contains("database.db"));
}

#[tokio::test]
async fn test_render_inside_runtime() {
    test_render_inside_runtime_impl().unwrap();
}

fn test_render_inside_runtime_impl() -> Result<()> {
    let db = Database::open_in_memory()?;
    let mut result = ResultSet::new(["id", "name", "age"]);
    let source = db.collect("SELECT 1, 'Paul', 32 UNION ALL SELECT 2, 'Allen', 25", params![])?;
    for row in source.rows() {
        result.push(row.clone())?;
    }

    let mut out = Vec::new();
    let count = render_table(&mut out, result)?;
    assert_eq!(count, 2);
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], format!("{:>15}{:>15}{:>15}", "id", "name", "age"));
    assert_eq!(lines[2], format!("{:>15}{:>15}{:>15}", 2, "Allen", 25));
    Ok(())
}
