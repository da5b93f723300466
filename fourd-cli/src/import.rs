use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use fourd_db::rusqlite::Connection;
use std::path::Path;
use tracing::warn;

use fourd_db::db::insert_draw;
use fourd_db::models::{validate_draw, Candidate, DrawResult, PRIZE_COUNT};

/// Column of the first prize number; draw_id and date come before it.
const FIRST_NUMBER_COLUMN: usize = 2;

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .with_context(|| format!("Invalid date format: '{}'", raw))
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawResult> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Missing field at index {}", idx))
    };

    if record.len() < FIRST_NUMBER_COLUMN + PRIZE_COUNT {
        bail!(
            "Expected {} columns, got {}",
            FIRST_NUMBER_COLUMN + PRIZE_COUNT,
            record.len()
        );
    }

    let draw_id = get(0)?;
    let date = parse_date(&get(1)?)?;

    let numbers = (FIRST_NUMBER_COLUMN..FIRST_NUMBER_COLUMN + PRIZE_COUNT)
        .map(|idx| {
            let s = get(idx)?;
            Candidate::parse(&s).with_context(|| format!("Cannot parse '{}' (index {})", s, idx))
        })
        .collect::<Result<Vec<_>>>()?;

    let draw = DrawResult::from_numbers(draw_id, date, &numbers)?;
    validate_draw(&draw)?;
    Ok(draw)
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Cannot start transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => {
                match parse_record(&record) {
                    Ok(draw) => {
                        match insert_draw(&tx, &draw) {
                            Ok(true) => result.inserted += 1,
                            Ok(false) => result.skipped += 1,
                            Err(e) => {
                                warn!(line = result.total_records, "insert failed: {:#}", e);
                                result.errors += 1;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(line = result.total_records, "parse failed: {:#}", e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                warn!(line = result.total_records, "read failed: {}", e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Commit failed")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fourd_db::db::{count_draws, fetch_all_draws, migrate};
    use std::io::Write;

    const HEADER: &str = "draw_id,date,first,second,third,\
starter_1,starter_2,starter_3,starter_4,starter_5,starter_6,starter_7,starter_8,starter_9,starter_10,\
consolation_1,consolation_2,consolation_3,consolation_4,consolation_5,consolation_6,consolation_7,consolation_8,consolation_9,consolation_10";

    fn row(draw_id: &str, date: &str, start: u16) -> String {
        let numbers: Vec<String> = (start..start + PRIZE_COUNT as u16)
            .map(|n| format!("{:04}", n))
            .collect();
        format!("{},{},{}", draw_id, date, numbers.join(","))
    }

    fn write_csv(lines: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2026-02-17").unwrap(), NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        assert_eq!(parse_date("01/01/2020").unwrap(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(parse_date(" 28/07/1985 ").unwrap(), NaiveDate::from_ymd_opt(1985, 7, 28).unwrap());
        assert!(parse_date("2026/02/17").is_err());
        assert!(parse_date("31/02/2020").is_err());
    }

    #[test]
    fn test_import_counts() {
        let file = write_csv(&[
            row("5100", "2024-01-03", 100),
            row("5101", "06/01/2024", 200),
            row("5100", "2024-01-03", 100),
            "5102,2024-01-10,12,0001".to_string(),
            row("5103", "2024-01-13", 300).replace("0301", "0300"),
        ]);
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let result = import_csv(&conn, file.path()).unwrap();
        assert_eq!(result.total_records, 5);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 2);
        assert_eq!(count_draws(&conn).unwrap(), 2);

        let draws = fetch_all_draws(&conn).unwrap();
        assert_eq!(draws[0].draw_id, "5101");
        assert_eq!(draws[0].first.to_string(), "0200");
        assert_eq!(draws[0].consolations[9].to_string(), "0222");
    }

    #[test]
    fn test_import_missing_file() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert!(import_csv(&conn, Path::new("/nonexistent/draws.csv")).is_err());
    }
}
