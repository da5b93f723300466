use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Candidate, DrawResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_id       TEXT PRIMARY KEY,
    date          TEXT NOT NULL,
    first_prize   TEXT NOT NULL,
    second_prize  TEXT NOT NULL,
    third_prize   TEXT NOT NULL,
    starters      TEXT NOT NULL,
    consolations  TEXT NOT NULL
);
";

const SELECT_DRAWS: &str = "
SELECT draw_id, date, first_prize, second_prize, third_prize, starters, consolations
FROM draws ORDER BY date DESC, draw_id DESC";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("fourd.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Migration failed")?;
    Ok(())
}

fn join_numbers(numbers: &[Candidate]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn insert_draw(conn: &Connection, draw: &DrawResult) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (draw_id, date, first_prize, second_prize, third_prize, starters, consolations)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            draw.draw_id,
            draw.date,
            draw.first.to_string(),
            draw.second.to_string(),
            draw.third.to_string(),
            join_numbers(&draw.starters),
            join_numbers(&draw.consolations),
        ],
    ).context("Insert failed")?;
    Ok(changed > 0)
}

/// Row as stored; prize numbers are checked when converted.
struct DrawRow {
    draw_id: String,
    date: NaiveDate,
    prizes: [String; 3],
    starters: String,
    consolations: String,
}

impl DrawRow {
    fn into_draw(self) -> Result<DrawResult> {
        let numbers = self
            .prizes
            .iter()
            .map(String::as_str)
            .chain(self.starters.split_whitespace())
            .chain(self.consolations.split_whitespace())
            .map(Candidate::parse)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Corrupt prize number in draw {}", self.draw_id))?;
        DrawResult::from_numbers(self.draw_id, self.date, &numbers)
    }
}

fn query_draws(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<DrawResult>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok(DrawRow {
            draw_id: row.get(0)?,
            date: row.get(1)?,
            prizes: [row.get(2)?, row.get(3)?, row.get(4)?],
            starters: row.get(5)?,
            consolations: row.get(6)?,
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(DrawRow::into_draw).collect()
}

/// Most recent draws first.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawResult>> {
    query_draws(conn, &format!("{SELECT_DRAWS} LIMIT ?1"), [limit])
}

/// Whole history, most recent first.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<DrawResult>> {
    query_draws(conn, SELECT_DRAWS, [])
}

pub fn fetch_latest_draw(conn: &Connection) -> Result<Option<DrawResult>> {
    Ok(fetch_last_draws(conn, 1)?.into_iter().next())
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
