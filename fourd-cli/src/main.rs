mod display;
mod import;
mod profile;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::display::{
    display_check, display_draws, display_import_summary, display_picks, display_stats,
};
use crate::profile::Profile;
use crate::settings::{init_tracing, load_engine_config};
use fourd_db::db::{count_draws, db_path, fetch_all_draws, fetch_last_draws, migrate, open_db};
use fourd_db::models::{last_appearance, Candidate};
use fourd_db::rusqlite::Connection;
use fourd_engine::frequency::FrequencyTable;
use fourd_engine::{daily_picks, PredictionInput};

const EMPTY_DB: &str = "Empty database. Run first: fourd import";

#[derive(Parser)]
#[command(name = "fourd", about = "Daily lucky-number picks for 4D draws")]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import draw results from a CSV file
    Import {
        /// Path to the CSV file
        #[arg(short, long, default_value = "assets/fourd_draws.csv")]
        file: PathBuf,
    },

    /// Print the database path
    DbPath,

    /// List the latest draws
    List {
        /// Number of draws to show
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Most drawn numbers
    Stats {
        /// Analysis window (number of draws)
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Number of rows to show
        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// When a number last won, and at which tier
    Check {
        /// A 4-digit number, e.g. 0728
        number: Candidate,
    },

    /// Rank today's picks for a profile
    Predict {
        /// Profile file (TOML)
        #[arg(short, long)]
        profile: PathBuf,

        /// Reference date (YYYY-MM-DD); defaults to today in the configured timezone
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Engine settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window, top } => cmd_stats(&conn, window, top),
        Command::Check { number } => cmd_check(&conn, number),
        Command::Predict {
            profile,
            date,
            config,
        } => cmd_predict(&conn, &profile, date, config.as_deref()),
    }
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    info!(inserted = result.inserted, errors = result.errors, "import done");
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_draws(conn)? == 0 {
        println!("{EMPTY_DB}");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, window: u32, top: usize) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("{EMPTY_DB}");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;
    let table = FrequencyTable::build(&draws);
    let config = load_engine_config(None)?;

    display_stats(&table, top, effective_window, &config.base);
    Ok(())
}

fn cmd_check(conn: &Connection, number: Candidate) -> Result<()> {
    let history = fetch_all_draws(conn)?;
    if history.is_empty() {
        println!("{EMPTY_DB}");
        return Ok(());
    }
    display_check(number, last_appearance(&history, number));
    Ok(())
}

fn cmd_predict(
    conn: &Connection,
    profile_path: &Path,
    date: Option<NaiveDate>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_engine_config(config_path)?;
    let profile = Profile::load(profile_path)?;

    let history = fetch_all_draws(conn)?;
    if history.is_empty() {
        println!("No draw history yet, every number gets the neutral base. Run: fourd import");
    }

    let related = profile.related_numbers();
    let sources = profile.sources();
    let date = date.unwrap_or_else(|| config.reference_date(Utc::now()));

    let input = PredictionInput {
        related: &related,
        latest: history.first(),
        history: &history,
        sources: &sources,
        date,
    };
    let picks = daily_picks(&input, &config);

    display_picks(&picks, date, &profile.name);
    Ok(())
}
