use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use fourd_db::models::{Candidate, DrawResult, PrizeTier};
use fourd_engine::config::BaseProbability;
use fourd_engine::frequency::FrequencyTable;
use fourd_engine::ScoredCandidate;

fn join_numbers(numbers: &[Candidate]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn display_draws(draws: &[DrawResult]) {
    if draws.is_empty() {
        println!("No draws to show.");
        return;
    }

    let mut table = new_table(vec!["Date", "Draw", "1st", "2nd", "3rd", "Starter", "Consolation"]);
    for draw in draws {
        table.add_row(vec![
            draw.date.to_string(),
            draw.draw_id.clone(),
            draw.first.to_string(),
            draw.second.to_string(),
            draw.third.to_string(),
            join_numbers(&draw.starters),
            join_numbers(&draw.consolations),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import finished:");
    println!("  Rows read         : {}", result.total_records);
    println!("  Inserted          : {}", result.inserted);
    println!("  Duplicates skipped: {}", result.skipped);
    if result.errors > 0 {
        println!("  Errors            : {}", result.errors);
    }
}

pub fn display_stats(table: &FrequencyTable, top: usize, window: u32, base: &BaseProbability) {
    println!("\nMost drawn numbers over the last {} draws\n", window);

    let mut out = new_table(vec!["Number", "Times drawn", "Base probability"]);
    for (number, count) in table.most_frequent(top) {
        out.add_row(vec![
            number.to_string(),
            count.to_string(),
            format!("{:.3}", table.base_probability(number, base)),
        ]);
    }
    println!("{out}");
}

pub fn display_check(number: Candidate, found: Option<(&DrawResult, PrizeTier)>) {
    match found {
        Some((draw, tier)) => println!(
            "{} last won {} on {} (draw {}).",
            number, tier, draw.date, draw.draw_id
        ),
        None => println!("{} has not been drawn in the stored history.", number),
    }
}

pub fn display_picks(picks: &[ScoredCandidate], date: NaiveDate, profile_name: &str) {
    let who = if profile_name.is_empty() { "you" } else { profile_name };
    println!("\nLucky numbers for {} on {}\n", who, date);

    if picks.is_empty() {
        println!("No picks today.");
        return;
    }

    let mut table = new_table(vec!["#", "Number", "Confidence", "Score", "Why"]);
    for (i, pick) in picks.iter().enumerate() {
        let color = match pick.confidence {
            70.. => Color::Green,
            50..=69 => Color::Yellow,
            _ => Color::White,
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(pick.number),
            Cell::new(format!("{}%", pick.confidence)).fg(color),
            Cell::new(format!("{:.3}", pick.score)),
            Cell::new(&pick.reason),
        ]);
    }
    println!("{table}");
}
