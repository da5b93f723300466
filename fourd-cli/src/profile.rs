use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fourd_db::models::Candidate;
use fourd_engine::digits::{only_digits, windows4};

/// Personal numbers volunteered by one person, as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    /// "DD-MM-YYYY"
    pub birth_dates: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub addresses: Vec<String>,
    pub favorite_numbers: Vec<String>,
}

impl Profile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read profile {:?}", path))?;
        toml::from_str(&text).with_context(|| format!("Invalid profile {:?}", path))
    }

    /// The 4D numbers derived from the profile: DDMM, MMDD, DDYY and YYDD of
    /// each birth date, the first and last four digits of each phone number,
    /// and every 4-digit window of each favorite number.
    pub fn related_numbers(&self) -> BTreeSet<Candidate> {
        let mut related = BTreeSet::new();
        for date in &self.birth_dates {
            related.extend(birth_date_numbers(date));
        }
        for phone in &self.phone_numbers {
            related.extend(phone_numbers(phone));
        }
        for favorite in &self.favorite_numbers {
            related.extend(windows4(&only_digits(favorite)));
        }
        related
    }

    /// Every raw string, for pattern and birthday detection.
    pub fn sources(&self) -> Vec<String> {
        self.birth_dates
            .iter()
            .chain(&self.phone_numbers)
            .chain(&self.addresses)
            .chain(&self.favorite_numbers)
            .cloned()
            .collect()
    }
}

fn birth_date_numbers(date: &str) -> Vec<Candidate> {
    let parts: Vec<String> = date
        .split(|c: char| c == '-' || c == '/')
        .map(only_digits)
        .collect();
    let [day, month, year] = parts.as_slice() else {
        return Vec::new();
    };
    if year.len() < 2 {
        return Vec::new();
    }
    let day = format!("{:0>2}", day);
    let month = format!("{:0>2}", month);
    let yy = &year[year.len() - 2..];

    [
        format!("{day}{month}"),
        format!("{month}{day}"),
        format!("{day}{yy}"),
        format!("{yy}{day}"),
    ]
    .iter()
    .filter_map(|s| Candidate::parse(s).ok())
    .collect()
}

fn phone_numbers(phone: &str) -> Vec<Candidate> {
    let digits = only_digits(phone);
    if digits.len() < 8 {
        return Vec::new();
    }
    [&digits[..4], &digits[digits.len() - 4..]]
        .iter()
        .filter_map(|s| Candidate::parse(s).ok())
        .collect()
}
