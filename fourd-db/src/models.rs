use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STARTER_COUNT: usize = 10;
pub const CONSOLATION_COUNT: usize = 10;
/// first + second + third + starters + consolations
pub const PRIZE_COUNT: usize = 3 + STARTER_COUNT + CONSOLATION_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("expected exactly 4 digits, got {0:?}")]
    Length(String),
    #[error("non-digit character in {0:?}")]
    NotNumeric(String),
}

/// A 4D number, "0000" to "9999".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Candidate(u16);

impl Candidate {
    pub fn parse(text: &str) -> Result<Self, CandidateError> {
        if !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CandidateError::NotNumeric(text.to_string()));
        }
        if text.len() != 4 {
            return Err(CandidateError::Length(text.to_string()));
        }
        let value = text
            .bytes()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
        Ok(Candidate(value))
    }

    /// Builds a candidate from 0..=9999, `None` above that.
    pub fn from_value(value: u16) -> Option<Self> {
        (value <= 9999).then_some(Candidate(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for Candidate {
    type Err = CandidateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Candidate::parse(s)
    }
}

impl TryFrom<String> for Candidate {
    type Error = CandidateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Candidate::parse(&value)
    }
}

impl From<Candidate> for String {
    fn from(c: Candidate) -> Self {
        c.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrizeTier {
    First,
    Second,
    Third,
    Starter,
    Consolation,
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrizeTier::First => write!(f, "First Prize"),
            PrizeTier::Second => write!(f, "Second Prize"),
            PrizeTier::Third => write!(f, "Third Prize"),
            PrizeTier::Starter => write!(f, "Starter"),
            PrizeTier::Consolation => write!(f, "Consolation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    pub draw_id: String,
    pub date: NaiveDate,
    pub first: Candidate,
    pub second: Candidate,
    pub third: Candidate,
    pub starters: [Candidate; STARTER_COUNT],
    pub consolations: [Candidate; CONSOLATION_COUNT],
}

impl DrawResult {
    /// Builds a draw from its 23 prize numbers in first, second, third,
    /// starters, consolations order.
    pub fn from_numbers(
        draw_id: impl Into<String>,
        date: NaiveDate,
        numbers: &[Candidate],
    ) -> anyhow::Result<Self> {
        if numbers.len() != PRIZE_COUNT {
            bail!("a draw has {} prize numbers, got {}", PRIZE_COUNT, numbers.len());
        }
        let starters: [Candidate; STARTER_COUNT] = numbers[3..3 + STARTER_COUNT].try_into()?;
        let consolations: [Candidate; CONSOLATION_COUNT] =
            numbers[3 + STARTER_COUNT..].try_into()?;
        Ok(DrawResult {
            draw_id: draw_id.into(),
            date,
            first: numbers[0],
            second: numbers[1],
            third: numbers[2],
            starters,
            consolations,
        })
    }

    pub fn numbers(&self) -> impl Iterator<Item = Candidate> + '_ {
        [self.first, self.second, self.third]
            .into_iter()
            .chain(self.starters.iter().copied())
            .chain(self.consolations.iter().copied())
    }

    pub fn drawn_set(&self) -> BTreeSet<Candidate> {
        self.numbers().collect()
    }

    pub fn tier_of(&self, number: Candidate) -> Option<PrizeTier> {
        if self.first == number {
            Some(PrizeTier::First)
        } else if self.second == number {
            Some(PrizeTier::Second)
        } else if self.third == number {
            Some(PrizeTier::Third)
        } else if self.starters.contains(&number) {
            Some(PrizeTier::Starter)
        } else if self.consolations.contains(&number) {
            Some(PrizeTier::Consolation)
        } else {
            None
        }
    }
}

pub fn validate_draw(draw: &DrawResult) -> anyhow::Result<()> {
    let mut seen = BTreeSet::new();
    for n in draw.numbers() {
        if !seen.insert(n) {
            bail!("Draw {}: number {} appears twice", draw.draw_id, n);
        }
    }
    Ok(())
}

/// `history` is ordered newest first.
pub fn last_appearance(history: &[DrawResult], number: Candidate) -> Option<(&DrawResult, PrizeTier)> {
    history
        .iter()
        .find_map(|draw| draw.tier_of(number).map(|tier| (draw, tier)))
}

/// Deterministic fixture: `n` valid draws, newest first, one day apart.
/// Draw `i` holds the numbers `i*23 .. i*23+22`.
pub fn make_test_draws(n: usize) -> Vec<DrawResult> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    (0..n)
        .rev()
        .map(|i| {
            let numbers: Vec<Candidate> = (0..PRIZE_COUNT)
                .map(|k| Candidate(((i * PRIZE_COUNT + k) % 10_000) as u16))
                .collect();
            let date = base + chrono::Days::new(i as u64);
            DrawResult {
                draw_id: format!("{:04}", i),
                date,
                first: numbers[0],
                second: numbers[1],
                third: numbers[2],
                starters: std::array::from_fn(|k| numbers[3 + k]),
                consolations: std::array::from_fn(|k| numbers[3 + STARTER_COUNT + k]),
            }
        })
        .collect()
}
