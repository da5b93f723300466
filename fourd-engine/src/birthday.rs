use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use fourd_db::models::Candidate;
use tracing::debug;

use crate::digits::only_digits;

/// An 8-digit date source (DDMMYYYY) cut into its two 4D halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayPair {
    pub front: Candidate,
    pub back: Candidate,
}

/// Which half of a birthday was drawn, and so which half gets linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthdayLink {
    /// The DDMM half was drawn; the year half is linked.
    DayMonthDrawn,
    /// The year half was drawn; the DDMM half is linked.
    YearDrawn,
}

impl fmt::Display for BirthdayLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BirthdayLink::DayMonthDrawn => write!(f, "birthday day/month (from YYYY)"),
            BirthdayLink::YearDrawn => write!(f, "birthday year (from DDMM)"),
        }
    }
}

pub fn split_birthday(source: &str) -> Option<BirthdayPair> {
    let digits = only_digits(source);
    if digits.len() != 8 {
        return None;
    }
    Some(BirthdayPair {
        front: Candidate::parse(&digits[..4]).ok()?,
        back: Candidate::parse(&digits[4..]).ok()?,
    })
}

/// Candidates linked to a drawn birthday half. When several sources link
/// the same number, the first one wins.
pub fn link_birthdays<S: AsRef<str>>(
    sources: &[S],
    drawn: &BTreeSet<Candidate>,
) -> BTreeMap<Candidate, BirthdayLink> {
    let mut links = BTreeMap::new();
    for pair in sources.iter().filter_map(|s| split_birthday(s.as_ref())) {
        if drawn.contains(&pair.front) {
            links.entry(pair.back).or_insert(BirthdayLink::DayMonthDrawn);
        }
        if drawn.contains(&pair.back) {
            links.entry(pair.front).or_insert(BirthdayLink::YearDrawn);
        }
    }
    if !links.is_empty() {
        debug!(linked = links.len(), "birthday halves linked to latest draw");
    }
    links
}
