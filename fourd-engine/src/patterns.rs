//! Extractors that turn free-text sources (mostly addresses) into groups of
//! related candidates. Each extractor is independent; new address
//! conventions are added by appending another [`Extractor`] to the list
//! passed to [`extract_groups`].

use std::collections::BTreeSet;

use fourd_db::models::Candidate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::digits::{only_digits, pad4, windows4};

static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{6})(?:[^0-9]|$)").expect("postal code regex")
});
static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:blk|block)\.?\s*([0-9]+)").expect("block regex")
});
static UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#([0-9]+)-([0-9]+)").expect("unit regex")
});
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrigin {
    /// All windows of a source's digits, read as one string.
    SourceDigits,
    PostalCode,
    Block,
    Unit,
    NumericRun,
}

impl GroupOrigin {
    /// True for groups produced by an address convention rather than a bare
    /// digit run.
    pub fn is_address_pattern(self) -> bool {
        matches!(
            self,
            GroupOrigin::PostalCode | GroupOrigin::Block | GroupOrigin::Unit
        )
    }
}

/// Candidates that come from the same piece of a source and share its fate:
/// if one of them is drawn, the others get the group-hit bonus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateGroup {
    pub origin: GroupOrigin,
    pub members: BTreeSet<Candidate>,
}

impl CandidateGroup {
    fn single(origin: GroupOrigin, member: Candidate) -> Self {
        Self {
            origin,
            members: BTreeSet::from([member]),
        }
    }

    pub fn contains(&self, number: Candidate) -> bool {
        self.members.contains(&number)
    }

    pub fn hits(&self, drawn: &BTreeSet<Candidate>) -> bool {
        self.members.iter().any(|m| drawn.contains(m))
    }
}

pub type Extractor = fn(&str) -> Vec<CandidateGroup>;

pub const DEFAULT_EXTRACTORS: &[Extractor] =
    &[source_windows, postal_code, block_number, unit_code, numeric_runs];

/// The whole source as one group: every 4-digit window of its digits, with
/// separators dropped. "28-07-1985" groups 2807, 8071, 0719, 7198 and 1985.
pub fn source_windows(source: &str) -> Vec<CandidateGroup> {
    let members = windows4(&only_digits(source));
    if members.is_empty() {
        return Vec::new();
    }
    vec![CandidateGroup {
        origin: GroupOrigin::SourceDigits,
        members,
    }]
}

/// First standalone run of exactly six digits, as its 4-digit windows.
pub fn postal_code(source: &str) -> Vec<CandidateGroup> {
    POSTAL_CODE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| windows4(m.as_str()))
        .filter(|members| !members.is_empty())
        .map(|members| {
            vec![CandidateGroup {
                origin: GroupOrigin::PostalCode,
                members,
            }]
        })
        .unwrap_or_default()
}

/// "Blk 123" becomes "0123"; longer block numbers keep their last 4 digits.
pub fn block_number(source: &str) -> Vec<CandidateGroup> {
    BLOCK
        .captures(source)
        .and_then(|caps| caps.get(1))
        .and_then(|m| pad4(m.as_str()))
        .map(|c| vec![CandidateGroup::single(GroupOrigin::Block, c)])
        .unwrap_or_default()
}

/// "#04-56" becomes "0456". Floors or units wider than two digits do not
/// fit a 4D number and yield nothing.
pub fn unit_code(source: &str) -> Vec<CandidateGroup> {
    let Some(caps) = UNIT.captures(source) else {
        return Vec::new();
    };
    let joined = format!("{:0>2}{:0>2}", &caps[1], &caps[2]);
    Candidate::parse(&joined)
        .map(|c| vec![CandidateGroup::single(GroupOrigin::Unit, c)])
        .unwrap_or_default()
}

/// Every maximal digit run: long runs give one singleton group per window,
/// short runs are zero-padded to a single candidate.
pub fn numeric_runs(source: &str) -> Vec<CandidateGroup> {
    let mut groups = Vec::new();
    for run in DIGIT_RUN.find_iter(source).map(|m| m.as_str()) {
        if run.len() >= 4 {
            groups.extend(
                windows4(run)
                    .into_iter()
                    .map(|c| CandidateGroup::single(GroupOrigin::NumericRun, c)),
            );
        } else if let Some(c) = pad4(run) {
            groups.push(CandidateGroup::single(GroupOrigin::NumericRun, c));
        }
    }
    groups
}

pub fn extract_groups<S: AsRef<str>>(sources: &[S], extractors: &[Extractor]) -> Vec<CandidateGroup> {
    sources
        .iter()
        .flat_map(|source| extractors.iter().flat_map(move |extract| extract(source.as_ref())))
        .collect()
}
