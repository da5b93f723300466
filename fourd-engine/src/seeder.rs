use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use fourd_db::models::Candidate;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::config::PoolLimits;
use crate::patterns::CandidateGroup;

/// Calendar date of `now` in the timezone `utc_offset_hours` east of UTC.
pub fn reference_date(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
    now.with_timezone(&offset).date_naive()
}

/// ISO date followed by the related numbers, ascending, joined by `|`.
pub fn seed_string(related: &BTreeSet<Candidate>, date: NaiveDate) -> String {
    let joined = related
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("|");
    format!("{}{}", date.format("%Y-%m-%d"), joined)
}

/// First four decimal digits of the hex SHA-256 of `seed#index`, if the
/// digest has that many.
pub fn hash_candidate(seed: &str, index: u32) -> Option<Candidate> {
    let digest = Sha256::digest(format!("{seed}#{index}").as_bytes());
    let hex = format!("{:x}", digest);
    let digits: String = hex.chars().filter(|c| c.is_ascii_digit()).take(4).collect();
    Candidate::parse(&digits).ok()
}

/// Deterministic stream of hash-derived candidates for one
/// (related set, day) pair. Ends after `max_rounds` hash indices.
#[derive(Debug, Clone)]
pub struct Seeder {
    seed: String,
    index: u32,
    max_rounds: u32,
}

impl Seeder {
    pub fn new(related: &BTreeSet<Candidate>, date: NaiveDate, max_rounds: u32) -> Self {
        Self {
            seed: seed_string(related, date),
            index: 0,
            max_rounds,
        }
    }
}

impl Iterator for Seeder {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        while self.index < self.max_rounds {
            let index = self.index;
            self.index += 1;
            match hash_candidate(&self.seed, index) {
                Some(c) => return Some(c),
                None => trace!(index, "digest too short on digits, skipping"),
            }
        }
        None
    }
}

/// Related numbers first (up to `max_related`, ascending), then every
/// pattern-group member, then seeded candidates until `target_size`.
pub fn build_pool(
    related: &BTreeSet<Candidate>,
    groups: &[CandidateGroup],
    date: NaiveDate,
    limits: &PoolLimits,
) -> BTreeSet<Candidate> {
    let mut pool: BTreeSet<Candidate> = related.iter().copied().take(limits.max_related).collect();
    pool.extend(groups.iter().flat_map(|g| g.members.iter().copied()));

    let from_user = pool.len();
    let mut seeder = Seeder::new(related, date, limits.max_seed_rounds);
    while pool.len() < limits.target_size {
        match seeder.next() {
            Some(c) => {
                pool.insert(c);
            }
            None => break,
        }
    }
    debug!(
        from_user,
        seeded = pool.len() - from_user,
        hash_rounds = seeder.index,
        "candidate pool built"
    );
    pool
}
