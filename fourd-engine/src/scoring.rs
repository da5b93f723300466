use std::collections::{BTreeMap, BTreeSet};

use fourd_db::models::Candidate;
use tracing::debug;

use crate::birthday::{link_birthdays, BirthdayLink};
use crate::config::{EngineConfig, ScoringWeights};
use crate::digits::{only_digits, windows4};
use crate::frequency::FrequencyTable;
use crate::patterns::CandidateGroup;

const SEPARATOR: &str = " • ";

/// Which bonuses apply to one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub related: bool,
    pub birthday: Option<BirthdayLink>,
    pub group_hit: bool,
    pub address: bool,
    pub seeded: bool,
}

impl Flags {
    pub fn bonus(&self, weights: &ScoringWeights) -> f64 {
        let mut bonus = 0.0;
        if self.related {
            bonus += weights.related;
        }
        if self.birthday.is_some() {
            bonus += weights.birthday_link;
        }
        if self.group_hit {
            bonus += weights.group_hit;
        }
        if self.address {
            bonus += weights.address;
        }
        if self.seeded {
            bonus += weights.seeded;
        }
        bonus
    }

    /// Phrases in fixed order, joined by " • "; "balanced mix" when no flag
    /// applies. No phrase names a phone number: an 8-digit source may just as
    /// well be a DDMMYYYY birth date, so its candidates are reported through
    /// the address and group-hit phrases only.
    pub fn reason(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.related {
            parts.push("related to you".to_string());
        }
        if let Some(link) = self.birthday {
            parts.push(link.to_string());
        }
        if self.address {
            parts.push("from your address".to_string());
        }
        if self.group_hit {
            parts.push("same source group as a hit".to_string());
        }
        if self.seeded {
            parts.push("seeded mix".to_string());
        }
        if parts.is_empty() {
            return "balanced mix".to_string();
        }
        parts.join(SEPARATOR)
    }
}

/// Everything the flags of a single candidate are read from, computed once
/// per invocation.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    related: BTreeSet<Candidate>,
    grouped: BTreeSet<Candidate>,
    hit_grouped: BTreeSet<Candidate>,
    birthday_links: BTreeMap<Candidate, BirthdayLink>,
    address: BTreeSet<Candidate>,
}

impl Signals {
    pub fn collect<S: AsRef<str>>(
        related: &BTreeSet<Candidate>,
        sources: &[S],
        groups: &[CandidateGroup],
        drawn: &BTreeSet<Candidate>,
    ) -> Self {
        let mut grouped = BTreeSet::new();
        let mut hit_grouped = BTreeSet::new();
        let mut address: BTreeSet<Candidate> = sources
            .iter()
            .flat_map(|s| windows4(&only_digits(s.as_ref())))
            .collect();

        let mut hits = 0usize;
        for group in groups {
            grouped.extend(group.members.iter().copied());
            if group.origin.is_address_pattern() {
                address.extend(group.members.iter().copied());
            }
            if group.hits(drawn) {
                hits += 1;
                hit_grouped.extend(group.members.iter().copied());
            }
        }
        debug!(groups = groups.len(), hit_groups = hits, "source groups checked against latest draw");

        Self {
            related: related.clone(),
            grouped,
            hit_grouped,
            birthday_links: link_birthdays(sources, drawn),
            address,
        }
    }

    pub fn flags(&self, number: Candidate) -> Flags {
        let related = self.related.contains(&number);
        Flags {
            related,
            birthday: self.birthday_links.get(&number).copied(),
            group_hit: self.hit_grouped.contains(&number),
            address: self.address.contains(&number),
            seeded: !related && !self.grouped.contains(&number),
        }
    }
}

/// Score of one candidate before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub number: Candidate,
    pub probability: f64,
    pub score: f64,
    pub reason: String,
}

pub fn score_candidate(
    number: Candidate,
    table: &FrequencyTable,
    signals: &Signals,
    config: &EngineConfig,
) -> CandidateScore {
    let probability = table.base_probability(number, &config.base);
    let flags = signals.flags(number);
    CandidateScore {
        number,
        probability,
        score: probability + flags.bonus(&config.weights),
        reason: flags.reason(),
    }
}
