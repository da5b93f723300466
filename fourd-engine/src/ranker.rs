use std::cmp::Ordering;
use std::collections::BTreeSet;

use fourd_db::models::Candidate;
use serde::{Deserialize, Serialize};

use crate::scoring::CandidateScore;

/// One line of the final pick list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub number: Candidate,
    pub probability: f64,
    pub score: f64,
    pub reason: String,
    /// `round(probability * 100)`
    pub confidence: u8,
}

pub fn confidence_percent(probability: f64) -> u8 {
    if !probability.is_finite() {
        return 0;
    }
    (probability * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Drops numbers that were just drawn.
pub fn exclude_drawn(
    pool: &BTreeSet<Candidate>,
    avoid: &BTreeSet<Candidate>,
) -> Vec<Candidate> {
    pool.difference(avoid).copied().collect()
}

/// Highest score first, ties by ascending number.
fn by_score_desc(a: &CandidateScore, b: &CandidateScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.number.cmp(&b.number))
}

pub fn rank(mut scores: Vec<CandidateScore>, output_size: usize) -> Vec<ScoredCandidate> {
    scores.sort_by(by_score_desc);
    let mut seen = BTreeSet::new();
    scores.retain(|s| seen.insert(s.number));
    scores
        .into_iter()
        .take(output_size)
        .map(|s| ScoredCandidate {
            number: s.number,
            probability: s.probability,
            score: s.score,
            confidence: confidence_percent(s.probability),
            reason: s.reason,
        })
        .collect()
}
