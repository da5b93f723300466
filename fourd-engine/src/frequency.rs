use std::collections::BTreeMap;

use fourd_db::models::{Candidate, DrawResult};

use crate::config::BaseProbability;

/// How often each number was drawn, over every prize slot of every draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<Candidate, u32>,
    max_count: u32,
}

impl FrequencyTable {
    pub fn build(history: &[DrawResult]) -> Self {
        let mut counts: BTreeMap<Candidate, u32> = BTreeMap::new();
        for n in history.iter().flat_map(DrawResult::numbers) {
            *counts.entry(n).or_insert(0) += 1;
        }
        let max_count = counts.values().copied().max().unwrap_or(0);
        Self { counts, max_count }
    }

    pub fn count(&self, number: Candidate) -> u32 {
        self.counts.get(&number).copied().unwrap_or(0)
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `floor + span * count / max_count`, or the fallback when nothing has
    /// been counted yet.
    pub fn base_probability(&self, number: Candidate, base: &BaseProbability) -> f64 {
        if self.max_count == 0 {
            return base.fallback;
        }
        base.floor + base.span * f64::from(self.count(number)) / f64::from(self.max_count)
    }

    /// The `n` most drawn numbers, ties broken by ascending number.
    pub fn most_frequent(&self, n: usize) -> Vec<(Candidate, u32)> {
        let mut sorted: Vec<(Candidate, u32)> = self.counts.iter().map(|(c, n)| (*c, *n)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        sorted.truncate(n);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fourd_db::models::make_test_draws;

    fn c(s: &str) -> Candidate {
        Candidate::parse(s).unwrap()
    }

    #[test]
    fn test_empty_history_falls_back() {
        let table = FrequencyTable::build(&[]);
        assert!(table.is_empty());
        assert_eq!(table.max_count(), 0);
        let p = table.base_probability(c("0728"), &BaseProbability::default());
        assert!((p - 0.5).abs() < f64::EPSILON);
        assert!(p.is_finite());
    }

    #[test]
    fn test_counts_every_prize_slot() {
        let history = make_test_draws(2);
        let table = FrequencyTable::build(&history);
        assert_eq!(table.len(), 46);
        assert_eq!(table.count(c("0000")), 1);
        assert_eq!(table.count(c("0045")), 1);
        assert_eq!(table.count(c("0046")), 0);
        assert_eq!(table.max_count(), 1);
    }

    #[test]
    fn test_base_probability_range() {
        let mut history = make_test_draws(2);
        // draw 0001 repeats draw 0000's first prize as its first prize
        history[0].first = c("0000");
        let table = FrequencyTable::build(&history);
        let base = BaseProbability::default();
        assert_eq!(table.max_count(), 2);
        assert!((table.base_probability(c("0000"), &base) - 0.8).abs() < 1e-12);
        assert!((table.base_probability(c("0001"), &base) - 0.55).abs() < 1e-12);
        assert!((table.base_probability(c("9999"), &base) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_most_frequent_order() {
        let mut history = make_test_draws(2);
        history[0].first = c("0005");
        let table = FrequencyTable::build(&history);
        let top = table.most_frequent(3);
        assert_eq!(top[0], (c("0005"), 2));
        assert_eq!(top[1], (c("0000"), 1));
        assert_eq!(top[2], (c("0001"), 1));
    }
}
