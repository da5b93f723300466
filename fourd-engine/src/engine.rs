use std::collections::BTreeSet;

use chrono::NaiveDate;
use fourd_db::models::{Candidate, DrawResult};
use tracing::debug;

use crate::config::EngineConfig;
use crate::frequency::FrequencyTable;
use crate::patterns::{extract_groups, Extractor, DEFAULT_EXTRACTORS};
use crate::ranker::{exclude_drawn, rank, ScoredCandidate};
use crate::scoring::{score_candidate, Signals};
use crate::seeder::build_pool;

/// Everything one prediction run looks at. Nothing else is read: the date in
/// particular is supplied by the caller, already in the reference timezone.
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    /// 4D numbers the caller derived from the profile.
    pub related: &'a BTreeSet<Candidate>,
    pub latest: Option<&'a DrawResult>,
    /// Every known draw, in any order.
    pub history: &'a [DrawResult],
    /// Raw profile strings: birth dates, phone numbers, addresses, favorites.
    pub sources: &'a [String],
    pub date: NaiveDate,
}

pub fn daily_picks(input: &PredictionInput<'_>, config: &EngineConfig) -> Vec<ScoredCandidate> {
    daily_picks_with(input, config, DEFAULT_EXTRACTORS)
}

/// [`daily_picks`] with a custom set of source extractors.
pub fn daily_picks_with(
    input: &PredictionInput<'_>,
    config: &EngineConfig,
    extractors: &[Extractor],
) -> Vec<ScoredCandidate> {
    let avoid = input.latest.map(DrawResult::drawn_set).unwrap_or_default();
    let groups = extract_groups(input.sources, extractors);
    let pool = build_pool(input.related, &groups, input.date, &config.pool);

    let table = FrequencyTable::build(input.history);
    let signals = Signals::collect(input.related, input.sources, &groups, &avoid);

    let scores = exclude_drawn(&pool, &avoid)
        .into_iter()
        .map(|n| score_candidate(n, &table, &signals, config))
        .collect();
    let picks = rank(scores, config.output_size);

    debug!(
        date = %input.date,
        pool = pool.len(),
        avoided = avoid.len(),
        history = input.history.len(),
        picks = picks.len(),
        "daily picks ranked"
    );
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use fourd_db::models::make_test_draws;
    use proptest::prelude::*;

    fn c(s: &str) -> Candidate {
        Candidate::parse(s).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 28).unwrap()
    }

    fn latest_with_first(first: &str) -> DrawResult {
        let mut draw = make_test_draws(1).remove(0);
        draw.first = c(first);
        draw
    }

    fn run(
        related: &BTreeSet<Candidate>,
        latest: Option<&DrawResult>,
        history: &[DrawResult],
        sources: &[String],
    ) -> Vec<ScoredCandidate> {
        let input = PredictionInput {
            related,
            latest,
            history,
            sources,
            date: day(),
        };
        daily_picks(&input, &EngineConfig::default())
    }

    fn find<'a>(picks: &'a [ScoredCandidate], n: &str) -> Option<&'a ScoredCandidate> {
        picks.iter().find(|p| p.number == c(n))
    }

    #[test]
    fn test_related_only_no_history() {
        let related = BTreeSet::from([c("0728")]);
        let picks = run(&related, None, &[], &[]);

        assert_eq!(picks.len(), 12);
        let top = &picks[0];
        assert_eq!(top.number, c("0728"));
        assert_eq!(top.reason, "related to you");
        assert_eq!(top.confidence, 50);
        assert!((top.probability - 0.5).abs() < f64::EPSILON);
        assert!(picks[1..].iter().all(|p| p.reason == "seeded mix"));
    }

    #[test]
    fn test_pool_is_filled_to_sixteen_before_ranking() {
        let related = BTreeSet::from([c("0728")]);
        let mut config = EngineConfig::default();
        config.output_size = 100;
        let input = PredictionInput {
            related: &related,
            latest: None,
            history: &[],
            sources: &[],
            date: day(),
        };
        assert_eq!(daily_picks(&input, &config).len(), 16);
    }

    #[test]
    fn test_group_hit_spreads_and_hit_is_avoided() {
        let latest = latest_with_first("2807");
        let sources = vec!["S128070".to_string()];
        let picks = run(&BTreeSet::new(), Some(&latest), &[], &sources);

        assert!(find(&picks, "2807").is_none());
        for sibling in ["1280", "8070"] {
            let pick = find(&picks, sibling).unwrap();
            assert!(pick.reason.contains("same source group as a hit"), "{}", pick.reason);
            assert!((pick.score - (0.5 + 0.12 + 0.15)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_birthday_front_drawn_links_year() {
        let latest = latest_with_first("2807");
        let sources = vec!["28-07-1985".to_string()];
        let picks = run(&BTreeSet::new(), Some(&latest), &[], &sources);

        let year = find(&picks, "1985").unwrap();
        assert_eq!(
            year.reason,
            "birthday day/month (from YYYY) • from your address • same source group as a hit"
        );
        // base + birthday link + address + group hit
        assert!((year.score - (0.5 + 0.20 + 0.12 + 0.15)).abs() < 1e-12);
        assert_eq!(picks[0].number, c("1985"));
        assert!(find(&picks, "2807").is_none());
    }

    #[test]
    fn test_group_hit_spreads_along_plain_digit_run() {
        let latest = latest_with_first("2807");
        let sources = vec!["lucky 12807".to_string(), "28071985".to_string()];
        let picks = run(&BTreeSet::new(), Some(&latest), &[], &sources);

        assert!(find(&picks, "2807").is_none());
        for n in ["1280", "8071", "1985"] {
            let pick = find(&picks, n).unwrap_or_else(|| panic!("{n} missing"));
            assert!(pick.reason.contains("same source group as a hit"), "{n}: {}", pick.reason);
        }
        let sibling = find(&picks, "1280").unwrap();
        assert!((sibling.score - (0.5 + 0.12 + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn test_address_candidates_tagged() {
        let sources = vec!["Blk 123, #04-56, S123456".to_string()];
        let picks = run(&BTreeSet::new(), None, &[], &sources);

        for n in ["0123", "0456", "1234", "2345", "3456"] {
            let pick = find(&picks, n).unwrap_or_else(|| panic!("{n} missing"));
            assert!(pick.reason.contains("from your address"), "{n}: {}", pick.reason);
        }
    }

    #[test]
    fn test_history_drives_probability() {
        let history = make_test_draws(3);
        // 0000 is drawn in draw 0000 only; repeat it in the newest draw
        let mut history = history;
        history[0].first = c("0000");
        let related = BTreeSet::from([c("0000"), c("7777")]);
        let picks = run(&related, None, &history, &[]);

        let hot = find(&picks, "0000").unwrap();
        let cold = find(&picks, "7777").unwrap();
        assert_eq!(hot.confidence, 80);
        assert_eq!(cold.confidence, 30);
        assert!(hot.score > cold.score);
    }

    #[test]
    fn test_latest_draw_excluded() {
        let history = make_test_draws(4);
        let latest = &history[0];
        let related: BTreeSet<Candidate> = latest.numbers().take(5).collect();
        let picks = run(&related, Some(latest), &history, &[]);

        let drawn = latest.drawn_set();
        assert!(!picks.is_empty());
        assert!(picks.iter().all(|p| !drawn.contains(&p.number)));
    }

    #[test]
    fn test_custom_extractors() {
        let sources = vec!["Blk 123".to_string()];
        let input = PredictionInput {
            related: &BTreeSet::new(),
            latest: None,
            history: &[],
            sources: &sources,
            date: day(),
        };
        let picks = daily_picks_with(&input, &EngineConfig::default(), &[]);
        // without extractors nothing is grouped, so every pick is seeded
        assert_eq!(picks.len(), 12);
        assert!(picks.iter().all(|p| p.reason == "seeded mix"), "{picks:?}");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_output_bounded_and_deterministic(
            related in proptest::collection::btree_set(0u16..10_000, 0..12),
            sources in proptest::collection::vec("[0-9A-Za-z #,-]{0,24}", 0..4),
            draws in 0usize..6,
        ) {
            let related: BTreeSet<Candidate> = related.into_iter().filter_map(Candidate::from_value).collect();
            let history = make_test_draws(draws);
            let latest = history.first();
            let first = run(&related, latest, &history, &sources);
            let second = run(&related, latest, &history, &sources);

            prop_assert!(first.len() <= 12);
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            let drawn = latest.map(DrawResult::drawn_set).unwrap_or_default();
            for pick in &first {
                prop_assert!(!drawn.contains(&pick.number));
                prop_assert!(pick.confidence <= 100);
                prop_assert!(pick.score.is_finite());
                prop_assert!(pick.probability >= 0.0 && pick.probability <= 1.0);
            }
            for pair in first.windows(2) {
                prop_assert!(
                    pair[0].score > pair[1].score
                        || (pair[0].score == pair[1].score && pair[0].number < pair[1].number)
                );
            }
        }
    }
}
