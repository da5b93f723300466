use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::seeder::reference_date;

/// Additive bonuses applied on top of the base probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub related: f64,
    pub birthday_link: f64,
    pub group_hit: f64,
    pub address: f64,
    pub seeded: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            related: 0.08,
            birthday_link: 0.20,
            group_hit: 0.15,
            address: 0.12,
            seeded: 0.04,
        }
    }
}

impl ScoringWeights {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("related", self.related),
            ("birthday_link", self.birthday_link),
            ("group_hit", self.group_hit),
            ("address", self.address),
            ("seeded", self.seeded),
        ]
    }
}

/// Maps a historical count onto `floor + span * count / max_count`.
/// `fallback` is used when the history has no counts at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseProbability {
    pub floor: f64,
    pub span: f64,
    pub fallback: f64,
}

impl Default for BaseProbability {
    fn default() -> Self {
        Self {
            floor: 0.3,
            span: 0.5,
            fallback: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolLimits {
    /// Related numbers copied into the pool before anything else.
    pub max_related: usize,
    /// Hash seeding stops once the pool holds this many candidates.
    pub target_size: usize,
    /// Upper bound on hash indices tried while seeding.
    pub max_seed_rounds: u32,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_related: 8,
            target_size: 16,
            max_seed_rounds: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub base: BaseProbability,
    pub pool: PoolLimits,
    pub output_size: usize,
    /// Offset of the reference timezone the seeding date is taken in.
    pub utc_offset_hours: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            base: BaseProbability::default(),
            pool: PoolLimits::default(),
            output_size: 12,
            utc_offset_hours: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("weight `{name}` must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("base probability range [{floor}, {ceiling}] must lie within [0, 1]")]
    BaseRange { floor: f64, ceiling: f64 },
    #[error("fallback probability {0} must lie within [0, 1]")]
    Fallback(f64),
    #[error("output size must be at least 1")]
    EmptyOutput,
    #[error("UTC offset {0}h is outside -14h..=14h")]
    Offset(i32),
}

fn unit_interval(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.weights.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }

        let BaseProbability { floor, span, fallback } = self.base;
        let ceiling = floor + span;
        if !unit_interval(floor) || !unit_interval(ceiling) || span < 0.0 {
            return Err(ConfigError::BaseRange { floor, ceiling });
        }
        if !unit_interval(fallback) {
            return Err(ConfigError::Fallback(fallback));
        }

        if self.output_size == 0 {
            return Err(ConfigError::EmptyOutput);
        }
        if !(-14..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::Offset(self.utc_offset_hours));
        }
        Ok(())
    }

    /// Today's date in the reference timezone.
    pub fn reference_date(&self, now: DateTime<Utc>) -> NaiveDate {
        reference_date(now, self.utc_offset_hours)
    }
}
