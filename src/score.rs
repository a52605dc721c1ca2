//! Score, level and fall speed

use crate::settings::TimingSettings;
use serde::Serialize;

/// Scoring state: one point per cleared row, a level every
/// `lines_per_level` points, and a fall modulus that shrinks with the level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub score: u64,
    pub high_score: u64,
    pub level: u64,
    /// Tick modulus between two fall steps
    pub speed: u64,
}

impl Score {
    pub fn new(timing: &TimingSettings) -> Self {
        Self {
            score: 0,
            high_score: 0,
            level: 0,
            speed: timing.initial_speed,
        }
    }

    /// Credit cleared rows and recompute level and speed
    pub fn add_clear(&mut self, rows: u64, timing: &TimingSettings) {
        self.score += rows;
        self.high_score = self.high_score.max(self.score);
        self.level = self.score / u64::from(timing.lines_per_level.max(1));
        self.speed = speed_for_level(self.level, timing);
    }

    /// Fresh scoring for a new game, keeping the high score
    pub fn restart(&mut self, timing: &TimingSettings) {
        *self = Self {
            high_score: self.high_score,
            ..Self::new(timing)
        };
    }
}

/// Fall modulus for a level, never below the configured floor
pub fn speed_for_level(level: u64, timing: &TimingSettings) -> u64 {
    timing
        .initial_speed
        .saturating_sub(timing.speed_step.saturating_mul(level))
        .max(timing.min_speed)
}
