//! Combo and score policy

use serde::{Deserialize, Serialize};

/// Points for one event hit given the combo *before* this hit
///
/// The multiplier never drops below 1, so the first hit of a life still
/// earns the full base score.
pub fn score_for_hit(base_score: u64, combo_before: u32, combo_multiplier: f32) -> u64 {
    let multiplier = (combo_before as f32 * combo_multiplier).max(1.0);
    (base_score as f32 * multiplier).floor() as u64
}

/// Score and combo bookkeeping for a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub base_score: u64,
    pub combo_multiplier: f32,
}

impl ScoringPolicy {
    pub fn new(base_score: u64, combo_multiplier: f32) -> Self {
        Self {
            base_score,
            combo_multiplier,
        }
    }

    /// Award a successful hit: adds points, then bumps the combo
    ///
    /// Returns the points awarded.
    pub fn register_hit(&self, score: &mut u64, combo: &mut u32) -> u64 {
        let points = score_for_hit(self.base_score, *combo, self.combo_multiplier);
        *score = score.saturating_add(points);
        *combo += 1;
        points
    }

    /// The ball was lost: the streak is over
    pub fn register_miss(&self, combo: &mut u32) {
        *combo = 0;
    }
}
