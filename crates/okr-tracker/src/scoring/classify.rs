use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::levels::ScoreLevelSet;

/// A classified score ready for display: the matched band, its color, and the
/// position of the score inside the configured range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: f64,
    pub level: String,
    pub color: String,
    pub percentage: f64,
}

/// Normalize a display name into the stable `lower_snake_case` level key the
/// wire format uses ("Very Good" becomes "very_good").
pub fn level_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Substitute the canonical defaults when no configuration has loaded yet.
pub(crate) fn effective(levels: &ScoreLevelSet) -> Cow<'_, ScoreLevelSet> {
    if levels.is_empty() {
        Cow::Owned(ScoreLevelSet::canonical())
    } else {
        Cow::Borrowed(levels)
    }
}

/// Classify a raw score against the level set.
///
/// Total by construction: an empty set falls back to the canonical defaults,
/// a score below every cutoff floors at the lowest level, and the percentage
/// is clamped into [0, 100]. Ties at a cutoff resolve to the higher band.
pub fn classify(score: f64, levels: &ScoreLevelSet) -> ScoreResult {
    let levels = effective(levels);

    let min = levels.min_score();
    let max = levels.max_score();

    let matched = levels
        .iter()
        .rev()
        .find(|level| score >= level.score_value)
        .or_else(|| levels.first())
        .expect("effective level set is never empty");

    let range = max - min;
    let percentage = if range == 0.0 {
        0.0
    } else {
        (((score - min) / range) * 100.0).clamp(0.0, 100.0)
    };

    ScoreResult {
        score,
        level: level_key(&matched.name),
        color: matched.color.clone(),
        percentage,
    }
}
