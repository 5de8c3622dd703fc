use serde::{Deserialize, Serialize};

use super::classify::{classify, effective, level_key, ScoreResult};
use super::levels::ScoreLevelSet;

/// Presence-aware score so "not yet scored" is a checked case rather than a
/// sentinel value. Serializes as the optional `score` field the wire uses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<ScoreResult>", into = "Option<ScoreResult>")]
pub enum ScoreStatus {
    Scored(ScoreResult),
    #[default]
    Unscored,
}

impl ScoreStatus {
    pub fn scored(&self) -> Option<&ScoreResult> {
        match self {
            ScoreStatus::Scored(result) => Some(result),
            ScoreStatus::Unscored => None,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, ScoreStatus::Scored(_))
    }

    pub fn is_unscored(&self) -> bool {
        !self.is_scored()
    }
}

impl From<Option<ScoreResult>> for ScoreStatus {
    fn from(value: Option<ScoreResult>) -> Self {
        match value {
            Some(result) => ScoreStatus::Scored(result),
            None => ScoreStatus::Unscored,
        }
    }
}

impl From<ScoreStatus> for Option<ScoreResult> {
    fn from(value: ScoreStatus) -> Self {
        match value {
            ScoreStatus::Scored(result) => Some(result),
            ScoreStatus::Unscored => None,
        }
    }
}

impl From<ScoreResult> for ScoreStatus {
    fn from(value: ScoreResult) -> Self {
        ScoreStatus::Scored(value)
    }
}

/// The neutral placeholder shown before any child has a usable score: the
/// scale's nominal floor at zero percent.
pub fn neutral_score(levels: &ScoreLevelSet) -> ScoreResult {
    let levels = effective(levels);
    let lowest = levels.first().expect("effective level set is never empty");
    ScoreResult {
        score: 3.0,
        level: level_key(&lowest.name),
        color: lowest.color.clone(),
        percentage: 0.0,
    }
}

/// Roll child scores up into a parent summary.
///
/// Children without a score, and children scored at zero, are excluded. The
/// summary is the plain arithmetic mean of the remaining scores; sibling
/// weights are deliberately not consulted here (the weighted math belongs to
/// the per-department scoring path).
pub fn roll_up<'a, I>(children: I, levels: &ScoreLevelSet) -> ScoreResult
where
    I: IntoIterator<Item = &'a ScoreStatus>,
{
    let scores: Vec<f64> = children
        .into_iter()
        .filter_map(ScoreStatus::scored)
        .map(|result| result.score)
        .filter(|score| *score > 0.0)
        .collect();

    if scores.is_empty() {
        return neutral_score(levels);
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    classify(mean, levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: f64) -> ScoreStatus {
        ScoreStatus::Scored(classify(score, &ScoreLevelSet::canonical()))
    }

    #[test]
    fn empty_input_yields_the_neutral_floor() {
        let levels = ScoreLevelSet::canonical();
        let result = roll_up([], &levels);
        assert_eq!(result.score, 3.0);
        assert_eq!(result.level, "below");
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn unscored_children_are_ignored() {
        let levels = ScoreLevelSet::canonical();
        let children = [ScoreStatus::Unscored, ScoreStatus::Unscored];
        let result = roll_up(&children, &levels);
        assert_eq!(result.score, 3.0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn zero_scores_do_not_drag_the_mean() {
        let levels = ScoreLevelSet::canonical();
        let children = [scored(0.0), scored(4.5)];
        let result = roll_up(&children, &levels);
        assert_eq!(result.score, 4.5);
    }

    #[test]
    fn summary_is_the_unweighted_mean() {
        let levels = ScoreLevelSet::canonical();
        let children = [scored(4.5), scored(5.0)];
        let result = roll_up(&children, &levels);
        assert_eq!(result.score, 4.75);
        assert_eq!(result.level, "very_good");
    }

    #[test]
    fn score_status_serializes_as_optional_result() {
        let absent: Option<ScoreResult> = ScoreStatus::Unscored.into();
        assert!(absent.is_none());
        let json = serde_json::to_value(scored(4.5)).expect("serializes");
        assert_eq!(json["score"], 4.5);
    }
}
