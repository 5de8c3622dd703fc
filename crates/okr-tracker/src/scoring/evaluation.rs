use serde::{Deserialize, Serialize};

use super::classify::{classify, ScoreResult};
use super::levels::ScoreLevelSet;

/// Fixed blend weights for the final combined score. Business-block ratings
/// are shown alongside but never weighted in.
pub const AUTO_WEIGHT: f64 = 0.60;
pub const DIRECTOR_WEIGHT: f64 = 0.20;
pub const HR_WEIGHT: f64 = 0.20;

/// The score a one-star director rating maps to; five stars reach 5.0.
pub const DIRECTOR_FLOOR: f64 = 4.25;
pub const DIRECTOR_CEILING: f64 = 5.0;
const STAR_STEP: f64 = (DIRECTOR_CEILING - DIRECTOR_FLOOR) / 4.0;

/// Role supplying a subjective rating on top of the automatic OKR score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluatorType {
    Director,
    Hr,
    BusinessBlock,
}

impl EvaluatorType {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluatorType::Director => "Director",
            EvaluatorType::Hr => "HR",
            EvaluatorType::BusinessBlock => "Business Block",
        }
    }
}

/// HR letter grade. The ordering is reversed from school grades: D is the top
/// grade and A the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
}

impl LetterGrade {
    pub const fn score(self) -> f64 {
        match self {
            LetterGrade::D => 5.0,
            LetterGrade::C => 4.75,
            LetterGrade::B => 4.5,
            LetterGrade::A => 4.25,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "A" => Some(LetterGrade::A),
            "B" => Some(LetterGrade::B),
            "C" => Some(LetterGrade::C),
            "D" => Some(LetterGrade::D),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
        }
    }
}

/// Error raised when a rating falls outside its evaluator's valid range.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("star rating must be between 1 and 5, got {0}")]
    StarsOutOfRange(u8),
    #[error("director rating must be between {DIRECTOR_FLOOR} and {DIRECTOR_CEILING}, got {0}")]
    DirectorRatingOutOfRange(f64),
    #[error("HR rating must be one of A, B, C, D")]
    InvalidLetterGrade,
    #[error("business block rating must be between 1 and 5, got {0}")]
    BusinessBlockRatingOutOfRange(f64),
    #[error("{evaluator} evaluations require a {field}")]
    MissingRating {
        evaluator: &'static str,
        field: &'static str,
    },
}

/// Convert a 1-5 star director rating onto the score scale by linear
/// interpolation: one star is 4.25, each extra star adds 0.1875.
pub fn stars_to_score(stars: u8) -> Result<f64, EvaluationError> {
    if !(1..=5).contains(&stars) {
        return Err(EvaluationError::StarsOutOfRange(stars));
    }
    Ok(DIRECTOR_FLOOR + f64::from(stars - 1) * STAR_STEP)
}

/// Invert a director score back to stars. Only defined on the valid
/// 4.25..=5.0 band; rounds to the nearest whole star.
pub fn stars_from_score(score: f64) -> Option<u8> {
    if !(DIRECTOR_FLOOR..=DIRECTOR_CEILING).contains(&score) {
        return None;
    }
    let stars = ((score - DIRECTOR_FLOOR) / STAR_STEP).round() as u8 + 1;
    Some(stars.min(5))
}

/// Blend the three scored inputs into the final combined score. All three
/// must be present; any absence propagates as absence, never as a partial or
/// zero-defaulted blend.
pub fn combine(
    automatic: Option<f64>,
    director: Option<f64>,
    hr: Option<f64>,
) -> Option<f64> {
    match (automatic, director, hr) {
        (Some(auto), Some(director), Some(hr)) => {
            Some(auto * AUTO_WEIGHT + director * DIRECTOR_WEIGHT + hr * HR_WEIGHT)
        }
        _ => None,
    }
}

/// Ratings gathered for one department, already converted to scores where a
/// conversion exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationInputs {
    pub director_score: Option<f64>,
    pub director_comment: Option<String>,
    pub hr_letter: Option<LetterGrade>,
    pub hr_comment: Option<String>,
    pub business_block_score: Option<f64>,
    pub business_block_comment: Option<String>,
}

/// The combined department score the evaluation panel renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentScoreBreakdown {
    pub automatic_okr_score: f64,
    pub automatic_okr_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director_evaluation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director_stars: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_evaluation_letter: Option<LetterGrade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_evaluation_numeric: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_block_evaluation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_block_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_combined_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_percentage: Option<f64>,
    pub score_level: String,
    pub color: String,
    pub has_director_evaluation: bool,
    pub has_hr_evaluation: bool,
    pub has_business_block_evaluation: bool,
}

/// Assemble the full breakdown from the automatic OKR score and whatever
/// evaluations exist so far. The headline level/color follow the final score
/// when it exists and the automatic score otherwise.
pub fn department_breakdown(
    automatic: &ScoreResult,
    inputs: &EvaluationInputs,
    levels: &ScoreLevelSet,
) -> DepartmentScoreBreakdown {
    let hr_numeric = inputs.hr_letter.map(LetterGrade::score);
    let final_score = combine(Some(automatic.score), inputs.director_score, hr_numeric);
    let final_classified = final_score.map(|score| classify(score, levels));

    let headline = final_classified.as_ref().unwrap_or(automatic);

    DepartmentScoreBreakdown {
        automatic_okr_score: automatic.score,
        automatic_okr_percentage: automatic.percentage,
        director_evaluation: inputs.director_score,
        director_stars: inputs.director_score.and_then(stars_from_score),
        director_comment: inputs.director_comment.clone(),
        hr_evaluation_letter: inputs.hr_letter,
        hr_evaluation_numeric: hr_numeric,
        hr_comment: inputs.hr_comment.clone(),
        business_block_evaluation: inputs.business_block_score,
        business_block_comment: inputs.business_block_comment.clone(),
        final_combined_score: final_score,
        final_percentage: final_classified.as_ref().map(|c| c.percentage),
        score_level: headline.level.clone(),
        color: headline.color.clone(),
        has_director_evaluation: inputs.director_score.is_some(),
        has_hr_evaluation: hr_numeric.is_some(),
        has_business_block_evaluation: inputs.business_block_score.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_interpolate_linearly() {
        assert_eq!(stars_to_score(1).unwrap(), 4.25);
        assert_eq!(stars_to_score(3).unwrap(), 4.625);
        assert_eq!(stars_to_score(5).unwrap(), 5.0);
        assert!(matches!(
            stars_to_score(0),
            Err(EvaluationError::StarsOutOfRange(0))
        ));
        assert!(stars_to_score(6).is_err());
    }

    #[test]
    fn star_inversion_is_only_defined_on_the_valid_band() {
        assert_eq!(stars_from_score(4.625), Some(3));
        assert_eq!(stars_from_score(4.25), Some(1));
        assert_eq!(stars_from_score(5.0), Some(5));
        assert_eq!(stars_from_score(4.0), None);
        assert_eq!(stars_from_score(5.1), None);
    }

    #[test]
    fn letter_grades_use_the_reversed_table() {
        assert_eq!(LetterGrade::D.score(), 5.0);
        assert_eq!(LetterGrade::C.score(), 4.75);
        assert_eq!(LetterGrade::B.score(), 4.5);
        assert_eq!(LetterGrade::A.score(), 4.25);
        assert_eq!(LetterGrade::parse(" D "), Some(LetterGrade::D));
        assert_eq!(LetterGrade::parse("F"), None);
    }

    #[test]
    fn final_score_requires_all_three_inputs() {
        assert_eq!(combine(Some(4.8), Some(4.625), None), None);
        assert_eq!(combine(None, Some(4.625), Some(5.0)), None);
        assert_eq!(combine(Some(4.8), None, Some(5.0)), None);
    }

    #[test]
    fn final_score_blends_with_fixed_weights() {
        let blended = combine(Some(4.8), Some(4.625), Some(5.0)).expect("all present");
        assert!((blended - 4.805).abs() < 1e-9, "expected 4.805, got {blended}");
    }

    #[test]
    fn breakdown_falls_back_to_the_automatic_level_when_incomplete() {
        let levels = ScoreLevelSet::canonical();
        let automatic = classify(4.8, &levels);
        let inputs = EvaluationInputs {
            director_score: Some(4.625),
            ..EvaluationInputs::default()
        };
        let breakdown = department_breakdown(&automatic, &inputs, &levels);
        assert_eq!(breakdown.final_combined_score, None);
        assert_eq!(breakdown.final_percentage, None);
        assert_eq!(breakdown.score_level, automatic.level);
        assert!(breakdown.has_director_evaluation);
        assert!(!breakdown.has_hr_evaluation);
        assert_eq!(breakdown.director_stars, Some(3));
    }

    #[test]
    fn breakdown_classifies_the_final_score_when_complete() {
        let levels = ScoreLevelSet::canonical();
        let automatic = classify(4.8, &levels);
        let inputs = EvaluationInputs {
            director_score: Some(4.625),
            hr_letter: Some(LetterGrade::D),
            business_block_score: Some(2.0),
            ..EvaluationInputs::default()
        };
        let breakdown = department_breakdown(&automatic, &inputs, &levels);
        let final_score = breakdown.final_combined_score.expect("complete inputs");
        assert!((final_score - 4.805).abs() < 1e-9);
        assert_eq!(breakdown.score_level, "very_good");
        assert_eq!(breakdown.hr_evaluation_numeric, Some(5.0));
        // Business block shows up but is never blended in.
        assert!(breakdown.has_business_block_evaluation);
    }
}
