use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::evaluation::{EvaluatorType, LetterGrade};
use crate::scoring::rollup::ScoreStatus;
use crate::scoring::{MetricType, Threshold};

/// A measurable key result under one objective. `actual_value` stays a string
/// because qualitative metrics record grades, not numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResult {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub weight: f64,
    pub thresholds: Threshold,
    #[serde(default)]
    pub actual_value: String,
    pub objective_id: String,
    #[serde(default, skip_serializing_if = "ScoreStatus::is_unscored")]
    pub score: ScoreStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub department_id: String,
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
    #[serde(default, skip_serializing_if = "ScoreStatus::is_unscored")]
    pub score: ScoreStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default, skip_serializing_if = "ScoreStatus::is_unscored")]
    pub score: ScoreStatus,
    /// Present only once all evaluations are in.
    #[serde(default, skip_serializing_if = "ScoreStatus::is_unscored")]
    pub final_score: ScoreStatus,
}

impl Department {
    /// The score shown on summary cards: the evaluated final score when it
    /// exists, the automatic OKR score otherwise.
    pub fn display_score(&self) -> &ScoreStatus {
        if self.final_score.is_scored() {
            &self.final_score
        } else {
            &self.score
        }
    }
}

/// What an evaluation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Department,
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationStatus {
    Draft,
    Submitted,
    Approved,
}

impl EvaluationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EvaluationStatus::Draft => "draft",
            EvaluationStatus::Submitted => "submitted",
            EvaluationStatus::Approved => "approved",
        }
    }
}

/// A stored evaluation. Director and business-block ratings are numeric, HR
/// ratings are letters; only the fields matching the evaluator type are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub evaluator_type: EvaluatorType,
    pub target_type: TargetType,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_rating: Option<LetterGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound evaluation submission. Directors may rate in stars, which the
/// service converts onto the score scale before storing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub target_type: TargetType,
    pub target_id: String,
    pub evaluator_type: EvaluatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_rating: Option<LetterGrade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{classify, ScoreLevelSet};

    #[test]
    fn display_score_prefers_the_final_score() {
        let levels = ScoreLevelSet::canonical();
        let mut department = Department {
            id: "dept-000001".to_string(),
            name: "Engineering".to_string(),
            objectives: Vec::new(),
            score: classify(4.2, &levels).into(),
            final_score: ScoreStatus::Unscored,
        };
        assert_eq!(department.display_score().scored().map(|s| s.score), Some(4.2));

        department.final_score = classify(4.8, &levels).into();
        assert_eq!(department.display_score().scored().map(|s| s.score), Some(4.8));
    }

    #[test]
    fn key_result_wire_shape_round_trips() {
        let json = serde_json::json!({
            "id": "kr-000001",
            "name": "Churn rate",
            "metricType": "LOWER_BETTER",
            "unit": "%",
            "weight": 40.0,
            "thresholds": {
                "below": 9.0, "meets": 7.0, "good": 5.0, "veryGood": 4.0, "exceptional": 3.0
            },
            "actualValue": "4.5",
            "objectiveId": "obj-000001"
        });
        let kr: KeyResult = serde_json::from_value(json).expect("deserializes");
        assert_eq!(kr.metric_type, MetricType::LowerBetter);
        assert_eq!(kr.thresholds.very_good, 4.0);
        assert!(kr.score.is_unscored());
    }
}
