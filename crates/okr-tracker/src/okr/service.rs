use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    Department, Evaluation, EvaluationRequest, EvaluationStatus, Objective, TargetType,
};
use super::repository::{OkrRepository, RepositoryError};
use crate::scoring::evaluation::{
    self, department_breakdown, stars_to_score, DepartmentScoreBreakdown, EvaluationError,
    EvaluationInputs, EvaluatorType,
};
use crate::scoring::metrics::{self, score_actual};
use crate::scoring::rollup::{roll_up, ScoreStatus};
use crate::scoring::store::{ScoreLevelSource, ScoreLevelStore};
use crate::scoring::{ScoreLevel, ScoreLevelSet, ScoreResult};

static DEPARTMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_department_id() -> String {
    let id = DEPARTMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("dept-{id:06}")
}

fn next_evaluation_id() -> String {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("eval-{id:06}")
}

/// Service composing the repository, the cached score-level configuration,
/// and the scoring rules.
pub struct OkrService<R, S> {
    repository: Arc<R>,
    levels: Arc<ScoreLevelStore<S>>,
}

impl<R, S> OkrService<R, S>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    pub fn new(repository: Arc<R>, levels: Arc<ScoreLevelStore<S>>) -> Self {
        Self { repository, levels }
    }

    pub fn level_store(&self) -> &ScoreLevelStore<S> {
        &self.levels
    }

    /// The configured level set, fetched once then served from cache.
    pub fn score_levels(&self) -> ScoreLevelSet {
        self.levels.load()
    }

    /// Persist a replacement level set and swap the cache to it.
    pub fn replace_score_levels(
        &self,
        levels: Vec<ScoreLevel>,
    ) -> Result<ScoreLevelSet, ServiceError> {
        self.repository.store_score_levels(levels.clone())?;
        Ok(self.levels.replace(levels))
    }

    /// Clear the stored configuration and drop back to the canonical set.
    pub fn reset_score_levels(&self) -> Result<ScoreLevelSet, ServiceError> {
        self.repository.store_score_levels(Vec::new())?;
        Ok(self.levels.reset())
    }

    /// Register a department with its objective tree. Ids are assigned here;
    /// scores are computed on read.
    pub fn create_department(
        &self,
        name: &str,
        mut objectives: Vec<Objective>,
    ) -> Result<Department, ServiceError> {
        let id = next_department_id();
        for objective in &mut objectives {
            objective.department_id = id.clone();
            for key_result in &mut objective.key_results {
                key_result.objective_id = objective.id.clone();
            }
        }
        let department = Department {
            id,
            name: name.to_string(),
            objectives,
            score: ScoreStatus::Unscored,
            final_score: ScoreStatus::Unscored,
        };
        Ok(self.repository.insert_department(department)?)
    }

    /// All departments with key-result, objective, department, and final
    /// scores freshly computed against the current level set.
    pub fn departments(&self) -> Result<Vec<Department>, ServiceError> {
        let levels = self.levels.load();
        let mut departments = self.repository.departments()?;
        for department in &mut departments {
            self.score_department(department, &levels)?;
        }
        Ok(departments)
    }

    pub fn department(&self, id: &str) -> Result<Department, ServiceError> {
        let levels = self.levels.load();
        let mut department = self
            .repository
            .department(id)?
            .ok_or(RepositoryError::NotFound)?;
        self.score_department(&mut department, &levels)?;
        Ok(department)
    }

    /// The organization summary card: unweighted mean over each department's
    /// display score.
    pub fn organization_score(&self) -> Result<ScoreResult, ServiceError> {
        let levels = self.levels.load();
        let departments = self.departments()?;
        let statuses: Vec<ScoreStatus> = departments
            .iter()
            .map(|d| d.display_score().clone())
            .collect();
        Ok(roll_up(&statuses, &levels))
    }

    /// The evaluation panel's combined breakdown for one department.
    pub fn department_scores(&self, id: &str) -> Result<DepartmentScoreBreakdown, ServiceError> {
        let levels = self.levels.load();
        let department = self.department(id)?;
        let automatic = department
            .score
            .scored()
            .cloned()
            .unwrap_or_else(|| crate::scoring::rollup::neutral_score(&levels));

        let inputs = self.evaluation_inputs(TargetType::Department, id)?;
        Ok(department_breakdown(&automatic, &inputs, &levels))
    }

    /// Persist a key result's actual value. Scores are derived on read, so
    /// no recomputation happens here.
    pub fn update_actual_value(&self, key_result_id: &str, value: &str) -> Result<(), ServiceError> {
        self.repository.set_actual_value(key_result_id, value)?;
        Ok(())
    }

    /// Record an evaluation after validating the rating against the
    /// evaluator type, converting director stars onto the score scale.
    pub fn record_evaluation(&self, request: EvaluationRequest) -> Result<Evaluation, ServiceError> {
        if self.repository.has_evaluation(
            request.target_type,
            &request.target_id,
            request.evaluator_type,
        )? {
            return Err(ServiceError::Repository(RepositoryError::Conflict));
        }

        let mut numeric_rating = request.numeric_rating;
        if request.evaluator_type == EvaluatorType::Director {
            if let Some(stars) = request.star_rating {
                numeric_rating = Some(stars_to_score(stars)?);
            }
        }
        let letter_rating = request.letter_rating;
        validate_rating(request.evaluator_type, numeric_rating, letter_rating.is_some())?;

        if request.evaluator_type == EvaluatorType::BusinessBlock
            && request.target_type != TargetType::Department
        {
            return Err(ServiceError::InvalidTarget {
                evaluator: request.evaluator_type.label(),
            });
        }

        let now = Utc::now();
        let evaluation = Evaluation {
            id: next_evaluation_id(),
            evaluator_type: request.evaluator_type,
            target_type: request.target_type,
            target_id: request.target_id,
            numeric_rating,
            letter_rating,
            comment: request.comment,
            status: EvaluationStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        Ok(self.repository.insert_evaluation(evaluation)?)
    }

    /// Move a draft evaluation to submitted so it starts counting toward the
    /// combined score.
    pub fn submit_evaluation(&self, id: &str) -> Result<Evaluation, ServiceError> {
        let mut evaluation = self
            .repository
            .evaluation(id)?
            .ok_or(RepositoryError::NotFound)?;
        if evaluation.status != EvaluationStatus::Draft {
            return Err(ServiceError::NotDraft);
        }
        evaluation.status = EvaluationStatus::Submitted;
        evaluation.updated_at = Utc::now();
        self.repository.update_evaluation(evaluation.clone())?;
        Ok(evaluation)
    }

    fn evaluation_inputs(
        &self,
        target_type: TargetType,
        target_id: &str,
    ) -> Result<EvaluationInputs, ServiceError> {
        let submitted =
            self.repository
                .evaluations_for(target_type, target_id, EvaluationStatus::Submitted)?;

        let mut inputs = EvaluationInputs::default();
        for evaluation in submitted {
            match evaluation.evaluator_type {
                EvaluatorType::Director => {
                    inputs.director_score = evaluation.numeric_rating;
                    inputs.director_comment = evaluation.comment;
                }
                EvaluatorType::Hr => {
                    inputs.hr_letter = evaluation.letter_rating;
                    inputs.hr_comment = evaluation.comment;
                }
                EvaluatorType::BusinessBlock => {
                    inputs.business_block_score = evaluation.numeric_rating;
                    inputs.business_block_comment = evaluation.comment;
                }
            }
        }
        Ok(inputs)
    }

    /// Recompute the whole score tree for one department in place.
    fn score_department(
        &self,
        department: &mut Department,
        levels: &ScoreLevelSet,
    ) -> Result<(), ServiceError> {
        let mut weighted_objectives = Vec::new();
        for objective in &mut department.objectives {
            let mut kr_scores = Vec::new();
            for key_result in &mut objective.key_results {
                let scored = score_actual(
                    &key_result.actual_value,
                    key_result.metric_type,
                    &key_result.thresholds,
                    levels,
                );
                kr_scores.push(scored.score);
                key_result.score = scored.into();
            }
            let objective_result = metrics::objective_score(&kr_scores, levels);
            if !objective.key_results.is_empty() {
                weighted_objectives.push((objective.weight, objective_result.score));
            }
            objective.score = objective_result.into();
        }

        let automatic = metrics::department_score(&weighted_objectives, levels);
        department.score = automatic.clone().into();

        let inputs = self.evaluation_inputs(TargetType::Department, &department.id)?;
        let final_score = evaluation::combine(
            Some(automatic.score),
            inputs.director_score,
            inputs.hr_letter.map(|l| l.score()),
        );
        department.final_score = match final_score {
            Some(score) => crate::scoring::classify(score, levels).into(),
            None => ScoreStatus::Unscored,
        };
        Ok(())
    }
}

fn validate_rating(
    evaluator_type: EvaluatorType,
    numeric_rating: Option<f64>,
    has_letter: bool,
) -> Result<(), EvaluationError> {
    match evaluator_type {
        EvaluatorType::Director => match numeric_rating {
            None => Err(EvaluationError::MissingRating {
                evaluator: "director",
                field: "star or numeric rating",
            }),
            Some(rating)
                if !(evaluation::DIRECTOR_FLOOR..=evaluation::DIRECTOR_CEILING)
                    .contains(&rating) =>
            {
                Err(EvaluationError::DirectorRatingOutOfRange(rating))
            }
            Some(_) => Ok(()),
        },
        EvaluatorType::Hr => {
            if has_letter {
                Ok(())
            } else {
                Err(EvaluationError::MissingRating {
                    evaluator: "HR",
                    field: "letter rating",
                })
            }
        }
        EvaluatorType::BusinessBlock => match numeric_rating {
            None => Err(EvaluationError::MissingRating {
                evaluator: "business block",
                field: "numeric rating",
            }),
            Some(rating) if !(1.0..=5.0).contains(&rating) => {
                Err(EvaluationError::BusinessBlockRatingOutOfRange(rating))
            }
            Some(_) => Ok(()),
        },
    }
}

/// Error raised by the OKR service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("{evaluator} evaluators can only rate departments")]
    InvalidTarget { evaluator: &'static str },
    #[error("only draft evaluations can be submitted")]
    NotDraft,
}
