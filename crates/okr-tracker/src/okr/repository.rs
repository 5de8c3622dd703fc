use super::domain::{Department, Evaluation, EvaluationStatus, TargetType};
use crate::scoring::evaluation::EvaluatorType;
use crate::scoring::ScoreLevel;

/// Storage abstraction so the service module can be exercised in isolation.
/// The api crate supplies an in-memory implementation; a real deployment
/// would back this with the OKR database.
pub trait OkrRepository: Send + Sync {
    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError>;
    fn departments(&self) -> Result<Vec<Department>, RepositoryError>;
    fn department(&self, id: &str) -> Result<Option<Department>, RepositoryError>;
    fn update_department(&self, department: Department) -> Result<(), RepositoryError>;

    /// Persist a key result's actual value wherever it lives in the tree.
    fn set_actual_value(&self, key_result_id: &str, value: &str) -> Result<(), RepositoryError>;

    fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError>;
    fn evaluation(&self, id: &str) -> Result<Option<Evaluation>, RepositoryError>;
    fn update_evaluation(&self, evaluation: Evaluation) -> Result<(), RepositoryError>;
    fn evaluations_for(
        &self,
        target_type: TargetType,
        target_id: &str,
        status: EvaluationStatus,
    ) -> Result<Vec<Evaluation>, RepositoryError>;

    /// Whether this evaluator role already rated this target, regardless of
    /// status. Used to reject duplicate submissions.
    fn has_evaluation(
        &self,
        target_type: TargetType,
        target_id: &str,
        evaluator_type: EvaluatorType,
    ) -> Result<bool, RepositoryError>;

    fn score_levels(&self) -> Result<Vec<ScoreLevel>, RepositoryError>;
    fn store_score_levels(&self, levels: Vec<ScoreLevel>) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
