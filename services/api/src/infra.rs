use metrics_exporter_prometheus::PrometheusHandle;
use okr_tracker::okr::autosave::{AutosaveQueue, PersistError, ValuePersister};
use okr_tracker::okr::{Department, Evaluation, EvaluationStatus, OkrRepository, TargetType};
use okr_tracker::okr::{OkrService, RepositoryError};
use okr_tracker::scoring::evaluation::EvaluatorType;
use okr_tracker::scoring::store::{ScoreLevelSource, SourceError};
use okr_tracker::scoring::ScoreLevel;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared handles the route handlers need: the scoring service plus the
/// write-behind queue for actual-value edits.
pub(crate) struct ApiContext<R, S> {
    pub(crate) service: Arc<OkrService<R, S>>,
    pub(crate) autosave: Arc<AutosaveQueue<RepositoryPersister<R>>>,
}

impl<R, S> Clone for ApiContext<R, S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            autosave: Arc::clone(&self.autosave),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryOkrRepository {
    departments: Arc<Mutex<HashMap<String, Department>>>,
    evaluations: Arc<Mutex<HashMap<String, Evaluation>>>,
    levels: Arc<Mutex<Vec<ScoreLevel>>>,
}

impl OkrRepository for InMemoryOkrRepository {
    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError> {
        let mut guard = self.departments.lock().expect("department mutex poisoned");
        if guard.contains_key(&department.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(department.id.clone(), department.clone());
        Ok(department)
    }

    fn departments(&self) -> Result<Vec<Department>, RepositoryError> {
        let guard = self.departments.lock().expect("department mutex poisoned");
        let mut departments: Vec<Department> = guard.values().cloned().collect();
        departments.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(departments)
    }

    fn department(&self, id: &str) -> Result<Option<Department>, RepositoryError> {
        let guard = self.departments.lock().expect("department mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_department(&self, department: Department) -> Result<(), RepositoryError> {
        let mut guard = self.departments.lock().expect("department mutex poisoned");
        if guard.contains_key(&department.id) {
            guard.insert(department.id.clone(), department);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn set_actual_value(&self, key_result_id: &str, value: &str) -> Result<(), RepositoryError> {
        let mut guard = self.departments.lock().expect("department mutex poisoned");
        for department in guard.values_mut() {
            for objective in &mut department.objectives {
                for key_result in &mut objective.key_results {
                    if key_result.id == key_result_id {
                        key_result.actual_value = value.to_string();
                        return Ok(());
                    }
                }
            }
        }
        Err(RepositoryError::NotFound)
    }

    fn insert_evaluation(&self, evaluation: Evaluation) -> Result<Evaluation, RepositoryError> {
        let mut guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        if guard.contains_key(&evaluation.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(evaluation.id.clone(), evaluation.clone());
        Ok(evaluation)
    }

    fn evaluation(&self, id: &str) -> Result<Option<Evaluation>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_evaluation(&self, evaluation: Evaluation) -> Result<(), RepositoryError> {
        let mut guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        if guard.contains_key(&evaluation.id) {
            guard.insert(evaluation.id.clone(), evaluation);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn evaluations_for(
        &self,
        target_type: TargetType,
        target_id: &str,
        status: EvaluationStatus,
    ) -> Result<Vec<Evaluation>, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard
            .values()
            .filter(|e| {
                e.target_type == target_type && e.target_id == target_id && e.status == status
            })
            .cloned()
            .collect())
    }

    fn has_evaluation(
        &self,
        target_type: TargetType,
        target_id: &str,
        evaluator_type: EvaluatorType,
    ) -> Result<bool, RepositoryError> {
        let guard = self.evaluations.lock().expect("evaluation mutex poisoned");
        Ok(guard.values().any(|e| {
            e.target_type == target_type
                && e.target_id == target_id
                && e.evaluator_type == evaluator_type
        }))
    }

    fn score_levels(&self) -> Result<Vec<ScoreLevel>, RepositoryError> {
        let guard = self.levels.lock().expect("level mutex poisoned");
        Ok(guard.clone())
    }

    fn store_score_levels(&self, levels: Vec<ScoreLevel>) -> Result<(), RepositoryError> {
        let mut guard = self.levels.lock().expect("level mutex poisoned");
        *guard = levels;
        Ok(())
    }
}

/// Level source reading whatever configuration the repository holds; an
/// empty result makes the store fall back to the canonical defaults.
pub(crate) struct RepositoryLevelSource<R> {
    repository: Arc<R>,
}

impl<R> RepositoryLevelSource<R> {
    pub(crate) fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: OkrRepository> ScoreLevelSource for RepositoryLevelSource<R> {
    fn fetch(&self) -> Result<Vec<ScoreLevel>, SourceError> {
        self.repository
            .score_levels()
            .map_err(|err| SourceError::Unavailable(err.to_string()))
    }
}

/// Autosave sink that lands debounced actual-value edits in the repository.
pub(crate) struct RepositoryPersister<R> {
    repository: Arc<R>,
}

impl<R> RepositoryPersister<R> {
    pub(crate) fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: OkrRepository + 'static> ValuePersister for RepositoryPersister<R> {
    fn persist(&self, key_result_id: &str, value: &str) -> Result<(), PersistError> {
        self.repository
            .set_actual_value(key_result_id, value)
            .map_err(|err| PersistError::Failed(err.to_string()))
    }
}
