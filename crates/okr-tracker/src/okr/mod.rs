pub mod autosave;
pub mod domain;
pub mod export;
pub mod repository;
pub mod service;

pub use domain::{
    Department, Evaluation, EvaluationRequest, EvaluationStatus, KeyResult, Objective, TargetType,
};
pub use repository::{OkrRepository, RepositoryError};
pub use service::{OkrService, ServiceError};
