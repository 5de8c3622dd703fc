use crate::infra::{ApiContext, AppState};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use okr_tracker::error::AppError;
use okr_tracker::okr::{
    Department, Evaluation, EvaluationRequest, Objective, OkrRepository,
};
use okr_tracker::scoring::evaluation::DepartmentScoreBreakdown;
use okr_tracker::scoring::levels::{ValidationError, MIN_LEVELS};
use okr_tracker::scoring::store::ScoreLevelSource;
use okr_tracker::scoring::{ScoreLevel, ScoreResult};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDepartmentRequest {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) objectives: Vec<Objective>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActualValueRequest {
    pub(crate) actual_value: String,
}

pub(crate) fn okr_router<R, S>(context: ApiContext<R, S>) -> axum::Router
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/score-levels",
            axum::routing::get(list_score_levels::<R, S>).put(put_score_levels::<R, S>),
        )
        .route(
            "/api/v1/score-levels/reset",
            axum::routing::post(reset_score_levels::<R, S>),
        )
        .route(
            "/api/v1/departments",
            axum::routing::get(list_departments::<R, S>).post(create_department::<R, S>),
        )
        .route(
            "/api/v1/departments/:id",
            axum::routing::get(get_department::<R, S>),
        )
        .route(
            "/api/v1/departments/:id/scores",
            axum::routing::get(department_scores::<R, S>),
        )
        .route(
            "/api/v1/organization/score",
            axum::routing::get(organization_score::<R, S>),
        )
        .route(
            "/api/v1/key-results/:id/actual-value",
            axum::routing::put(update_actual_value::<R, S>),
        )
        .route(
            "/api/v1/key-results/:id/actual-value/flush",
            axum::routing::post(flush_actual_value::<R, S>),
        )
        .route(
            "/api/v1/evaluations",
            axum::routing::post(record_evaluation::<R, S>),
        )
        .route(
            "/api/v1/evaluations/:id/submit",
            axum::routing::post(submit_evaluation::<R, S>),
        )
        .layer(Extension(context))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_score_levels<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
) -> Json<Vec<ScoreLevel>>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    Json(context.service.score_levels().into_levels())
}

pub(crate) async fn put_score_levels<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Json(levels): Json<Vec<ScoreLevel>>,
) -> Result<Json<Vec<ScoreLevel>>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    if levels.len() < MIN_LEVELS {
        return Err(ValidationError::TooFewLevels.into());
    }
    let set = context.service.replace_score_levels(levels)?;
    Ok(Json(set.into_levels()))
}

pub(crate) async fn reset_score_levels<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
) -> Result<Json<Vec<ScoreLevel>>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    let set = context.service.reset_score_levels()?;
    Ok(Json(set.into_levels()))
}

pub(crate) async fn list_departments<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
) -> Result<Json<Vec<Department>>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    Ok(Json(context.service.departments()?))
}

pub(crate) async fn create_department<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Json(request): Json<CreateDepartmentRequest>,
) -> Result<(StatusCode, Json<Department>), AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    let department = context
        .service
        .create_department(&request.name, request.objectives)?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub(crate) async fn get_department<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Path(id): Path<String>,
) -> Result<Json<Department>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    Ok(Json(context.service.department(&id)?))
}

pub(crate) async fn department_scores<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Path(id): Path<String>,
) -> Result<Json<DepartmentScoreBreakdown>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    Ok(Json(context.service.department_scores(&id)?))
}

pub(crate) async fn organization_score<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
) -> Result<Json<ScoreResult>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    Ok(Json(context.service.organization_score()?))
}

/// Debounced write path: the edit is queued and lands after the configured
/// idle window, so rapid keystrokes collapse to one save.
pub(crate) async fn update_actual_value<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Path(id): Path<String>,
    Json(request): Json<ActualValueRequest>,
) -> StatusCode
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    context.autosave.submit(&id, &request.actual_value).await;
    StatusCode::ACCEPTED
}

/// Blur path: persist the pending edit immediately.
pub(crate) async fn flush_actual_value<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Path(id): Path<String>,
) -> StatusCode
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    context.autosave.flush(&id).await;
    StatusCode::NO_CONTENT
}

pub(crate) async fn record_evaluation<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Json(request): Json<EvaluationRequest>,
) -> Result<(StatusCode, Json<Evaluation>), AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    let evaluation = context.service.record_evaluation(request)?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

pub(crate) async fn submit_evaluation<R, S>(
    Extension(context): Extension<ApiContext<R, S>>,
    Path(id): Path<String>,
) -> Result<Json<Evaluation>, AppError>
where
    R: OkrRepository + 'static,
    S: ScoreLevelSource + 'static,
{
    Ok(Json(context.service.submit_evaluation(&id)?))
}
