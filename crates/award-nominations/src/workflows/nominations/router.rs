use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CategoryId, NominationDraft, NominationId, NomineeSummaryView, SummaryFlagsPatch, SummaryId,
    UserId,
};
use super::repository::{NominationStore, RepositoryError};
use super::service::{NominationService, NominationServiceError};
use super::summarizer::SummaryGenerator;

/// Header carrying the submitting user's id. Authentication happens upstream.
pub const ACTING_USER_HEADER: &str = "x-acting-user-id";

/// Router builder exposing nomination intake and nominee summary endpoints.
pub fn nomination_router<S, G>(service: Arc<NominationService<S, G>>) -> Router
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    Router::new()
        .route("/api/v1/nominations", post(create_handler::<S, G>))
        .route(
            "/api/v1/nominations/:nomination_id",
            get(nomination_handler::<S, G>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/summary",
            get(nomination_summary_handler::<S, G>),
        )
        .route(
            "/api/v1/nominations/:nomination_id/reconcile",
            post(reconcile_handler::<S, G>),
        )
        .route(
            "/api/v1/nominees/summary",
            get(summary_list_handler::<S, G>),
        )
        .route(
            "/api/v1/nominees/summary/:nominee_id/:category_id",
            get(nominee_summary_handler::<S, G>),
        )
        .route(
            "/api/v1/nominees/summary/:nominee_id/:category_id/nominations",
            get(nominee_nominations_handler::<S, G>),
        )
        .route(
            "/api/v1/nominee-summaries/:summary_id",
            patch(update_flags_handler::<S, G>).delete(delete_summary_handler::<S, G>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SummaryListQuery {
    #[serde(default)]
    pub(crate) category: Option<u64>,
}

pub(crate) async fn create_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    headers: HeaderMap,
    Json(draft): Json<NominationDraft>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    let Some(acting_user) = acting_user(&headers) else {
        let payload = json!({
            "error": format!("missing or invalid {ACTING_USER_HEADER} header"),
        });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    match service.create(draft, acting_user).await {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn nomination_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path(nomination_id): Path<u64>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.get_nomination(NominationId(nomination_id)) {
        Ok(nomination) => (StatusCode::OK, Json(nomination.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn nomination_summary_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path(nomination_id): Path<u64>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.summary_for_nomination(NominationId(nomination_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reconcile_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path(nomination_id): Path<u64>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.reconcile(NominationId(nomination_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_list_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Query(query): Query<SummaryListQuery>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.ranked_summaries(query.category.map(CategoryId)) {
        Ok(summaries) => {
            let views: Vec<NomineeSummaryView> =
                summaries.iter().map(|summary| summary.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn nominee_summary_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path((nominee_id, category_id)): Path<(u64, u64)>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.summary_for_nominee(UserId(nominee_id), CategoryId(category_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn nominee_nominations_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path((nominee_id, category_id)): Path<(u64, u64)>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.nominations_for_nominee(UserId(nominee_id), CategoryId(category_id)) {
        Ok(nominations) => {
            let views: Vec<_> = nominations.iter().map(|record| record.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_flags_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path(summary_id): Path<u64>,
    Json(patch): Json<SummaryFlagsPatch>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.update_summary_flags(SummaryId(summary_id), patch) {
        Ok(summary) => (StatusCode::OK, Json(summary.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_summary_handler<S, G>(
    State(service): State<Arc<NominationService<S, G>>>,
    Path(summary_id): Path<u64>,
) -> Response
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    match service.delete_summary(SummaryId(summary_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn acting_user(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(ACTING_USER_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(UserId)
}

fn error_response(err: NominationServiceError) -> Response {
    match err {
        NominationServiceError::Shape(violation) => {
            let payload = json!({
                "error": violation.to_string(),
                "field": violation.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        NominationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        NominationServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "conflicting update, retry the request" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
