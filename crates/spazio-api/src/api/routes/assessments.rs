//! Assessment handlers

use crate::{
    api::extractors::RequesterHeader,
    api::types::{PageQuery, UserAssessmentsQuery},
    error::Result,
    server::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use spazio_metrics::domain::types::{AssessmentId, SpaceId, UserId};
use spazio_metrics::domain::AssessmentRecord;
use spazio_metrics::facade::{
    CreateAssessmentRequest, OwnerAssessmentRequest, UpdateAssessmentRequest,
};
use spazio_metrics::{AssessmentView, Paginated};
use tracing::info;

pub async fn create_assessment(
    State(state): State<AppState>,
    Json(request): Json<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentRecord>)> {
    info!(
        subject = %request.subject_user_id,
        evaluation_type = %request.evaluation_type,
        "Creating assessment"
    );
    let record = state.facade.create_assessment(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Owner rates the tenant of a completed rental.
pub async fn create_owner_assessment(
    State(state): State<AppState>,
    Json(request): Json<OwnerAssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentRecord>)> {
    info!(rental_id = %request.rental_id, "Creating owner assessment");
    let record = state.facade.create_owner_assessment(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<AssessmentId>,
    RequesterHeader(requester): RequesterHeader,
    Json(request): Json<UpdateAssessmentRequest>,
) -> Result<Json<AssessmentRecord>> {
    let updated = state
        .facade
        .update_assessment(&assessment_id, requester, request)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_assessment(
    State(state): State<AppState>,
    Path(assessment_id): Path<AssessmentId>,
    RequesterHeader(requester): RequesterHeader,
) -> Result<Response> {
    state
        .facade
        .delete_assessment(&assessment_id, requester)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// All assessments for a space, newest first.
pub async fn space_assessments(
    State(state): State<AppState>,
    Path(space_id): Path<SpaceId>,
) -> Result<Json<Vec<AssessmentView>>> {
    let listing = state.facade.get_assessments_by_space(&space_id).await?;
    Ok(Json(listing))
}

/// Assessments where the user is the subject, paginated.
pub async fn user_assessments(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<UserAssessmentsQuery>,
) -> Result<Json<Paginated<AssessmentView>>> {
    let page = state
        .facade
        .get_user_assessments(&user_id, query.evaluation_type, query.page, query.limit)
        .await?;
    Ok(Json(page))
}

/// Admin-only listing of every assessment.
pub async fn list_all_assessments(
    State(state): State<AppState>,
    RequesterHeader(requester): RequesterHeader,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paginated<AssessmentView>>> {
    let page = state
        .facade
        .get_all_assessments(requester, query.page, query.limit)
        .await?;
    Ok(Json(page))
}
